use abyss_core::{Position, TileType, WorldConfig};
use abyss_system_terrain::{GeneratedTerrain, WorldGenerator};

fn generate(seed: u32) -> GeneratedTerrain {
    let config = WorldConfig::default();
    WorldGenerator::new(
        config.columns(),
        config.rows(),
        &config.ground_thresholds,
        &config.object_thresholds,
    )
    .generate(seed)
}

#[test]
fn identical_seed_yields_identical_layers() {
    let first = generate(42);
    let second = generate(42);

    assert_eq!(first, second, "generation diverged for identical seed");
}

#[test]
fn generated_layers_cover_the_whole_world() {
    let terrain = generate(5);
    let config = WorldConfig::default();

    assert_eq!(terrain.ground().columns(), config.columns());
    assert_eq!(terrain.objects().rows(), config.rows());
    assert_eq!(
        terrain.ground().iter().count(),
        (config.columns() * config.rows()) as usize
    );
}

#[test]
fn solid_cells_always_have_a_cell_above_and_below() {
    let terrain = generate(99);

    for map in [terrain.ground(), terrain.objects()] {
        for (position, tile) in map.iter() {
            if !tile.is_solid_mass() {
                continue;
            }
            let above = map.get(position.offset(0, -1));
            let below = map.get(position.offset(0, 1));
            assert!(above.is_some(), "floating ceiling at {position:?}");
            assert!(
                below.is_some_and(|below| below != TileType::Air),
                "unrimmed solid at {position:?}"
            );
        }
    }
}

#[test]
fn spawn_area_excludes_obstructed_cells() {
    let terrain = generate(17);

    for position in terrain.spawn_area() {
        let ground = terrain.ground().get(position);
        let object = terrain.objects().get(position);
        assert!(ground.is_some_and(TileType::is_solid_mass));
        assert!(object.is_some_and(|object| !object.is_solid_mass()));
    }
}

#[test]
fn player_spawn_candidates_stay_near_the_center() {
    let terrain = generate(23);
    let center = Position::new(100, 55);
    let radius = 110.0 / 3.0;

    for position in terrain.player_spawn_candidates() {
        assert!(position.distance_to(center) < radius);
    }
}
