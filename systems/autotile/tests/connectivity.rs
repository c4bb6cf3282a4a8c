use abyss_core::{Direction, LayerKind, Position, TileLayer, TileType, TileTypeMap};
use abyss_system_autotile::{AutoTiler, ConnectivityMask, Strip};
use proptest::prelude::*;

proptest! {
    #[test]
    fn highlights_cover_exactly_the_unconnected_sides(bits in 0_u8..16) {
        let mask = ConnectivityMask::from_bits(bits);
        for direction in Direction::ALL {
            let painted = mask.highlights().contains(&Strip::facing(direction));
            prop_assert_eq!(painted, !mask.connects(direction));
        }
    }

    #[test]
    fn decorated_count_matches_exposed_solid_tiles(map in tile_map(10, 7)) {
        let mut layer = TileLayer::from_type_map(LayerKind::Objects, &map, 8);

        let exposed = map
            .iter()
            .filter(|(_, tile)| tile.is_solid_mass())
            .filter(|(position, _)| {
                Direction::ALL.into_iter().any(|direction| {
                    !map
                        .get(position.neighbor(direction))
                        .is_some_and(TileType::is_solid_mass)
                })
            })
            .count();

        prop_assert_eq!(AutoTiler::new(8).apply(&mut layer), exposed);
    }
}

fn tile_map(columns: u32, rows: u32) -> impl Strategy<Value = TileTypeMap> {
    let tile = prop_oneof![
        Just(TileType::Air),
        Just(TileType::Dirt),
        Just(TileType::Dirt2),
        Just(TileType::Edge),
    ];
    prop::collection::vec(tile, (columns * rows) as usize).prop_map(move |cells| {
        let mut cells = cells.into_iter();
        TileTypeMap::from_fn(columns, rows, |_: Position| {
            cells.next().unwrap_or(TileType::Air)
        })
    })
}
