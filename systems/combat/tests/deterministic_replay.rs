use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use abyss_core::{Command, Event, GameConfig, Position, TileType, TileTypeMap, WorldLayout};
use abyss_system_combat::{Arena, CollisionResolver};
use abyss_world::{self as world, query, World};

#[test]
fn shooting_an_idle_enemy_kills_it() {
    let outcome = replay(3);

    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    assert_eq!(outcome.enemies_left, 0);
    assert!(outcome.events.iter().any(|event| matches!(
        event,
        Event::BulletRemoved { .. }
    )));
}

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(9);
    let second = replay(9);

    assert_eq!(first.events, second.events, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

struct ReplayOutcome {
    events: Vec<Event>,
    enemies_left: usize,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        format!("{:?}", self.events).hash(&mut hasher);
        self.enemies_left.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut world = World::new(&GameConfig::default(), seed);
    let mut resolver = CollisionResolver::default();
    let mut log = Vec::new();
    world::apply(
        &mut world,
        Command::ResetWorld { layout: range() },
        &mut log,
    );
    world::apply(&mut world, Command::SpawnEnemies { count: 1 }, &mut log);

    for _ in 0..180 {
        let mut commands = Vec::new();
        if let Some(target) = query::enemy_view(&world).iter().next() {
            commands.push(Command::Fire {
                aim: target.bounds.center(),
            });
        }
        commands.extend([
            Command::MovePlayer { dt: 1.0 },
            Command::AdvanceEnemies { dt: 1.0 },
            Command::AdvanceWeapon { dt: 1.0 },
            Command::AdvanceBullets { dt: 1.0 },
        ]);
        for command in commands {
            world::apply(&mut world, command, &mut log);
        }

        let mut combat = Vec::new();
        resolver.handle(
            &query::player(&world),
            &query::enemy_view(&world),
            &query::bullet_view(&world),
            Arena {
                obstacles: query::obstacles(&world),
                tile_size: query::tile_size(&world),
                bounds: query::world_bounds(&world),
            },
            &mut combat,
        );
        for command in combat {
            world::apply(&mut world, command, &mut log);
        }
        world::apply(&mut world, Command::AdvanceEffects { dt: 1.0 }, &mut log);
    }

    ReplayOutcome {
        enemies_left: query::enemy_count(&world),
        events: log,
    }
}

/// Open field with the player and a single enemy spawn on the same row.
fn range() -> WorldLayout {
    let ground = TileTypeMap::from_fn(20, 12, |position| {
        let inside = (1..19).contains(&position.x()) && (1..11).contains(&position.y());
        if inside {
            TileType::Dirt
        } else {
            TileType::Air
        }
    });
    WorldLayout {
        objects: TileTypeMap::new(20, 12, TileType::Air),
        spawn_area: vec![Position::new(9, 5)],
        player_spawn: Position::new(3, 5),
        ground,
    }
}
