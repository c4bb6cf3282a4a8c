use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use abyss_core::{Command, GamePhase, WaveConfig};
use abyss_system_waves::WaveController;

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(23);
    let second = replay(23);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

#[test]
fn spawn_rate_only_grows() {
    let commands = replay(4);
    let counts: Vec<u32> = commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemies { count } => Some(*count),
            _ => None,
        })
        .collect();

    assert!(counts.len() > 5);
    assert_eq!(counts[0], 10);
    for pair in counts.windows(2) {
        let increase = pair[1] - pair[0];
        assert!((5..=10).contains(&increase), "increase {increase}");
    }
}

/// Plays a run where every wave is cleared a few frames after it spawns.
fn replay(seed: u64) -> Vec<Command> {
    let mut waves = WaveController::new(&WaveConfig::default(), 370.0, seed);
    let mut commands = Vec::new();
    waves.reset(&mut commands);

    let mut enemies = 10_usize;
    for frame in 0..3_000 {
        let mut out = Vec::new();
        waves.handle(1.0, &[], enemies, &mut out);
        for command in &out {
            if let Command::SpawnEnemies { count } = command {
                enemies = *count as usize;
            }
        }
        commands.extend(out);

        if waves.phase() == GamePhase::Active && frame % 30 == 0 {
            enemies = enemies.saturating_sub(4);
        }
    }
    commands
}

fn fingerprint(commands: &[Command]) -> u64 {
    let mut hasher = DefaultHasher::new();
    format!("{commands:?}").hash(&mut hasher);
    hasher.finish()
}
