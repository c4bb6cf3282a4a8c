#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy chase behaviour.
//!
//! Enemies idle until they are told to pursue, then close in on the player in
//! discrete dashes aimed at the player's centre.

use abyss_core::{Command, EnemyView, PlayerSnapshot};

/// Pure system that turns enemy snapshots into dash commands.
#[derive(Debug, Default)]
pub struct Pursuit;

impl Pursuit {
    /// Emits a [`Command::DashEnemy`] for every pursuing enemy whose dash is
    /// ready. Enemies already on top of the player stay put.
    pub fn handle(&self, player: &PlayerSnapshot, enemies: &EnemyView, out: &mut Vec<Command>) {
        let target = player.bounds.center();
        for enemy in enemies.iter() {
            if !enemy.pursuing || !enemy.dash_ready {
                continue;
            }
            let heading = target - enemy.bounds.center();
            if heading.length_squared() <= f32::EPSILON {
                continue;
            }
            out.push(Command::DashEnemy {
                enemy: enemy.id,
                heading: heading.normalize(),
            });
        }
    }
}
