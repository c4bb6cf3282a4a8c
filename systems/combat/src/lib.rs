#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision resolution between bullets, enemies, the player and walls.
//!
//! The resolver reads post-movement snapshots and emits deferred commands in
//! a fixed order: bullet strikes on enemies, then enemy strikes on the player,
//! then bullet removals for expiry, leaving the world, or hitting a wall. It
//! tracks piercing, enemy health and hit cooldowns locally so a single pass
//! never issues a command the world would apply to an already spent entity.

use abyss_core::{
    Bounds, BulletId, BulletRemoval, BulletView, Command, EnemyId, EnemyView, PlayerSnapshot,
    Position, TileTypeMap,
};

/// Static geometry the resolver checks bullets against.
#[derive(Clone, Copy, Debug)]
pub struct Arena<'a> {
    /// Object layer; solid masses stop bullets.
    pub obstacles: &'a TileTypeMap,
    /// Edge length of a tile in pixels.
    pub tile_size: f32,
    /// Rectangle covered by the world.
    pub bounds: Bounds,
}

/// Pure system that detects contacts and proposes combat commands.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    enemies: Vec<EnemyTally>,
    bullets: Vec<BulletTally>,
}

#[derive(Clone, Copy, Debug)]
struct EnemyTally {
    id: EnemyId,
    bounds: Bounds,
    health: f32,
    hit_ready: bool,
}

#[derive(Clone, Copy, Debug)]
struct BulletTally {
    id: BulletId,
    bounds: Bounds,
    damage: f32,
    piercing: u32,
    expired: bool,
}

impl CollisionResolver {
    /// Resolves one frame of contacts and appends the resulting commands.
    pub fn handle(
        &mut self,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        bullets: &BulletView,
        arena: Arena<'_>,
        out: &mut Vec<Command>,
    ) {
        self.enemies.clear();
        self.enemies.extend(enemies.iter().map(|enemy| EnemyTally {
            id: enemy.id,
            bounds: enemy.bounds,
            health: enemy.health,
            hit_ready: enemy.hit_ready,
        }));
        self.bullets.clear();
        self.bullets.extend(bullets.iter().map(|bullet| BulletTally {
            id: bullet.id,
            bounds: bullet.bounds,
            damage: bullet.damage,
            piercing: bullet.piercing,
            expired: bullet.expired,
        }));

        self.strike_enemies(out);
        self.strike_player(player, out);
        self.retire_bullets(&arena, out);
    }

    fn strike_enemies(&mut self, out: &mut Vec<Command>) {
        for enemy in &mut self.enemies {
            for bullet in &mut self.bullets {
                if bullet.piercing == 0 || enemy.health <= 0.0 || !enemy.hit_ready {
                    continue;
                }
                if !enemy.bounds.intersects(&bullet.bounds) {
                    continue;
                }
                out.push(Command::StrikeEnemy {
                    enemy: enemy.id,
                    bullet: bullet.id,
                });
                enemy.health -= bullet.damage;
                enemy.hit_ready = false;
                bullet.piercing -= 1;
            }
        }
    }

    fn strike_player(&self, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        if !player.hit_ready || player.health <= 0.0 {
            return;
        }
        let attacker = self
            .enemies
            .iter()
            .find(|enemy| enemy.health > 0.0 && enemy.bounds.intersects(&player.bounds));
        if let Some(enemy) = attacker {
            out.push(Command::StrikePlayer { enemy: enemy.id });
        }
    }

    fn retire_bullets(&self, arena: &Arena<'_>, out: &mut Vec<Command>) {
        for bullet in &self.bullets {
            if bullet.piercing == 0 {
                continue;
            }
            let center = bullet.bounds.center();
            let reason = if bullet.expired {
                BulletRemoval::Expired
            } else if !arena.bounds.contains(center) {
                BulletRemoval::OutOfBounds
            } else if arena
                .obstacles
                .get(Position::containing(center, arena.tile_size))
                .is_some_and(|tile| tile.is_solid_mass())
            {
                BulletRemoval::HitWall
            } else {
                continue;
            };
            out.push(Command::RemoveBullet {
                bullet: bullet.id,
                reason,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abyss_core::{BulletSnapshot, EnemySnapshot, TileType};
    use glam::Vec2;

    fn player_at(center: Vec2) -> PlayerSnapshot {
        PlayerSnapshot {
            bounds: Bounds::from_center(center, Vec2::splat(12.0)),
            health: 6.0,
            hit_ready: true,
            scale: Vec2::ONE,
        }
    }

    fn enemy(id: u32, center: Vec2, health: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            bounds: Bounds::from_center(center, Vec2::splat(12.0)),
            health,
            damage: 1.0,
            hit_ready: true,
            dash_ready: true,
            pursuing: true,
        }
    }

    fn bullet(id: u32, center: Vec2, piercing: u32) -> BulletSnapshot {
        BulletSnapshot {
            id: BulletId::new(id),
            bounds: Bounds::from_center(center, Vec2::splat(4.0)),
            angle: 0.0,
            damage: 1.0,
            piercing,
            expired: false,
        }
    }

    fn resolve(
        player: PlayerSnapshot,
        enemies: Vec<EnemySnapshot>,
        bullets: Vec<BulletSnapshot>,
        obstacles: &TileTypeMap,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        CollisionResolver::default().handle(
            &player,
            &EnemyView::from_snapshots(enemies),
            &BulletView::from_snapshots(bullets),
            Arena {
                obstacles,
                tile_size: 16.0,
                bounds: Bounds::new(Vec2::ZERO, Vec2::splat(160.0)),
            },
            &mut out,
        );
        out
    }

    fn open() -> TileTypeMap {
        TileTypeMap::new(10, 10, TileType::Air)
    }

    #[test]
    fn spent_bullet_stops_after_first_enemy() {
        let out = resolve(
            player_at(Vec2::new(140.0, 140.0)),
            vec![
                enemy(0, Vec2::new(50.0, 50.0), 2.0),
                enemy(1, Vec2::new(52.0, 50.0), 2.0),
            ],
            vec![bullet(7, Vec2::new(51.0, 50.0), 1)],
            &open(),
        );

        assert_eq!(
            out,
            vec![Command::StrikeEnemy {
                enemy: EnemyId::new(0),
                bullet: BulletId::new(7),
            }]
        );
    }

    #[test]
    fn piercing_bullet_hits_each_enemy_once() {
        let out = resolve(
            player_at(Vec2::new(140.0, 140.0)),
            vec![
                enemy(0, Vec2::new(50.0, 50.0), 2.0),
                enemy(1, Vec2::new(52.0, 50.0), 2.0),
            ],
            vec![
                bullet(3, Vec2::new(51.0, 50.0), 2),
                bullet(4, Vec2::new(51.0, 50.0), 2),
            ],
            &open(),
        );

        assert_eq!(
            out,
            vec![
                Command::StrikeEnemy {
                    enemy: EnemyId::new(0),
                    bullet: BulletId::new(3),
                },
                Command::StrikeEnemy {
                    enemy: EnemyId::new(1),
                    bullet: BulletId::new(3),
                },
            ]
        );
    }

    #[test]
    fn killed_enemy_cannot_hurt_player() {
        let out = resolve(
            player_at(Vec2::new(50.0, 50.0)),
            vec![enemy(0, Vec2::new(50.0, 50.0), 1.0)],
            vec![bullet(1, Vec2::new(50.0, 50.0), 1)],
            &open(),
        );

        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Command::StrikeEnemy { .. }));
    }

    #[test]
    fn strikes_precede_removals() {
        let mut expired = bullet(2, Vec2::new(100.0, 100.0), 1);
        expired.expired = true;
        let out = resolve(
            player_at(Vec2::new(20.0, 20.0)),
            vec![enemy(5, Vec2::new(24.0, 20.0), 2.0)],
            vec![expired, bullet(3, Vec2::new(170.0, 20.0), 1)],
            &open(),
        );

        assert_eq!(
            out,
            vec![
                Command::StrikePlayer {
                    enemy: EnemyId::new(5),
                },
                Command::RemoveBullet {
                    bullet: BulletId::new(2),
                    reason: BulletRemoval::Expired,
                },
                Command::RemoveBullet {
                    bullet: BulletId::new(3),
                    reason: BulletRemoval::OutOfBounds,
                },
            ]
        );
    }

    #[test]
    fn solid_objects_stop_bullets_but_edges_do_not() {
        let obstacles = TileTypeMap::from_fn(10, 10, |position| match position.x() {
            2 => TileType::Dirt,
            4 => TileType::Edge,
            _ => TileType::Air,
        });
        let out = resolve(
            player_at(Vec2::new(140.0, 140.0)),
            Vec::new(),
            vec![
                bullet(0, Vec2::new(40.0, 8.0), 1),
                bullet(1, Vec2::new(72.0, 8.0), 1),
            ],
            &obstacles,
        );

        assert_eq!(
            out,
            vec![Command::RemoveBullet {
                bullet: BulletId::new(0),
                reason: BulletRemoval::HitWall,
            }]
        );
    }

    #[test]
    fn invulnerable_player_is_not_struck() {
        let mut player = player_at(Vec2::new(50.0, 50.0));
        player.hit_ready = false;
        let out = resolve(player, vec![enemy(0, Vec2::new(50.0, 50.0), 2.0)], Vec::new(), &open());

        assert!(out.is_empty());
    }
}
