#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Escape From The Abyss.
//!
//! The world owns the tile maps used for collision, the player, enemies,
//! bullets and transient effects. It changes only through [`apply`], which
//! executes one [`Command`] and reports what happened as [`Event`] values.
//! Commands naming entities that no longer exist are ignored, so systems may
//! emit removals for ids another command already removed.

mod effects;
mod entities;

pub use effects::{Particle, Shockwave};

use std::ops::RangeInclusive;

use abyss_core::{
    BulletId, BulletRemoval, Bounds, Command, EnemyBuff, EnemyConfig, EnemyId, Event, GameConfig,
    PlayerBuff, Position, TileTypeMap,
};
use entities::{Bullet, Enemy, Player, Weapon};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SPARK_COUNT: RangeInclusive<u32> = 1..=4;
const SPARK_SPREAD_DEGREES: RangeInclusive<i32> = 10..=30;

/// Enemy stat tables sampled when enemies spawn.
///
/// Buffs append `last + 1` to a table, so later spawns draw from a wider
/// range while earlier entries stay in play.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyStatTables {
    healths: Vec<f32>,
    damages: Vec<f32>,
    dash_speeds: Vec<f32>,
}

impl EnemyStatTables {
    /// Creates tables seeded from the configuration.
    #[must_use]
    pub fn from_config(config: &EnemyConfig) -> Self {
        Self {
            healths: config.healths.clone(),
            damages: config.damages.clone(),
            dash_speeds: config.dash_speeds.clone(),
        }
    }

    /// Health values enemies may spawn with.
    #[must_use]
    pub fn healths(&self) -> &[f32] {
        &self.healths
    }

    /// Contact damage values enemies may spawn with.
    #[must_use]
    pub fn damages(&self) -> &[f32] {
        &self.damages
    }

    /// Dash speeds enemies may spawn with.
    #[must_use]
    pub fn dash_speeds(&self) -> &[f32] {
        &self.dash_speeds
    }

    fn grow(&mut self, buff: EnemyBuff) {
        let table = match buff {
            EnemyBuff::Damage => &mut self.damages,
            EnemyBuff::Speed => &mut self.dash_speeds,
            EnemyBuff::Health => &mut self.healths,
        };
        let next = table.last().copied().unwrap_or(0.0) + 1.0;
        table.push(next);
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> (f32, f32, f32) {
        let pick = |table: &[f32], rng: &mut ChaCha8Rng| table.choose(rng).copied().unwrap_or(1.0);
        let health = pick(&self.healths, rng);
        let damage = pick(&self.damages, rng);
        let dash_speed = pick(&self.dash_speeds, rng);
        (health, damage, dash_speed)
    }
}

/// Represents the authoritative Escape From The Abyss world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    tile_size: f32,
    ground: TileTypeMap,
    objects: TileTypeMap,
    spawn_area: Vec<Position>,
    player: Player,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    weapon: Weapon,
    bullet_damage: f32,
    enemy_stats: EnemyStatTables,
    particles: Vec<Particle>,
    shockwaves: Vec<Shockwave>,
    pursued: bool,
    rng: ChaCha8Rng,
    next_enemy: u32,
    next_bullet: u32,
}

impl World {
    /// Creates an empty world. Issue [`Command::ResetWorld`] to load terrain.
    #[must_use]
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let tile_size = config.world.tile_size as f32;
        Self {
            tile_size,
            ground: TileTypeMap::new(0, 0, abyss_core::TileType::Air),
            objects: TileTypeMap::new(0, 0, abyss_core::TileType::Air),
            spawn_area: Vec::new(),
            player: Player::spawn(
                Position::default(),
                tile_size,
                config.player.size,
                config.player.health,
            ),
            enemies: Vec::new(),
            bullets: Vec::new(),
            weapon: Weapon::new(config.weapon.cooldown),
            bullet_damage: config.weapon.bullet_damage,
            enemy_stats: EnemyStatTables::from_config(&config.enemies),
            particles: Vec::new(),
            shockwaves: Vec::new(),
            pursued: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_enemy: 0,
            next_bullet: 0,
            config: config.clone(),
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(
            Vec2::ZERO,
            Vec2::new(self.ground.columns() as f32, self.ground.rows() as f32) * self.tile_size,
        )
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }

    fn bullet_index(&self, bullet: BulletId) -> Option<usize> {
        self.bullets.iter().position(|candidate| candidate.id == bullet)
    }

    fn mark_pursued(&mut self, out_events: &mut Vec<Event>) {
        if self.pursued {
            return;
        }
        self.pursued = true;
        log::debug!("enemies started pursuing the player");
        out_events.push(Event::PursuitStarted);
    }

    fn spray(&mut self, origin: Vec2, angle: f32) {
        let count = self.rng.gen_range(SPARK_COUNT);
        for _ in 0..count {
            let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let deviation = self.rng.gen_range(SPARK_SPREAD_DEGREES) as f32 * side;
            self.particles.push(Particle::new(
                origin,
                angle + deviation.to_radians(),
                self.tile_size,
            ));
        }
    }

    fn reset(&mut self, layout: abyss_core::WorldLayout, out_events: &mut Vec<Event>) {
        let player_spawn = layout.player_spawn;
        self.player = Player::spawn(
            player_spawn,
            self.tile_size,
            self.config.player.size,
            self.config.player.health,
        );
        self.ground = layout.ground;
        self.objects = layout.objects;
        self.spawn_area = layout.spawn_area;
        self.enemies.clear();
        self.bullets.clear();
        self.particles.clear();
        self.shockwaves.clear();
        self.weapon = Weapon::new(self.config.weapon.cooldown);
        self.bullet_damage = self.config.weapon.bullet_damage;
        self.enemy_stats = EnemyStatTables::from_config(&self.config.enemies);
        self.pursued = false;

        log::info!(
            "world reset: player at ({}, {}), {} spawn cells",
            player_spawn.x(),
            player_spawn.y(),
            self.spawn_area.len()
        );
        out_events.push(Event::WorldReset {
            player_spawn,
            spawn_cells: self.spawn_area.len(),
        });
    }

    fn fire(&mut self, aim: Vec2, out_events: &mut Vec<Event>) {
        if !self.weapon.try_fire() {
            return;
        }
        let weapon = &self.config.weapon;
        let center = self.player.bounds.center();
        let offset = aim - center;
        let aim_angle = offset.y.atan2(offset.x);
        let spread = weapon.spread_degrees.abs();
        let deviation = self.rng.gen_range(-spread..=spread) as f32;
        let angle = aim_angle + deviation.to_radians();

        let id = BulletId::new(self.next_bullet);
        self.next_bullet = self.next_bullet.wrapping_add(1);
        self.bullets.push(Bullet {
            id,
            bounds: Bounds::from_center(center, Vec2::splat(weapon.bullet_size)),
            angle,
            speed: weapon.bullet_speed,
            damage: self.bullet_damage,
            piercing: weapon.piercing.max(1),
            lifetime: weapon.bullet_lifetime,
        });

        let recoil = -Vec2::from_angle(aim_angle) * weapon.recoil;
        self.player.knockback = recoil;
        self.player.squash_along(recoil);

        out_events.push(Event::ShotFired { bullet: id, angle });
        self.mark_pursued(out_events);
    }

    fn move_player(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let area = self.bounds();
        let config = &self.config.player;
        let player = &mut self.player;
        player.hit_timer = (player.hit_timer - dt).max(0.0);

        let delta = player.intent() * config.speed * dt + player.knockback * dt;
        let colliders =
            entities::colliders(&self.ground, &self.objects, &player.bounds, self.tile_size);
        player.bounds = entities::confine(
            entities::slide(player.bounds, delta, &colliders),
            &area,
        );
        player.knockback = entities::damp(player.knockback, config.friction, dt);

        if player.has_left_spawn() {
            self.mark_pursued(out_events);
        }
    }

    fn advance_enemies(&mut self, dt: f32) {
        let area = self.bounds();
        let friction = self.config.enemies.friction;
        for enemy in &mut self.enemies {
            enemy.hit_timer = (enemy.hit_timer - dt).max(0.0);
            enemy.dash_timer = (enemy.dash_timer - dt).max(0.0);

            let delta = (enemy.velocity + enemy.knockback) * dt;
            let colliders =
                entities::colliders(&self.ground, &self.objects, &enemy.bounds, self.tile_size);
            enemy.bounds =
                entities::confine(entities::slide(enemy.bounds, delta, &colliders), &area);
            enemy.velocity = entities::damp(enemy.velocity, friction, dt);
            enemy.knockback = entities::damp(enemy.knockback, friction, dt);
        }
    }

    fn strike_enemy(&mut self, enemy: EnemyId, bullet: BulletId, out_events: &mut Vec<Event>) {
        let (Some(enemy_index), Some(bullet_index)) =
            (self.enemy_index(enemy), self.bullet_index(bullet))
        else {
            return;
        };
        let angle = self.bullets[bullet_index].angle;
        let damage = self.bullets[bullet_index].damage;

        let target = &mut self.enemies[enemy_index];
        if target.hit_timer > 0.0 {
            return;
        }
        target.health -= damage;
        target.hit_timer = self.config.enemies.hit_cooldown;
        target.knockback = Vec2::from_angle(angle) * self.config.enemies.knockback;
        target.pursuing = true;
        let center = target.bounds.center();
        let health = target.health;

        out_events.push(Event::EnemyDamaged { enemy, health });
        self.spray(center, angle);

        if health <= 0.0 {
            let _ = self.enemies.remove(enemy_index);
            self.shockwaves.push(Shockwave::new(center, self.tile_size));
            out_events.push(Event::EnemyKilled {
                enemy,
                position: center,
            });
        }

        let projectile = &mut self.bullets[bullet_index];
        projectile.piercing = projectile.piercing.saturating_sub(1);
        if projectile.piercing == 0 {
            let _ = self.bullets.remove(bullet_index);
            out_events.push(Event::BulletRemoved {
                bullet,
                reason: BulletRemoval::Spent,
            });
        }
    }

    fn strike_player(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        let attacker = self.enemies[index].bounds.center();
        let damage = self.enemies[index].damage;

        let player = &mut self.player;
        if player.hit_timer > 0.0 || player.health <= 0.0 {
            return;
        }
        player.health -= damage;
        player.hit_timer = self.config.player.hit_cooldown;
        let center = player.bounds.center();
        player.knockback = (center - attacker).normalize_or_zero() * self.tile_size;
        let health = player.health;

        out_events.push(Event::PlayerDamaged { health });
        if health <= 0.0 {
            log::info!("player died");
            self.shockwaves.push(Shockwave::new(center, self.tile_size));
            out_events.push(Event::PlayerDied { position: center });
        }
    }

    fn remove_bullet(
        &mut self,
        bullet: BulletId,
        reason: BulletRemoval,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self.bullet_index(bullet) else {
            return;
        };
        let removed = self.bullets.remove(index);
        if reason != BulletRemoval::Spent {
            self.spray(removed.bounds.center(), removed.angle);
        }
        out_events.push(Event::BulletRemoved { bullet, reason });
    }

    fn spawn_enemies(&mut self, count: u32, out_events: &mut Vec<Event>) {
        if self.spawn_area.is_empty() {
            log::warn!("cannot spawn {count} enemies: the spawn area is empty");
            return;
        }
        let config = &self.config.enemies;
        for _ in 0..count {
            let Some(cell) = self.spawn_area.choose(&mut self.rng).copied() else {
                return;
            };
            let (health, damage, dash_speed) = self.enemy_stats.sample(&mut self.rng);
            let id = EnemyId::new(self.next_enemy);
            self.next_enemy = self.next_enemy.wrapping_add(1);
            let origin = entities::cell_origin(cell, self.tile_size, config.size);
            self.enemies.push(Enemy {
                id,
                bounds: Bounds::new(origin, Vec2::splat(config.size)),
                velocity: Vec2::ZERO,
                knockback: Vec2::ZERO,
                health,
                damage,
                dash_speed,
                dash_timer: 0.0,
                hit_timer: 0.0,
                pursuing: false,
            });
            out_events.push(Event::EnemySpawned {
                enemy: id,
                position: origin,
            });
        }
    }

    fn apply_player_buff(&mut self, buff: PlayerBuff, out_events: &mut Vec<Event>) {
        let weapon = &self.config.weapon;
        let applied = match buff {
            PlayerBuff::BulletDamage if self.bullet_damage < weapon.max_bullet_damage => {
                self.bullet_damage += weapon.damage_step;
                true
            }
            PlayerBuff::WeaponCooldown if self.weapon.cooldown > weapon.min_cooldown => {
                self.weapon.cooldown -= 1.0;
                true
            }
            PlayerBuff::PlayerHealth if self.player.health < self.config.player.max_health => {
                self.player.health += 1.0;
                true
            }
            _ => false,
        };
        if applied {
            log::debug!("player buff applied: {buff:?}");
            out_events.push(Event::PlayerBuffApplied { buff });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResetWorld { layout } => world.reset(layout, out_events),
        Command::SetMovementKey { direction, held } => world.player.set_held(direction, held),
        Command::Fire { aim } => world.fire(aim, out_events),
        Command::MovePlayer { dt } => world.move_player(dt, out_events),
        Command::DashEnemy { enemy, heading } => {
            let dash_interval = world.config.enemies.dash_interval;
            let Some(index) = world.enemy_index(enemy) else {
                return;
            };
            let target = &mut world.enemies[index];
            if target.dash_timer > 0.0 {
                return;
            }
            target.velocity = heading.normalize_or_zero() * target.dash_speed;
            target.dash_timer = dash_interval;
        }
        Command::AdvanceEnemies { dt } => world.advance_enemies(dt),
        Command::AdvanceWeapon { dt } => world.weapon.advance(dt),
        Command::AdvanceBullets { dt } => {
            for bullet in &mut world.bullets {
                bullet.advance(dt);
            }
        }
        Command::AdvanceEffects { dt } => {
            world.particles.retain_mut(|particle| particle.advance(dt));
            world.shockwaves.retain_mut(|shockwave| shockwave.advance(dt));
            world.player.recover_scale(dt);
        }
        Command::StrikeEnemy { enemy, bullet } => world.strike_enemy(enemy, bullet, out_events),
        Command::StrikePlayer { enemy } => world.strike_player(enemy, out_events),
        Command::RemoveBullet { bullet, reason } => world.remove_bullet(bullet, reason, out_events),
        Command::SpawnEnemies { count } => world.spawn_enemies(count, out_events),
        Command::ApplyPlayerBuff { buff } => world.apply_player_buff(buff, out_events),
        Command::ApplyEnemyBuff { buff } => {
            world.enemy_stats.grow(buff);
            log::debug!("enemy buff applied: {buff:?}");
            out_events.push(Event::EnemyBuffApplied { buff });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use abyss_core::{
        Bounds, BulletView, EnemyView, PlayerSnapshot, Position, TileTypeMap,
    };

    use super::{EnemyStatTables, Particle, Shockwave, World};

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| enemy.snapshot(world.pursued))
                .collect(),
        )
    }

    /// Captures a read-only view of every bullet in flight.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(world.bullets.iter().map(|bullet| bullet.snapshot()).collect())
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Sparks currently in flight.
    #[must_use]
    pub fn particles(world: &World) -> &[Particle] {
        &world.particles
    }

    /// Shockwave rings currently expanding.
    #[must_use]
    pub fn shockwaves(world: &World) -> &[Shockwave] {
        &world.shockwaves
    }

    /// Object layer classification used for bullet obstruction.
    #[must_use]
    pub fn obstacles(world: &World) -> &TileTypeMap {
        &world.objects
    }

    /// Ground layer classification.
    #[must_use]
    pub fn ground(world: &World) -> &TileTypeMap {
        &world.ground
    }

    /// Cells enemies spawn on.
    #[must_use]
    pub fn spawn_area(world: &World) -> &[Position] {
        &world.spawn_area
    }

    /// Rectangle covered by the tile grid, in world pixels.
    #[must_use]
    pub fn world_bounds(world: &World) -> Bounds {
        world.bounds()
    }

    /// Edge length of a tile in pixels.
    #[must_use]
    pub fn tile_size(world: &World) -> f32 {
        world.tile_size
    }

    /// Damage dealt by newly fired bullets.
    #[must_use]
    pub fn bullet_damage(world: &World) -> f32 {
        world.bullet_damage
    }

    /// Frames between shots.
    #[must_use]
    pub fn weapon_cooldown(world: &World) -> f32 {
        world.weapon.cooldown
    }

    /// Stat tables sampled by future spawns.
    #[must_use]
    pub fn enemy_stats(world: &World) -> &EnemyStatTables {
        &world.enemy_stats
    }

    /// Whether every enemy is chasing the player.
    #[must_use]
    pub fn pursued(world: &World) -> bool {
        world.pursued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abyss_core::{Direction, TileType, WorldLayout};

    /// 8×6 island of dirt ringed by air.
    fn layout() -> WorldLayout {
        let ground = TileTypeMap::from_fn(8, 6, |position| {
            let inside = (1..7).contains(&position.x()) && (1..5).contains(&position.y());
            if inside {
                TileType::Dirt
            } else {
                TileType::Air
            }
        });
        let objects = TileTypeMap::new(8, 6, TileType::Air);
        let spawn_area = ground
            .iter()
            .filter(|(_, tile)| tile.is_solid_mass())
            .map(|(position, _)| position)
            .collect();
        WorldLayout {
            ground,
            objects,
            spawn_area,
            player_spawn: Position::new(3, 2),
        }
    }

    fn loaded_world() -> World {
        let mut world = World::new(&GameConfig::default(), 7);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResetWorld { layout: layout() },
            &mut events,
        );
        world
    }

    fn spawn_one(world: &mut World) -> EnemyId {
        let mut events = Vec::new();
        apply(world, Command::SpawnEnemies { count: 1 }, &mut events);
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("unexpected events {other:?}"),
        }
    }

    fn fire_once(world: &mut World) -> BulletId {
        let mut events = Vec::new();
        let aim = query::player(world).bounds.center() + Vec2::new(40.0, 0.0);
        apply(world, Command::Fire { aim }, &mut events);
        events
            .iter()
            .find_map(|event| match event {
                Event::ShotFired { bullet, .. } => Some(*bullet),
                _ => None,
            })
            .expect("shot fired")
    }

    #[test]
    fn reset_places_player_in_spawn_cell() {
        let mut world = World::new(&GameConfig::default(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResetWorld { layout: layout() },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::WorldReset {
                player_spawn: Position::new(3, 2),
                spawn_cells: 24,
            }]
        );
        let player = query::player(&world);
        assert_eq!(player.bounds.center(), Vec2::new(56.0, 40.0));
        assert_eq!(player.health, 6.0);
        assert_eq!(query::world_bounds(&world).size(), Vec2::new(128.0, 96.0));
    }

    #[test]
    fn firing_respects_cooldown_and_starts_pursuit_once() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        let aim = query::player(&world).bounds.center() + Vec2::new(0.0, 30.0);

        apply(&mut world, Command::Fire { aim }, &mut events);
        apply(&mut world, Command::Fire { aim }, &mut events);

        assert_eq!(query::bullet_view(&world).len(), 1);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::PursuitStarted))
                .count(),
            1
        );
        let Some(Event::ShotFired { angle, .. }) = events.first() else {
            panic!("expected a shot, got {events:?}");
        };
        let spread = 3.0_f32.to_radians() + 1e-5;
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() <= spread);
        assert!(query::player(&world).scale.y < 1.0);

        apply(&mut world, Command::AdvanceWeapon { dt: 12.0 }, &mut events);
        apply(&mut world, Command::Fire { aim }, &mut events);
        assert_eq!(query::bullet_view(&world).len(), 2);
    }

    #[test]
    fn spawned_enemies_stand_on_spawn_cells() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnEnemies { count: 10 }, &mut events);

        assert_eq!(events.len(), 10);
        assert_eq!(query::enemy_count(&world), 10);
        for enemy in query::enemy_view(&world).iter() {
            let cell = Position::containing(enemy.bounds.center(), 16.0);
            assert!(query::spawn_area(&world).contains(&cell));
            assert!(!enemy.pursuing);
        }
    }

    #[test]
    fn spawning_without_spawn_area_is_a_no_op() {
        let mut world = World::new(&GameConfig::default(), 3);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnEnemies { count: 5 }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::enemy_count(&world), 0);
    }

    #[test]
    fn strike_kills_enemy_and_spends_bullet() {
        let mut world = loaded_world();
        let enemy = spawn_one(&mut world);
        let bullet = fire_once(&mut world);
        let mut events = Vec::new();

        apply(&mut world, Command::StrikeEnemy { enemy, bullet }, &mut events);

        assert!(matches!(
            events[0],
            Event::EnemyDamaged { health, .. } if health == 1.0
        ));
        assert!(query::enemy_view(&world).iter().all(|snapshot| snapshot.pursuing));
        assert!(events.contains(&Event::BulletRemoved {
            bullet,
            reason: BulletRemoval::Spent,
        }));
        assert!(!query::particles(&world).is_empty());

        let second = fire_once_after_cooldown(&mut world);
        events.clear();
        apply(
            &mut world,
            Command::StrikeEnemy {
                enemy,
                bullet: second,
            },
            &mut events,
        );
        assert!(events.is_empty(), "enemy still on hit cooldown");

        apply(&mut world, Command::AdvanceEnemies { dt: 8.0 }, &mut events);
        apply(
            &mut world,
            Command::StrikeEnemy {
                enemy,
                bullet: second,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { enemy: killed, .. } if *killed == enemy)));
        assert_eq!(query::enemy_count(&world), 0);
        assert_eq!(query::shockwaves(&world).len(), 1);
    }

    fn fire_once_after_cooldown(world: &mut World) -> BulletId {
        let mut events = Vec::new();
        apply(world, Command::AdvanceWeapon { dt: 12.0 }, &mut events);
        fire_once(world)
    }

    #[test]
    fn removing_a_missing_bullet_is_ignored() {
        let mut world = loaded_world();
        let bullet = fire_once(&mut world);
        let mut events = Vec::new();
        let command = Command::RemoveBullet {
            bullet,
            reason: BulletRemoval::Expired,
        };

        apply(&mut world, command.clone(), &mut events);
        apply(&mut world, command, &mut events);

        assert_eq!(
            events,
            vec![Event::BulletRemoved {
                bullet,
                reason: BulletRemoval::Expired,
            }]
        );
    }

    #[test]
    fn player_strikes_respect_invulnerability_and_knock_back() {
        let mut world = loaded_world();
        let enemy = spawn_one(&mut world);
        let mut events = Vec::new();

        apply(&mut world, Command::StrikePlayer { enemy }, &mut events);
        apply(&mut world, Command::StrikePlayer { enemy }, &mut events);

        assert_eq!(events, vec![Event::PlayerDamaged { health: 5.0 }]);
        assert!(!query::player(&world).hit_ready);
    }

    #[test]
    fn lethal_strike_reports_death() {
        let mut config = GameConfig::default();
        config.player.health = 1.0;
        let mut world = World::new(&config, 2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ResetWorld { layout: layout() },
            &mut events,
        );
        let enemy = spawn_one(&mut world);
        events.clear();

        apply(&mut world, Command::StrikePlayer { enemy }, &mut events);

        assert!(matches!(events.last(), Some(Event::PlayerDied { .. })));
        assert_eq!(query::shockwaves(&world).len(), 1);
    }

    #[test]
    fn player_buffs_stop_at_their_caps() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        for _ in 0..20 {
            apply(
                &mut world,
                Command::ApplyPlayerBuff {
                    buff: PlayerBuff::WeaponCooldown,
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::ApplyPlayerBuff {
                    buff: PlayerBuff::BulletDamage,
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::ApplyPlayerBuff {
                    buff: PlayerBuff::PlayerHealth,
                },
                &mut events,
            );
        }

        assert_eq!(query::weapon_cooldown(&world), 4.0);
        assert_eq!(query::bullet_damage(&world), 6.0);
        assert_eq!(query::player(&world).health, 10.0);
        assert_eq!(events.len(), 8 + 10 + 4);
    }

    #[test]
    fn enemy_buffs_extend_tables() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyEnemyBuff {
                buff: EnemyBuff::Speed,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ApplyEnemyBuff {
                buff: EnemyBuff::Speed,
            },
            &mut events,
        );

        assert_eq!(query::enemy_stats(&world).dash_speeds(), &[2.0, 3.0, 4.0]);
        assert_eq!(query::enemy_stats(&world).healths(), &[2.0]);
    }

    #[test]
    fn island_edge_stops_the_player() {
        let mut world = loaded_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetMovementKey {
                direction: Direction::Up,
                held: true,
            },
            &mut events,
        );
        for _ in 0..60 {
            apply(&mut world, Command::MovePlayer { dt: 1.0 }, &mut events);
        }

        let player = query::player(&world);
        assert_eq!(player.bounds.origin().y, 16.0);
        assert_eq!(events, vec![Event::PursuitStarted]);
    }

    #[test]
    fn dash_waits_for_interval() {
        let mut world = loaded_world();
        let enemy = spawn_one(&mut world);
        let mut events = Vec::new();
        let heading = Vec2::new(1.0, 0.0);

        apply(&mut world, Command::DashEnemy { enemy, heading }, &mut events);
        let dashing = query::enemy_view(&world).into_vec()[0];
        assert!(!dashing.dash_ready);

        apply(&mut world, Command::AdvanceEnemies { dt: 40.0 }, &mut events);
        assert!(query::enemy_view(&world).into_vec()[0].dash_ready);
    }
}
