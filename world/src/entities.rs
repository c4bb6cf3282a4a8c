//! Mutable entity records owned by the world.

use abyss_core::{
    BulletId, BulletSnapshot, Bounds, Direction, EnemyId, EnemySnapshot, PlayerSnapshot, Position,
    TileTypeMap,
};
use glam::Vec2;

const SQUASH: f32 = 0.8;
const SQUASH_RECOVERY: f32 = 0.2;
const RESTING_SPEED: f32 = 0.05;

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) bounds: Bounds,
    pub(crate) spawn_origin: Vec2,
    pub(crate) held: [bool; 4],
    pub(crate) knockback: Vec2,
    pub(crate) health: f32,
    pub(crate) hit_timer: f32,
    pub(crate) scale: Vec2,
}

impl Player {
    pub(crate) fn spawn(cell: Position, tile_size: f32, size: f32, health: f32) -> Self {
        let origin = cell_origin(cell, tile_size, size);
        Self {
            bounds: Bounds::new(origin, Vec2::splat(size)),
            spawn_origin: origin,
            held: [false; 4],
            knockback: Vec2::ZERO,
            health,
            hit_timer: 0.0,
            scale: Vec2::ONE,
        }
    }

    pub(crate) fn set_held(&mut self, direction: Direction, held: bool) {
        self.held[direction_slot(direction)] = held;
    }

    /// Unit vector of the held movement keys, zero when they cancel out.
    pub(crate) fn intent(&self) -> Vec2 {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.held[direction_slot(*direction)])
            .map(Direction::unit_vector)
            .sum::<Vec2>()
            .normalize_or_zero()
    }

    pub(crate) fn has_left_spawn(&self) -> bool {
        self.bounds.origin() != self.spawn_origin
    }

    pub(crate) fn squash_along(&mut self, push: Vec2) {
        self.scale = if push.x.abs() > push.y.abs() {
            Vec2::new(SQUASH, 1.0)
        } else {
            Vec2::new(1.0, SQUASH)
        };
    }

    pub(crate) fn recover_scale(&mut self, dt: f32) {
        let step = (SQUASH_RECOVERY * dt).min(1.0);
        self.scale += (Vec2::ONE - self.scale) * step;
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            bounds: self.bounds,
            health: self.health,
            hit_ready: self.hit_timer <= 0.0,
            scale: self.scale,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) bounds: Bounds,
    pub(crate) velocity: Vec2,
    pub(crate) knockback: Vec2,
    pub(crate) health: f32,
    pub(crate) damage: f32,
    pub(crate) dash_speed: f32,
    pub(crate) dash_timer: f32,
    pub(crate) hit_timer: f32,
    pub(crate) pursuing: bool,
}

impl Enemy {
    pub(crate) fn snapshot(&self, pursued: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            bounds: self.bounds,
            health: self.health,
            damage: self.damage,
            hit_ready: self.hit_timer <= 0.0,
            dash_ready: self.dash_timer <= 0.0,
            pursuing: self.pursuing || pursued,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Bullet {
    pub(crate) id: BulletId,
    pub(crate) bounds: Bounds,
    pub(crate) angle: f32,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) piercing: u32,
    pub(crate) lifetime: f32,
}

impl Bullet {
    pub(crate) fn advance(&mut self, dt: f32) {
        let heading = Vec2::from_angle(self.angle);
        self.bounds = self.bounds.translated(heading * self.speed * dt);
        self.lifetime -= dt;
    }

    pub(crate) fn snapshot(&self) -> BulletSnapshot {
        BulletSnapshot {
            id: self.id,
            bounds: self.bounds,
            angle: self.angle,
            damage: self.damage,
            piercing: self.piercing,
            expired: self.lifetime <= 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Weapon {
    pub(crate) cooldown: f32,
    timer: f32,
}

impl Weapon {
    pub(crate) const fn new(cooldown: f32) -> Self {
        Self {
            cooldown,
            timer: 0.0,
        }
    }

    /// Starts the cooldown and reports whether a shot may leave the barrel.
    pub(crate) fn try_fire(&mut self) -> bool {
        if self.timer > 0.0 {
            return false;
        }
        self.timer = self.cooldown;
        true
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        if self.timer > 0.0 {
            self.timer -= dt;
        }
    }
}

/// Reduces `velocity` by `friction` per frame, snapping tiny values to rest.
pub(crate) fn damp(velocity: Vec2, friction: f32, dt: f32) -> Vec2 {
    let keep = (1.0 - friction * dt).clamp(0.0, 1.0);
    let damped = velocity * keep;
    if damped.length_squared() < RESTING_SPEED * RESTING_SPEED {
        Vec2::ZERO
    } else {
        damped
    }
}

/// Top-left corner that centres an entity of `size` inside `cell`.
pub(crate) fn cell_origin(cell: Position, tile_size: f32, size: f32) -> Vec2 {
    Vec2::new(cell.x() as f32, cell.y() as f32) * tile_size + Vec2::splat((tile_size - size) * 0.5)
}

/// Whether a cell stops walking entities.
///
/// Open air and rims in the ground layer block, as do solid masses in the
/// object layer. Cells outside both maps never block.
pub(crate) fn blocks(ground: &TileTypeMap, objects: &TileTypeMap, cell: Position) -> bool {
    let ground_blocks = ground
        .get(cell)
        .is_some_and(|tile| !tile.is_solid_mass());
    let object_blocks = objects.get(cell).is_some_and(|tile| tile.is_solid_mass());
    ground_blocks || object_blocks
}

/// Blocking rectangles among the eight cells around the cell holding the
/// top-left corner of `bounds`.
pub(crate) fn colliders(
    ground: &TileTypeMap,
    objects: &TileTypeMap,
    bounds: &Bounds,
    tile_size: f32,
) -> Vec<Bounds> {
    let cell = Position::containing(bounds.origin(), tile_size);
    let mut found = Vec::with_capacity(8);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbor = cell.offset(dx, dy);
            if blocks(ground, objects, neighbor) {
                found.push(Bounds::new(
                    Vec2::new(neighbor.x() as f32, neighbor.y() as f32) * tile_size,
                    Vec2::splat(tile_size),
                ));
            }
        }
    }
    found
}

/// Moves `bounds` by `delta` one axis at a time, stopping flush against any
/// collider it would overlap.
pub(crate) fn slide(bounds: Bounds, delta: Vec2, colliders: &[Bounds]) -> Bounds {
    let mut origin = bounds.origin() + Vec2::new(delta.x, 0.0);
    let size = bounds.size();
    for collider in colliders {
        if !Bounds::new(origin, size).intersects(collider) {
            continue;
        }
        if delta.x > 0.0 {
            origin.x = collider.origin().x - size.x;
        } else if delta.x < 0.0 {
            origin.x = collider.right();
        }
    }

    origin.y += delta.y;
    for collider in colliders {
        if !Bounds::new(origin, size).intersects(collider) {
            continue;
        }
        if delta.y > 0.0 {
            origin.y = collider.origin().y - size.y;
        } else if delta.y < 0.0 {
            origin.y = collider.bottom();
        }
    }

    Bounds::new(origin, size)
}

/// Keeps `bounds` inside `area`.
pub(crate) fn confine(bounds: Bounds, area: &Bounds) -> Bounds {
    let max = (area.origin() + area.size() - bounds.size()).max(area.origin());
    Bounds::new(bounds.origin().clamp(area.origin(), max), bounds.size())
}

const fn direction_slot(direction: Direction) -> usize {
    match direction {
        Direction::Up => 0,
        Direction::Right => 1,
        Direction::Down => 2,
        Direction::Left => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abyss_core::TileType;

    #[test]
    fn slide_stops_flush_against_wall() {
        let wall = Bounds::new(Vec2::new(16.0, 0.0), Vec2::splat(16.0));
        let moved = slide(
            Bounds::new(Vec2::new(2.0, 2.0), Vec2::splat(12.0)),
            Vec2::new(5.0, 0.0),
            &[wall],
        );
        assert_eq!(moved.origin(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn slide_keeps_free_axis_motion() {
        let wall = Bounds::new(Vec2::new(16.0, 0.0), Vec2::splat(16.0));
        let moved = slide(
            Bounds::new(Vec2::new(2.0, 2.0), Vec2::splat(12.0)),
            Vec2::new(5.0, 1.5),
            &[wall],
        );
        assert_eq!(moved.origin(), Vec2::new(4.0, 3.5));
    }

    #[test]
    fn ground_air_and_solid_objects_block() {
        let ground = TileTypeMap::from_fn(3, 1, |position| match position.x() {
            0 => TileType::Air,
            1 => TileType::Dirt,
            _ => TileType::Edge,
        });
        let objects = TileTypeMap::from_fn(3, 1, |position| {
            if position.x() == 1 {
                TileType::Dirt2
            } else {
                TileType::Air
            }
        });
        assert!(blocks(&ground, &objects, Position::new(0, 0)));
        assert!(blocks(&ground, &objects, Position::new(1, 0)));
        assert!(blocks(&ground, &objects, Position::new(2, 0)));
        assert!(!blocks(&ground, &objects, Position::new(5, 5)));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut player = Player::spawn(Position::new(1, 1), 16.0, 12.0, 6.0);
        player.set_held(Direction::Left, true);
        player.set_held(Direction::Right, true);
        assert_eq!(player.intent(), Vec2::ZERO);
        player.set_held(Direction::Up, true);
        assert_eq!(player.intent(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn weapon_fires_once_per_cooldown() {
        let mut weapon = Weapon::new(12.0);
        assert!(weapon.try_fire());
        assert!(!weapon.try_fire());
        weapon.advance(11.0);
        assert!(!weapon.try_fire());
        weapon.advance(1.0);
        assert!(weapon.try_fire());
    }

    #[test]
    fn damping_comes_to_rest() {
        let mut velocity = Vec2::new(4.0, 0.0);
        for _ in 0..200 {
            velocity = damp(velocity, 0.08, 1.0);
        }
        assert_eq!(velocity, Vec2::ZERO);
    }
}
