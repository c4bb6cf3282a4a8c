#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across Escape From The Abyss.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The game context submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.
//!
//! Tile data shared by the generation pipeline lives in [`TileTypeMap`] and
//! [`TileLayer`], while [`Surface`] provides the owned pixel buffers that tile
//! images and cached chunks are composited into.

mod config;
mod surface;
mod tiles;

pub use config::{
    CameraConfig, ConfigError, EnemyConfig, GameConfig, PlayerConfig, ThresholdBand,
    ThresholdTable, WaveConfig, WeaponConfig, WorldConfig,
};
pub use surface::{PixelRect, Rgba, Surface};
pub use tiles::{Tile, TileLayer, TileTypeMap, WorldLayout};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Escape From The Abyss";

/// Integer grid coordinate addressing a single world cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position shifted by the provided cell offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Orthogonal neighbour reached by stepping in `direction`.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Euclidean distance between two cell positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Cell containing the provided world-space point.
    #[must_use]
    pub fn containing(point: Vec2, tile_size: f32) -> Self {
        if tile_size <= 0.0 {
            return Self::default();
        }
        Self::new(
            (point.x / tile_size).floor() as i32,
            (point.y / tile_size).floor() as i32,
        )
    }
}

/// Orthogonal directions used for neighbour lookups and movement input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    Up,
    /// Toward increasing columns.
    Right,
    /// Toward increasing rows.
    Down,
    /// Toward decreasing columns.
    Left,
}

impl Direction {
    /// All four directions in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit cell offset for the direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Bit assigned to the direction inside a 4-bit connectivity mask.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Right => 0b0010,
            Self::Down => 0b0100,
            Self::Left => 0b1000,
        }
    }

    /// Unit vector pointing along the direction in world space.
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        let (dx, dy) = self.offset();
        Vec2::new(dx as f32, dy as f32)
    }
}

/// Classification assigned to every generated cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    /// Empty, transparent cell.
    Air,
    /// Primary solid mass.
    Dirt,
    /// Secondary solid mass with a darker palette.
    Dirt2,
    /// Rim drawn along the underside of a solid mass.
    Edge,
}

impl TileType {
    /// Whether the tile belongs to a solid mass (`Dirt` or `Dirt2`).
    #[must_use]
    pub const fn is_solid_mass(self) -> bool {
        matches!(self, Self::Dirt | Self::Dirt2)
    }

    /// Whether the tile counts as walkable floor in the ground layer.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Dirt | Self::Dirt2 | Self::Edge)
    }

    /// Base palette color painted into freshly created tile images.
    #[must_use]
    pub const fn base_color(self) -> Rgba {
        match self {
            Self::Air => Rgba::TRANSPARENT,
            Self::Dirt => Rgba::from_hex(0x40_20_60),
            Self::Dirt2 => Rgba::from_hex(0x3a_22_56),
            Self::Edge => Rgba::from_hex(0x11_09_23),
        }
    }
}

/// Identifies one of the two tile layers of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Walkable floor drawn behind entities.
    Ground,
    /// Solid obstacles used for obstruction.
    Objects,
}

/// Chunk-grid coordinate produced by floor-dividing tile positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    x: i32,
    y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk column.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Chunk row.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Chunk owning the provided tile position.
    ///
    /// Returns the origin chunk when either dimension is zero.
    #[must_use]
    pub fn containing(position: Position, columns: u32, rows: u32) -> Self {
        let (Ok(columns), Ok(rows)) = (i32::try_from(columns), i32::try_from(rows)) else {
            return Self::default();
        };
        if columns == 0 || rows == 0 {
            return Self::default();
        }
        Self::new(position.x().div_euclid(columns), position.y().div_euclid(rows))
    }

    /// The 3×3 block of chunks centred on this chunk, in row-major order.
    #[must_use]
    pub fn neighborhood(self) -> [ChunkCoord; 9] {
        let mut block = [self; 9];
        let mut slot = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                block[slot] = Self::new(self.x + dx, self.y + dy);
                slot += 1;
            }
        }
        block
    }
}

impl Default for ChunkCoord {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned rectangle in world pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    origin: Vec2,
    size: Vec2,
}

impl Bounds {
    /// Creates bounds anchored at the top-left `origin`.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Creates bounds of `size` centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Bounds moved by `delta`.
    #[must_use]
    pub fn translated(self, delta: Vec2) -> Self {
        Self::new(self.origin + delta, self.size)
    }

    /// Whether the two rectangles overlap with a non-zero area.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.origin.x < other.right()
            && other.origin.x < self.right()
            && self.origin.y < other.bottom()
            && other.origin.y < self.bottom()
    }

    /// Whether the point lies inside the rectangle (right/bottom exclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.x < self.right()
            && point.y >= self.origin.y
            && point.y < self.bottom()
    }
}

/// Gameplay phases driven by the wave controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Reveal animation before the first wave.
    Intro,
    /// Wave in progress.
    Active,
    /// Wave cleared, buffs are being applied before the next spawn.
    Upgrading,
    /// Player died; the vignette is closing and gameplay is frozen.
    LostFadeIn,
    /// Vignette closed; waiting for the restart key.
    LostFadeOut,
    /// Restart requested; the world is being regenerated.
    Restarting,
}

impl GamePhase {
    /// Whether gameplay systems run during this phase.
    #[must_use]
    pub const fn simulates(self) -> bool {
        matches!(self, Self::Active | Self::Upgrading)
    }
}

/// Player and weapon upgrades awarded between waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerBuff {
    /// Adds half a point of bullet damage.
    BulletDamage,
    /// Shortens the weapon cooldown by one frame.
    WeaponCooldown,
    /// Restores one point of player health.
    PlayerHealth,
}

impl PlayerBuff {
    /// Message announced when the buff is applied.
    #[must_use]
    pub const fn announcement(self) -> &'static str {
        match self {
            Self::BulletDamage => "Bullets Damage: +0.5",
            Self::WeaponCooldown => "Weapon Cooldown: -1",
            Self::PlayerHealth => "Player Health: +1",
        }
    }
}

/// Difficulty increases applied to newly spawned enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyBuff {
    /// Extends the enemy damage table.
    Damage,
    /// Extends the enemy dash speed table.
    Speed,
    /// Extends the enemy health table.
    Health,
}

impl EnemyBuff {
    /// Message announced when the buff is applied.
    #[must_use]
    pub const fn announcement(self) -> &'static str {
        match self {
            Self::Damage => "Buffed monster attack damage",
            Self::Speed => "Buffed monster speed",
            Self::Health => "Buffed monster health",
        }
    }
}

/// Keys understood by the game context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Movement key held toward a direction.
    Move(Direction),
    /// Restart request issued after death.
    Restart,
}

/// Mouse button state sampled for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseButtons {
    /// Primary button, fires the weapon while held.
    pub left: bool,
    /// Middle button.
    pub middle: bool,
    /// Secondary button.
    pub right: bool,
}

/// Reason a bullet left the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulletRemoval {
    /// Piercing reached zero after striking enemies.
    Spent,
    /// Lifetime ran out.
    Expired,
    /// Bullet left the world bounds.
    OutOfBounds,
    /// Bullet entered a solid object-layer cell.
    HitWall,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the tile maps and clears every entity collection.
    ResetWorld {
        /// Freshly generated layout used for collisions and spawning.
        layout: WorldLayout,
    },
    /// Records that a movement key was pressed or released.
    SetMovementKey {
        /// Direction bound to the key.
        direction: Direction,
        /// Whether the key is now held.
        held: bool,
    },
    /// Fires the weapon toward a world-space point if it is ready.
    Fire {
        /// Point the player aims at, expressed in world pixels.
        aim: Vec2,
    },
    /// Moves the player using the held movement keys.
    MovePlayer {
        /// Elapsed frame units.
        dt: f32,
    },
    /// Launches an enemy dash along the provided heading.
    DashEnemy {
        /// Enemy that dashes.
        enemy: EnemyId,
        /// Direction of the dash; normalised by the world.
        heading: Vec2,
    },
    /// Integrates enemy motion against the tile grid.
    AdvanceEnemies {
        /// Elapsed frame units.
        dt: f32,
    },
    /// Counts down the weapon cooldown.
    AdvanceWeapon {
        /// Elapsed frame units.
        dt: f32,
    },
    /// Moves bullets along their headings.
    AdvanceBullets {
        /// Elapsed frame units.
        dt: f32,
    },
    /// Animates particles, shockwaves and the player squash.
    AdvanceEffects {
        /// Elapsed frame units.
        dt: f32,
    },
    /// Applies a bullet strike to an enemy.
    StrikeEnemy {
        /// Enemy hit by the bullet.
        enemy: EnemyId,
        /// Bullet that landed the hit.
        bullet: BulletId,
    },
    /// Applies an enemy strike to the player.
    StrikePlayer {
        /// Enemy that touched the player.
        enemy: EnemyId,
    },
    /// Removes a bullet from the world.
    RemoveBullet {
        /// Bullet to remove.
        bullet: BulletId,
        /// Why the bullet is removed.
        reason: BulletRemoval,
    },
    /// Spawns enemies at random spawn-area cells.
    SpawnEnemies {
        /// Number of enemies to create.
        count: u32,
    },
    /// Applies a player or weapon upgrade, respecting its cap.
    ApplyPlayerBuff {
        /// Upgrade to apply.
        buff: PlayerBuff,
    },
    /// Extends one of the enemy stat tables.
    ApplyEnemyBuff {
        /// Difficulty increase to apply.
        buff: EnemyBuff,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The world adopted a new layout.
    WorldReset {
        /// Cell the player spawned on.
        player_spawn: Position,
        /// Number of cells enemies may spawn on.
        spawn_cells: usize,
    },
    /// Enemies started chasing the player.
    PursuitStarted,
    /// A bullet left the barrel.
    ShotFired {
        /// Identifier assigned to the bullet.
        bullet: BulletId,
        /// Heading of the bullet in radians.
        angle: f32,
    },
    /// An enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Top-left corner of the enemy in world pixels.
        position: Vec2,
    },
    /// A bullet damaged an enemy.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Health remaining after the hit.
        health: f32,
    },
    /// An enemy was destroyed.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Centre of the enemy at the time of death.
        position: Vec2,
    },
    /// A bullet was removed.
    BulletRemoved {
        /// Bullet that left the world.
        bullet: BulletId,
        /// Why it was removed.
        reason: BulletRemoval,
    },
    /// The player took damage.
    PlayerDamaged {
        /// Health remaining after the hit.
        health: f32,
    },
    /// The player's health reached zero.
    PlayerDied {
        /// Centre of the player at the time of death.
        position: Vec2,
    },
    /// A player buff raised a stat.
    PlayerBuffApplied {
        /// Buff that took effect.
        buff: PlayerBuff,
    },
    /// An enemy stat table grew.
    EnemyBuffApplied {
        /// Buff that took effect.
        buff: EnemyBuff,
    },
}

/// Immutable view of the player used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Collision rectangle in world pixels.
    pub bounds: Bounds,
    /// Remaining health.
    pub health: f32,
    /// Whether the player can take damage this frame.
    pub hit_ready: bool,
    /// Horizontal and vertical squash applied when drawing.
    pub scale: Vec2,
}

/// Immutable view of an enemy used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Collision rectangle in world pixels.
    pub bounds: Bounds,
    /// Remaining health.
    pub health: f32,
    /// Damage dealt to the player on contact.
    pub damage: f32,
    /// Whether bullets can currently damage the enemy.
    pub hit_ready: bool,
    /// Whether the enemy may start another dash.
    pub dash_ready: bool,
    /// Whether the enemy is chasing the player.
    pub pursuing: bool,
}

/// Immutable view of a bullet used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier of the bullet.
    pub id: BulletId,
    /// Collision rectangle in world pixels.
    pub bounds: Bounds,
    /// Heading in radians.
    pub angle: f32,
    /// Damage dealt per strike.
    pub damage: f32,
    /// Remaining enemies the bullet can pass through.
    pub piercing: u32,
    /// Whether the bullet's lifetime ran out.
    pub expired: bool,
}

/// Read-only snapshot describing all enemies, sorted by identifier.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all bullets, sorted by identifier.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BulletSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Number of bullets captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the view holds no bullets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BulletSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, ChunkCoord, Direction, GameConfig, Position, TileType};
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(-4, 17));
    }

    #[test]
    fn game_config_round_trips_through_bincode() {
        assert_round_trip(&GameConfig::default());
    }

    #[test]
    fn chunk_coord_floor_divides_negative_positions() {
        assert_eq!(
            ChunkCoord::containing(Position::new(31, 17), 32, 18),
            ChunkCoord::new(0, 0)
        );
        assert_eq!(
            ChunkCoord::containing(Position::new(32, 18), 32, 18),
            ChunkCoord::new(1, 1)
        );
        assert_eq!(
            ChunkCoord::containing(Position::new(-1, -1), 32, 18),
            ChunkCoord::new(-1, -1)
        );
    }

    #[test]
    fn neighborhood_lists_nine_chunks_around_center() {
        let block = ChunkCoord::new(2, 5).neighborhood();
        assert_eq!(block[0], ChunkCoord::new(1, 4));
        assert_eq!(block[4], ChunkCoord::new(2, 5));
        assert_eq!(block[8], ChunkCoord::new(3, 6));
    }

    #[test]
    fn direction_bits_are_distinct() {
        let combined = Direction::ALL
            .iter()
            .fold(0_u8, |mask, direction| mask | direction.bit());
        assert_eq!(combined, 0b1111);
    }

    #[test]
    fn walkable_and_solid_classifications() {
        assert!(TileType::Edge.is_walkable());
        assert!(!TileType::Edge.is_solid_mass());
        assert!(TileType::Dirt2.is_solid_mass());
        assert!(!TileType::Air.is_walkable());
    }

    #[test]
    fn touching_bounds_do_not_intersect() {
        let a = Bounds::new(Vec2::ZERO, Vec2::splat(16.0));
        let b = Bounds::new(Vec2::new(16.0, 0.0), Vec2::splat(16.0));
        let c = Bounds::new(Vec2::new(15.0, 15.0), Vec2::splat(4.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn position_containing_floors_world_points() {
        assert_eq!(
            Position::containing(Vec2::new(-0.5, 31.9), 16.0),
            Position::new(-1, 1)
        );
    }
}
