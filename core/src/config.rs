//! Tunable gameplay parameters.
//!
//! Every section deserialises with defaults so adapters may load partial
//! overrides from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TileType;

/// Reasons a [`GameConfig`] is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A dimension that must be positive was zero.
    #[error("{field} must be positive")]
    ZeroDimension {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A threshold table contained no bands.
    #[error("{table} threshold table is empty")]
    EmptyThresholds {
        /// Which table was empty.
        table: &'static str,
    },
    /// A threshold band had its bounds reversed.
    #[error("{table} threshold band {index} has low {low} above high {high}")]
    InvertedBand {
        /// Which table holds the band.
        table: &'static str,
        /// Position of the band in the table.
        index: usize,
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// An enemy stat table contained no entries.
    #[error("enemy {table} table is empty")]
    EmptyStatTable {
        /// Which stat table was empty.
        table: &'static str,
    },
    /// A min/max pair was reversed.
    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        /// Name of the range.
        field: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
}

/// Complete set of tunables consumed by the game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// World dimensions and terrain thresholds.
    pub world: WorldConfig,
    /// Player movement and health.
    pub player: PlayerConfig,
    /// Weapon and bullet behaviour.
    pub weapon: WeaponConfig,
    /// Enemy stats and movement.
    pub enemies: EnemyConfig,
    /// Wave pacing and buff cadence.
    pub waves: WaveConfig,
    /// Camera follow and shake.
    pub camera: CameraConfig,
}

impl GameConfig {
    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        for (field, value) in [
            ("screen_width", world.screen_width),
            ("screen_height", world.screen_height),
            ("tile_size", world.tile_size),
            ("world_scale", world.world_scale),
            ("chunk_columns", world.chunk_columns),
            ("chunk_rows", world.chunk_rows),
            ("waves.player_buff_every", self.waves.player_buff_every),
            ("waves.enemy_buff_every", self.waves.enemy_buff_every),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDimension { field });
            }
        }
        if world.columns() == 0 {
            return Err(ConfigError::ZeroDimension { field: "world columns" });
        }
        if world.rows() == 0 {
            return Err(ConfigError::ZeroDimension { field: "world rows" });
        }

        world.ground_thresholds.validate("ground")?;
        world.object_thresholds.validate("object")?;

        for (table, entries) in [
            ("health", &self.enemies.healths),
            ("damage", &self.enemies.damages),
            ("dash speed", &self.enemies.dash_speeds),
        ] {
            if entries.is_empty() {
                return Err(ConfigError::EmptyStatTable { table });
            }
        }

        if self.waves.spawn_increment_min > self.waves.spawn_increment_max {
            return Err(ConfigError::InvertedRange {
                field: "waves.spawn_increment",
                min: self.waves.spawn_increment_min as f32,
                max: self.waves.spawn_increment_max as f32,
            });
        }
        if self.weapon.min_cooldown > self.weapon.cooldown {
            return Err(ConfigError::InvertedRange {
                field: "weapon.cooldown",
                min: self.weapon.min_cooldown,
                max: self.weapon.cooldown,
            });
        }
        Ok(())
    }
}

/// World size, chunking and terrain classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Logical screen width in pixels.
    pub screen_width: u32,
    /// Logical screen height in pixels.
    pub screen_height: u32,
    /// Edge length of a tile in pixels.
    pub tile_size: u32,
    /// How many screens the world spans along each axis.
    pub world_scale: u32,
    /// Tiles per chunk horizontally.
    pub chunk_columns: u32,
    /// Tiles per chunk vertically.
    pub chunk_rows: u32,
    /// Classification applied to the ground layer.
    pub ground_thresholds: ThresholdTable,
    /// Classification applied to the object layer.
    pub object_thresholds: ThresholdTable,
}

impl WorldConfig {
    /// World width in tiles.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.screen_width
            .checked_div(self.tile_size)
            .unwrap_or(0)
            .saturating_mul(self.world_scale)
    }

    /// World height in tiles.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.screen_height
            .checked_div(self.tile_size)
            .unwrap_or(0)
            .saturating_mul(self.world_scale)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            screen_width: 640,
            screen_height: 360,
            tile_size: 16,
            world_scale: 5,
            chunk_columns: 32,
            chunk_rows: 18,
            ground_thresholds: ThresholdTable::new(vec![
                ThresholdBand::new(-0.3, 1.0, TileType::Dirt),
                ThresholdBand::new(-0.5, -0.3, TileType::Dirt2),
                ThresholdBand::new(-1.0, -0.5, TileType::Air),
            ]),
            object_thresholds: ThresholdTable::new(vec![
                ThresholdBand::new(0.2, 1.0, TileType::Dirt),
                ThresholdBand::new(0.0, 0.2, TileType::Dirt2),
                ThresholdBand::new(-1.0, 0.0, TileType::Air),
            ]),
        }
    }
}

/// Inclusive value range mapped to a tile type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    /// Lowest value that matches.
    pub low: f64,
    /// Highest value that matches.
    pub high: f64,
    /// Tile assigned to matching values.
    pub tile: TileType,
}

impl ThresholdBand {
    /// Creates a band covering `low..=high`.
    #[must_use]
    pub const fn new(low: f64, high: f64, tile: TileType) -> Self {
        Self { low, high, tile }
    }

    /// Whether `value` lies within the band.
    #[must_use]
    pub fn matches(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Ordered list of threshold bands; the first match wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    bands: Vec<ThresholdBand>,
}

impl ThresholdTable {
    /// Creates a table checked in the provided order.
    #[must_use]
    pub fn new(bands: Vec<ThresholdBand>) -> Self {
        Self { bands }
    }

    /// Bands in evaluation order.
    #[must_use]
    pub fn bands(&self) -> &[ThresholdBand] {
        &self.bands
    }

    /// Tile for `value`, defaulting to [`TileType::Air`].
    #[must_use]
    pub fn classify(&self, value: f64) -> TileType {
        self.bands
            .iter()
            .find(|band| band.matches(value))
            .map_or(TileType::Air, |band| band.tile)
    }

    fn validate(&self, table: &'static str) -> Result<(), ConfigError> {
        if self.bands.is_empty() {
            return Err(ConfigError::EmptyThresholds { table });
        }
        for (index, band) in self.bands.iter().enumerate() {
            if band.low > band.high {
                return Err(ConfigError::InvertedBand {
                    table,
                    index,
                    low: band.low,
                    high: band.high,
                });
            }
        }
        Ok(())
    }
}

/// Player tunables. Times are in 60 Hz frame units, distances in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Edge length of the player's square hitbox.
    pub size: f32,
    /// Distance walked per frame.
    pub speed: f32,
    /// Health at spawn.
    pub health: f32,
    /// Cap for the health buff.
    pub max_health: f32,
    /// Invulnerability window after taking damage.
    pub hit_cooldown: f32,
    /// Fraction of knockback velocity lost per frame.
    pub friction: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 12.0,
            speed: 1.6,
            health: 6.0,
            max_health: 10.0,
            hit_cooldown: 60.0,
            friction: 0.15,
        }
    }
}

/// Weapon and bullet tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Frames between shots.
    pub cooldown: f32,
    /// Floor for the cooldown buff.
    pub min_cooldown: f32,
    /// Damage dealt by each bullet.
    pub bullet_damage: f32,
    /// Cap for the damage buff.
    pub max_bullet_damage: f32,
    /// Damage added per buff.
    pub damage_step: f32,
    /// Distance travelled per frame.
    pub bullet_speed: f32,
    /// Edge length of the bullet hitbox.
    pub bullet_size: f32,
    /// Enemies a bullet passes through.
    pub piercing: u32,
    /// Frames before a bullet expires.
    pub bullet_lifetime: f32,
    /// Maximum random deviation of each shot, in whole degrees.
    pub spread_degrees: i32,
    /// Knockback applied to the player per shot.
    pub recoil: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            cooldown: 12.0,
            min_cooldown: 4.0,
            bullet_damage: 1.0,
            max_bullet_damage: 6.0,
            damage_step: 0.5,
            bullet_speed: 6.0,
            bullet_size: 4.0,
            piercing: 1,
            bullet_lifetime: 60.0,
            spread_degrees: 3,
            recoil: 1.0,
        }
    }
}

/// Enemy tunables. Stat tables only ever grow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Edge length of the enemy hitbox.
    pub size: f32,
    /// Initial health table.
    pub healths: Vec<f32>,
    /// Initial contact damage table.
    pub damages: Vec<f32>,
    /// Initial dash speed table.
    pub dash_speeds: Vec<f32>,
    /// Frames between dashes.
    pub dash_interval: f32,
    /// Fraction of velocity lost per frame.
    pub friction: f32,
    /// Frames during which further bullet hits are ignored.
    pub hit_cooldown: f32,
    /// Knockback applied by a bullet strike.
    pub knockback: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            size: 12.0,
            healths: vec![2.0],
            damages: vec![1.0],
            dash_speeds: vec![2.0],
            dash_interval: 40.0,
            friction: 0.08,
            hit_cooldown: 8.0,
            knockback: 4.0,
        }
    }
}

/// Wave pacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Enemies spawned for the first wave.
    pub initial_spawn_rate: u32,
    /// Smallest per-wave increase of the spawn rate.
    pub spawn_increment_min: u32,
    /// Largest per-wave increase of the spawn rate.
    pub spawn_increment_max: u32,
    /// Frames the field must stay clear before the next wave spawns.
    pub spawn_cooldown: f32,
    /// Player buffs are considered on waves divisible by this value.
    pub player_buff_every: u32,
    /// Enemy buffs are considered on waves divisible by this value.
    pub enemy_buff_every: u32,
    /// Vignette radius change per frame.
    pub reveal_speed: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            initial_spawn_rate: 10,
            spawn_increment_min: 5,
            spawn_increment_max: 10,
            spawn_cooldown: 120.0,
            player_buff_every: 4,
            enemy_buff_every: 2,
            reveal_speed: 10.0,
        }
    }
}

/// Camera follow and shake.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fraction of the remaining distance closed per frame.
    pub follow: f32,
    /// Fraction of the cursor's offset from screen centre added to the target.
    pub look_ahead: f32,
    /// Shake intensity lost per frame.
    pub shake_decay: f32,
    /// Shake triggered when a bullet lands.
    pub enemy_hit_shake: f32,
    /// Shake triggered when the player is hit.
    pub player_hit_shake: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow: 0.1,
            look_ahead: 0.2,
            shake_decay: 0.5,
            enemy_hit_shake: 4.0,
            player_hit_shake: 6.0,
        }
    }
}
