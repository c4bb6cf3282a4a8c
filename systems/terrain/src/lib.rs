#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural terrain generation for the ground and object layers.
//!
//! A seeded Perlin field is sampled per cell, biased toward open air near the
//! map border by a radial falloff, and classified against an ordered threshold
//! table. A boundary pass then removes floating ceilings and rims every solid
//! mass with [`TileType::Edge`] tiles along its underside.

use std::f64::consts::PI;

use abyss_core::{Position, ThresholdTable, TileType, TileTypeMap};
use noise::{NoiseFn, Perlin};

const FREQUENCY_X: f64 = 0.05;
const FREQUENCY_Y: f64 = 0.08;
const OCTAVES: u32 = 2;
const PERSISTENCE: f64 = 0.5;
const LACUNARITY: f64 = 2.0;
const FALLOFF_STRENGTH: f64 = 0.8;

/// Seeded 2D noise sampler with radial falloff.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    center: (i32, i32),
    max_distance: f64,
}

impl NoiseField {
    /// Creates a field for a `columns`×`rows` world.
    #[must_use]
    pub fn new(seed: u32, columns: u32, rows: u32) -> Self {
        let center = ((columns / 2) as i32, (rows / 2) as i32);
        let max_distance = f64::from(center.0).hypot(f64::from(center.1));
        Self {
            perlin: Perlin::new(seed),
            center,
            max_distance,
        }
    }

    /// Octave noise at the cell, normalised by the total amplitude.
    #[must_use]
    pub fn raw(&self, position: Position) -> f64 {
        let x = f64::from(position.x()) * FREQUENCY_X;
        let y = f64::from(position.y()) * FREQUENCY_Y;

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut amplitude_sum = 0.0;
        for _ in 0..OCTAVES {
            total += self.perlin.get([x * frequency, y * frequency]) * amplitude;
            amplitude_sum += amplitude;
            amplitude *= PERSISTENCE;
            frequency *= LACUNARITY;
        }
        total / amplitude_sum
    }

    /// Falloff subtracted at the cell: 0 at the centre, growing toward the border.
    #[must_use]
    pub fn falloff(&self, position: Position) -> f64 {
        if self.max_distance <= 0.0 {
            return 0.0;
        }
        let dx = f64::from(position.x() - self.center.0);
        let dy = f64::from(position.y() - self.center.1);
        let t = (dx.hypot(dy) / self.max_distance).clamp(0.0, 1.0);
        radial_falloff(t)
    }

    /// Classification value for the cell.
    #[must_use]
    pub fn sample(&self, position: Position) -> f64 {
        self.raw(position) - self.falloff(position)
    }
}

/// Falloff curve `(1 - cos(πt))·0.8` for a normalised distance `t`.
#[must_use]
pub fn radial_falloff(t: f64) -> f64 {
    (1.0 - (PI * t.clamp(0.0, 1.0)).cos()) * FALLOFF_STRENGTH
}

/// Classifies noise samples into the two world layers.
#[derive(Clone, Copy, Debug)]
pub struct WorldGenerator<'a> {
    columns: u32,
    rows: u32,
    ground: &'a ThresholdTable,
    objects: &'a ThresholdTable,
}

impl<'a> WorldGenerator<'a> {
    /// Creates a generator for a `columns`×`rows` world.
    #[must_use]
    pub const fn new(
        columns: u32,
        rows: u32,
        ground: &'a ThresholdTable,
        objects: &'a ThresholdTable,
    ) -> Self {
        Self {
            columns,
            rows,
            ground,
            objects,
        }
    }

    /// Generates both layers for `seed`. Identical inputs yield identical maps.
    #[must_use]
    pub fn generate(&self, seed: u32) -> GeneratedTerrain {
        let field = NoiseField::new(seed, self.columns, self.rows);
        let samples: Vec<f64> = (0..self.rows)
            .flat_map(|y| (0..self.columns).map(move |x| (x, y)))
            .map(|(x, y)| field.sample(Position::new(x as i32, y as i32)))
            .collect();

        let classify = |table: &ThresholdTable| {
            let mut values = samples.iter();
            TileTypeMap::from_fn(self.columns, self.rows, |_| {
                values
                    .next()
                    .map_or(TileType::Air, |value| table.classify(*value))
            })
        };

        let ground = resolve_boundaries(&classify(self.ground));
        let objects = resolve_boundaries(&classify(self.objects));

        log::info!(
            "generated {}x{} terrain for seed {seed}",
            self.columns,
            self.rows
        );

        GeneratedTerrain {
            seed,
            ground,
            objects,
        }
    }
}

/// Applies the boundary pass to a raw classification.
///
/// Neighbours are always read from `raw`, never from partially resolved output.
#[must_use]
pub fn resolve_boundaries(raw: &TileTypeMap) -> TileTypeMap {
    TileTypeMap::from_fn(raw.columns(), raw.rows(), |position| {
        let Some(tile) = raw.get(position) else {
            return TileType::Air;
        };
        if !tile.is_solid_mass() {
            return tile;
        }

        let above = raw.get(position.offset(0, -1));
        let Some(above) = above else {
            return TileType::Air;
        };
        let rimmed = if above.is_solid_mass() {
            TileType::Edge
        } else {
            TileType::Air
        };

        match raw.get(position.offset(0, 1)) {
            None | Some(TileType::Air) => rimmed,
            Some(_) => tile,
        }
    })
}

/// Output of [`WorldGenerator::generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedTerrain {
    seed: u32,
    ground: TileTypeMap,
    objects: TileTypeMap,
}

impl GeneratedTerrain {
    /// Seed the terrain was generated from.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Ground layer classification.
    #[must_use]
    pub const fn ground(&self) -> &TileTypeMap {
        &self.ground
    }

    /// Object layer classification.
    #[must_use]
    pub const fn objects(&self) -> &TileTypeMap {
        &self.objects
    }

    /// Cells with solid ground and no obstacle on top, in row-major order.
    #[must_use]
    pub fn spawn_area(&self) -> Vec<Position> {
        self.ground
            .iter()
            .filter(|(_, ground)| ground.is_solid_mass())
            .filter(|(position, _)| {
                self.objects
                    .get(*position)
                    .is_some_and(|object| !object.is_solid_mass())
            })
            .map(|(position, _)| position)
            .collect()
    }

    /// Spawn-area cells closer to the map centre than a third of its height.
    #[must_use]
    pub fn player_spawn_candidates(&self) -> Vec<Position> {
        let center = Position::new(
            (self.ground.columns() / 2) as i32,
            (self.ground.rows() / 2) as i32,
        );
        let radius = self.ground.rows() as f32 / 3.0;
        self.spawn_area()
            .into_iter()
            .filter(|position| position.distance_to(center) < radius)
            .collect()
    }

    /// Splits the terrain into its ground and object maps.
    #[must_use]
    pub fn into_maps(self) -> (TileTypeMap, TileTypeMap) {
        (self.ground, self.objects)
    }
}
