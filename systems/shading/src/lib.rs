#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Distance-to-edge shading for walkable ground.

use std::collections::VecDeque;

use abyss_core::{Direction, Position, Rgba, TileLayer, TileTypeMap};

const MIN_BRIGHTNESS: f32 = 0.6;
const BRIGHTNESS_RANGE: f32 = 0.4;

/// Core purple scaled by brightness on walkable ground.
pub const GROUND_BASE_COLOR: Rgba = Rgba::from_rgb(150, 100, 230);
/// Uniform fill applied to obstacle tiles.
pub const OBSTACLE_COLOR: Rgba = Rgba::from_rgb(40, 20, 80);

/// Dense hop-distance grid from every walkable cell to the nearest outline.
///
/// Outline cells are walkable cells with at least one orthogonal neighbour
/// that is not walkable or lies outside the map. A single multi-source BFS
/// over the whole walkable set fills the grid, tracking one global maximum.
/// Non-walkable cells, and walkable cells the search never reaches, hold
/// `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistanceField {
    columns: u32,
    rows: u32,
    distances: Vec<Option<u32>>,
    max_distance: u32,
}

impl DistanceField {
    /// Computes the field for the walkable cells of `ground`.
    #[must_use]
    pub fn compute(ground: &TileTypeMap) -> Self {
        let columns = ground.columns();
        let rows = ground.rows();
        let mut field = Self {
            columns,
            rows,
            distances: vec![None; (columns as usize).saturating_mul(rows as usize)],
            max_distance: 0,
        };

        let walkable = |position: Position| {
            ground
                .get(position)
                .is_some_and(|tile| tile.is_walkable())
        };

        let mut queue = VecDeque::new();
        for (position, tile) in ground.iter() {
            if !tile.is_walkable() {
                continue;
            }
            let on_outline = Direction::ALL
                .iter()
                .any(|direction| !walkable(position.neighbor(*direction)));
            if !on_outline {
                continue;
            }
            if let Some(index) = field.index(position) {
                field.distances[index] = Some(0);
                queue.push_back(position);
            }
        }

        while let Some(position) = queue.pop_front() {
            let Some(current) = field.distance(position) else {
                continue;
            };
            let next = current.saturating_add(1);

            for direction in Direction::ALL {
                let neighbor = position.neighbor(direction);
                if !walkable(neighbor) {
                    continue;
                }
                let Some(index) = field.index(neighbor) else {
                    continue;
                };
                if field.distances[index].is_some() {
                    continue;
                }
                field.distances[index] = Some(next);
                field.max_distance = field.max_distance.max(next);
                queue.push_back(neighbor);
            }
        }

        log::debug!(
            "distance field computed with global maximum {}",
            field.max_distance
        );
        field
    }

    /// Hop distance to the nearest outline cell, if the cell was reached.
    #[must_use]
    pub fn distance(&self, position: Position) -> Option<u32> {
        self.index(position)
            .and_then(|index| self.distances.get(index).copied().flatten())
    }

    /// Largest distance observed anywhere in the field.
    #[must_use]
    pub const fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Brightness coefficient for the cell, if it was reached.
    #[must_use]
    pub fn brightness(&self, position: Position) -> Option<f32> {
        self.distance(position)
            .map(|distance| brightness_for(distance, self.max_distance))
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = u32::try_from(position.x()).ok()?;
        let y = u32::try_from(position.y()).ok()?;
        if x >= self.columns || y >= self.rows {
            return None;
        }
        Some(y as usize * self.columns as usize + x as usize)
    }
}

/// Brightness `0.6 + 0.4·(distance / max)`, clamped to `[0.6, 1.0]`.
///
/// A zero maximum yields a ratio of 1.0.
#[must_use]
pub fn brightness_for(distance: u32, max_distance: u32) -> f32 {
    let ratio = if max_distance == 0 {
        1.0
    } else {
        distance as f32 / max_distance as f32
    };
    (MIN_BRIGHTNESS + BRIGHTNESS_RANGE * ratio).clamp(MIN_BRIGHTNESS, 1.0)
}

/// Paints tile images according to a [`DistanceField`].
#[derive(Clone, Copy, Debug)]
pub struct DistanceColorizer {
    ground_base: Rgba,
    obstacle: Rgba,
}

impl Default for DistanceColorizer {
    fn default() -> Self {
        Self::new(GROUND_BASE_COLOR, OBSTACLE_COLOR)
    }
}

impl DistanceColorizer {
    /// Creates a colorizer with explicit palette entries.
    #[must_use]
    pub const fn new(ground_base: Rgba, obstacle: Rgba) -> Self {
        Self {
            ground_base,
            obstacle,
        }
    }

    /// Fills walkable ground tiles with the distance gradient and obstacle
    /// tiles with the uniform obstacle color.
    pub fn colorize(&self, field: &DistanceField, ground: &mut TileLayer, objects: &mut TileLayer) {
        for tile in ground.iter_mut() {
            if !tile.tile_type().is_walkable() {
                continue;
            }
            if let Some(brightness) = field.brightness(tile.position()) {
                tile.image_mut().fill(self.ground_base.scaled(brightness));
            }
        }

        for tile in objects.iter_mut() {
            if tile.tile_type().is_walkable() {
                tile.image_mut().fill(self.obstacle);
            }
        }
    }
}
