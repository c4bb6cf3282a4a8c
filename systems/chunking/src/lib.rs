#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pre-composited chunk surfaces for static tiles.
//!
//! Tiles never change after generation, so each fixed-size block of tiles is
//! blitted once into an offscreen [`Surface`]. Rendering then draws at most
//! nine chunk surfaces per frame instead of thousands of tiles. The cache is
//! derived data: rebuilding it from the same layers yields identical pixels.

use std::{collections::BTreeMap, sync::Arc};

use abyss_core::{ChunkCoord, Surface, TileLayer, TileType};
use glam::Vec2;

/// Size of a chunk in tiles together with the tile edge length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkDimensions {
    columns: u32,
    rows: u32,
    tile_size: u32,
}

impl ChunkDimensions {
    /// Creates chunk dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            columns,
            rows,
            tile_size,
        }
    }

    /// Tiles per chunk horizontally.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Tiles per chunk vertically.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Chunk width in pixels.
    #[must_use]
    pub const fn pixel_width(&self) -> u32 {
        self.columns.saturating_mul(self.tile_size)
    }

    /// Chunk height in pixels.
    #[must_use]
    pub const fn pixel_height(&self) -> u32 {
        self.rows.saturating_mul(self.tile_size)
    }

    /// Chunk containing the world-space pixel `point`.
    #[must_use]
    pub fn containing_pixel(&self, point: Vec2) -> ChunkCoord {
        let width = self.pixel_width() as f32;
        let height = self.pixel_height() as f32;
        if width <= 0.0 || height <= 0.0 {
            return ChunkCoord::default();
        }
        ChunkCoord::new(
            (point.x / width).floor() as i32,
            (point.y / height).floor() as i32,
        )
    }

    /// World-space pixel origin of `coord`.
    #[must_use]
    pub fn pixel_origin(&self, coord: ChunkCoord) -> Vec2 {
        Vec2::new(
            coord.x() as f32 * self.pixel_width() as f32,
            coord.y() as f32 * self.pixel_height() as f32,
        )
    }
}

/// A chunk selected for drawing this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleChunk {
    /// Chunk-grid coordinate.
    pub coord: ChunkCoord,
    /// Top-left corner on screen after subtracting the camera scroll.
    pub screen_origin: Vec2,
    /// Cached pixels.
    pub surface: Arc<Surface>,
}

/// Cache of composited chunk surfaces.
#[derive(Clone, Debug)]
pub struct ChunkCache {
    dimensions: ChunkDimensions,
    generation: u64,
    surfaces: BTreeMap<ChunkCoord, Arc<Surface>>,
}

impl ChunkCache {
    /// Creates a cache with no chunks.
    #[must_use]
    pub fn empty(dimensions: ChunkDimensions) -> Self {
        Self {
            dimensions,
            generation: 0,
            surfaces: BTreeMap::new(),
        }
    }

    /// Composites `layers` in order, skipping air tiles.
    ///
    /// Surfaces are created on first write, so chunks holding only air never
    /// exist. `generation` tags the build so renderers can drop stale uploads.
    #[must_use]
    pub fn build(dimensions: ChunkDimensions, layers: &[&TileLayer], generation: u64) -> Self {
        let mut surfaces: BTreeMap<ChunkCoord, Surface> = BTreeMap::new();
        let tile_size = dimensions.tile_size as i32;

        for layer in layers {
            for tile in layer.iter() {
                if tile.tile_type() == TileType::Air {
                    continue;
                }
                let position = tile.position();
                let coord =
                    ChunkCoord::containing(position, dimensions.columns, dimensions.rows);
                let surface = surfaces.entry(coord).or_insert_with(|| {
                    Surface::new(dimensions.pixel_width(), dimensions.pixel_height())
                });
                let local_x = (position.x() - coord.x() * dimensions.columns as i32) * tile_size;
                let local_y = (position.y() - coord.y() * dimensions.rows as i32) * tile_size;
                surface.blit(tile.image(), local_x, local_y);
            }
        }

        log::debug!(
            "chunk cache generation {generation} holds {} surfaces",
            surfaces.len()
        );

        Self {
            dimensions,
            generation,
            surfaces: surfaces
                .into_iter()
                .map(|(coord, surface)| (coord, Arc::new(surface)))
                .collect(),
        }
    }

    /// Replaces every surface with a fresh build of `layers` and bumps the
    /// generation.
    pub fn rebuild(&mut self, layers: &[&TileLayer]) {
        *self = Self::build(self.dimensions, layers, self.generation.wrapping_add(1));
    }

    /// Chunk dimensions used for the build.
    #[must_use]
    pub const fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Build tag supplied to [`ChunkCache::build`].
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of cached chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether the cache holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Surface cached for `coord`, if any.
    #[must_use]
    pub fn surface(&self, coord: ChunkCoord) -> Option<&Arc<Surface>> {
        self.surfaces.get(&coord)
    }

    /// Iterates cached chunks in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &Arc<Surface>)> {
        self.surfaces.iter().map(|(coord, surface)| (*coord, surface))
    }

    /// The 3×3 block of chunks around the chunk containing `focus`, offset by
    /// the `camera` scroll. Coordinates without a cached surface are skipped.
    #[must_use]
    pub fn visible(&self, focus: Vec2, camera: Vec2) -> Vec<VisibleChunk> {
        let center = self.dimensions.containing_pixel(focus);
        center
            .neighborhood()
            .into_iter()
            .filter_map(|coord| {
                let surface = self.surfaces.get(&coord)?;
                Some(VisibleChunk {
                    coord,
                    screen_origin: self.dimensions.pixel_origin(coord) - camera,
                    surface: Arc::clone(surface),
                })
            })
            .collect()
    }
}
