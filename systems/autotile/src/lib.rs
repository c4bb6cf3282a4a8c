#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Neighbour-driven edge highlights for solid tiles.
//!
//! Every `Dirt`/`Dirt2` tile inspects its four orthogonal neighbours. The
//! directions that lead to another solid tile form a 4-bit
//! [`ConnectivityMask`], which indexes [`HIGHLIGHTS`] to find the white strips
//! painted along the tile's exposed sides. Neighbours missing from the layer
//! count as not connected.

use abyss_core::{Direction, PixelRect, Position, Rgba, TileLayer};

/// Thin highlight strip painted along one side of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strip {
    /// Along the top edge.
    Top,
    /// Along the left edge.
    Left,
    /// Along the right edge.
    Right,
    /// Along the bottom edge.
    Bottom,
}

impl Strip {
    /// Strip drawn when the neighbour in `direction` is not connected.
    #[must_use]
    pub const fn facing(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Top,
            Direction::Right => Self::Right,
            Direction::Down => Self::Bottom,
            Direction::Left => Self::Left,
        }
    }

    /// Rectangle covered by the strip on a `tile_size` image.
    ///
    /// Strips are an eighth of the tile thick, never thinner than one pixel.
    #[must_use]
    pub fn rect(self, tile_size: u32) -> PixelRect {
        let thickness = (tile_size / 8).max(1);
        let far = tile_size.saturating_sub(thickness) as i32;
        match self {
            Self::Top => PixelRect::new(0, 0, tile_size, thickness),
            Self::Left => PixelRect::new(0, 0, thickness, tile_size),
            Self::Right => PixelRect::new(far, 0, thickness, tile_size),
            Self::Bottom => PixelRect::new(0, far, tile_size, thickness),
        }
    }
}

/// Set of directions whose neighbour belongs to the same solid mass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConnectivityMask(u8);

impl ConnectivityMask {
    /// Mask with every side connected.
    pub const SURROUNDED: Self = Self(0b1111);

    /// Builds a mask from the raw 4-bit value. Higher bits are discarded.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Builds a mask from connected directions.
    #[must_use]
    pub fn from_directions<I>(directions: I) -> Self
    where
        I: IntoIterator<Item = Direction>,
    {
        Self(
            directions
                .into_iter()
                .fold(0, |mask, direction| mask | direction.bit()),
        )
    }

    /// Raw 4-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether `direction` is connected.
    #[must_use]
    pub const fn connects(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Highlight strips for this pattern.
    #[must_use]
    pub fn highlights(self) -> &'static [Strip] {
        HIGHLIGHTS[usize::from(self.0)]
    }
}

/// Highlight strips for each connectivity pattern, indexed by mask bits
/// (up = 1, right = 2, down = 4, left = 8).
pub const HIGHLIGHTS: [&[Strip]; 16] = [
    // isolated
    &[Strip::Top, Strip::Left, Strip::Right, Strip::Bottom],
    // up
    &[Strip::Left, Strip::Bottom, Strip::Right],
    // right
    &[Strip::Left, Strip::Top, Strip::Bottom],
    // up + right
    &[Strip::Bottom, Strip::Left],
    // down
    &[Strip::Top, Strip::Left, Strip::Right],
    // vertical run
    &[Strip::Left, Strip::Right],
    // down + right
    &[Strip::Top, Strip::Left],
    // up + right + down
    &[Strip::Left],
    // left
    &[Strip::Top, Strip::Bottom, Strip::Right],
    // up + left
    &[Strip::Bottom, Strip::Right],
    // horizontal run
    &[Strip::Top, Strip::Bottom],
    // up + right + left
    &[Strip::Bottom],
    // down + left
    &[Strip::Top, Strip::Right],
    // up + down + left
    &[Strip::Right],
    // right + down + left
    &[Strip::Top],
    // surrounded
    &[],
];

/// Paints edge highlights onto solid tiles of a layer.
#[derive(Clone, Copy, Debug)]
pub struct AutoTiler {
    tile_size: u32,
    highlight: Rgba,
}

impl AutoTiler {
    /// Creates an autotiler painting white strips on `tile_size` images.
    #[must_use]
    pub const fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            highlight: Rgba::WHITE,
        }
    }

    /// Connectivity of the tile at `position` within `layer`.
    #[must_use]
    pub fn connectivity(layer: &TileLayer, position: Position) -> ConnectivityMask {
        ConnectivityMask::from_directions(Direction::ALL.into_iter().filter(|direction| {
            layer
                .tile_type(position.neighbor(*direction))
                .is_some_and(|tile| tile.is_solid_mass())
        }))
    }

    /// Decorates every `Dirt`/`Dirt2` tile of `layer` and returns how many
    /// tiles received at least one strip. Edge and air tiles are untouched.
    pub fn apply(&self, layer: &mut TileLayer) -> usize {
        let patterns: Vec<(Position, ConnectivityMask)> = layer
            .iter()
            .filter(|tile| tile.tile_type().is_solid_mass())
            .map(|tile| (tile.position(), Self::connectivity(layer, tile.position())))
            .collect();

        let mut decorated = 0;
        for (position, mask) in patterns {
            let strips = mask.highlights();
            if strips.is_empty() {
                continue;
            }
            let Some(tile) = layer.get_mut(position) else {
                continue;
            };
            for strip in strips {
                tile.image_mut()
                    .fill_rect(strip.rect(self.tile_size), self.highlight);
            }
            decorated += 1;
        }

        log::debug!(
            "autotiled {decorated} tiles on the {:?} layer",
            layer.kind()
        );
        decorated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abyss_core::{LayerKind, TileType, TileTypeMap};
    use std::collections::BTreeSet;

    #[test]
    fn table_matches_unconnected_sides() {
        for bits in 0..16_u8 {
            let mask = ConnectivityMask::from_bits(bits);
            let expected: BTreeSet<Strip> = Direction::ALL
                .into_iter()
                .filter(|direction| !mask.connects(*direction))
                .map(Strip::facing)
                .collect();
            let actual: BTreeSet<Strip> = mask.highlights().iter().copied().collect();

            assert_eq!(actual, expected, "pattern {bits:04b}");
            assert_eq!(actual.len(), mask.highlights().len(), "duplicate strip");
        }
    }

    #[test]
    fn only_surrounded_pattern_is_empty() {
        for bits in 0..16_u8 {
            let mask = ConnectivityMask::from_bits(bits);
            assert_eq!(
                mask.highlights().is_empty(),
                mask == ConnectivityMask::SURROUNDED,
                "pattern {bits:04b}"
            );
        }
    }

    #[test]
    fn strip_rects_hug_tile_edges() {
        assert_eq!(Strip::Top.rect(16), PixelRect::new(0, 0, 16, 2));
        assert_eq!(Strip::Left.rect(16), PixelRect::new(0, 0, 2, 16));
        assert_eq!(Strip::Right.rect(16), PixelRect::new(14, 0, 2, 16));
        assert_eq!(Strip::Bottom.rect(16), PixelRect::new(0, 14, 16, 2));
    }

    fn layer(rows: &[&str]) -> TileLayer {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        let map = TileTypeMap::from_fn(width, height, |position| {
            match rows[position.y() as usize].as_bytes()[position.x() as usize] {
                b'#' => TileType::Dirt,
                b'%' => TileType::Dirt2,
                b'=' => TileType::Edge,
                _ => TileType::Air,
            }
        });
        TileLayer::from_type_map(LayerKind::Ground, &map, 16)
    }

    #[test]
    fn edge_neighbours_do_not_connect() {
        let layer = layer(&[".#.", "#%#", ".=."]);
        let mask = AutoTiler::connectivity(&layer, Position::new(1, 1));

        assert!(mask.connects(Direction::Up));
        assert!(mask.connects(Direction::Left));
        assert!(mask.connects(Direction::Right));
        assert!(!mask.connects(Direction::Down));
    }

    #[test]
    fn out_of_grid_neighbours_are_not_connected() {
        let layer = layer(&["##"]);
        let mask = AutoTiler::connectivity(&layer, Position::new(0, 0));

        assert_eq!(mask, ConnectivityMask::from_directions([Direction::Right]));
    }

    #[test]
    fn apply_paints_exposed_sides_only() {
        let mut layer = layer(&["###", "###", "###"]);
        let decorated = AutoTiler::new(16).apply(&mut layer);

        assert_eq!(decorated, 8);
        let center = layer.get(Position::new(1, 1)).expect("center");
        assert_eq!(center.image().pixel(0, 0), Some(TileType::Dirt.base_color()));
        let top_left = layer.get(Position::new(0, 0)).expect("corner");
        assert_eq!(top_left.image().pixel(8, 0), Some(Rgba::WHITE));
        assert_eq!(top_left.image().pixel(0, 8), Some(Rgba::WHITE));
        assert_eq!(top_left.image().pixel(15, 15), Some(TileType::Dirt.base_color()));
    }

    #[test]
    fn edge_and_air_tiles_are_never_decorated() {
        let mut layer = layer(&["=.="]);
        let decorated = AutoTiler::new(16).apply(&mut layer);

        assert_eq!(decorated, 0);
        let edge = layer.get(Position::new(0, 0)).expect("edge");
        assert!(edge
            .image()
            .pixels()
            .iter()
            .all(|pixel| *pixel == TileType::Edge.base_color()));
    }
}
