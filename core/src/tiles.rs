//! Tile storage shared by the generation pipeline and the world.

use std::collections::HashMap;

use crate::{LayerKind, Position, Surface, TileType};

/// Dense grid of tile classifications covering a rectangular world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileTypeMap {
    columns: u32,
    rows: u32,
    cells: Vec<TileType>,
}

impl TileTypeMap {
    /// Creates a map where every cell holds `fill`.
    #[must_use]
    pub fn new(columns: u32, rows: u32, fill: TileType) -> Self {
        let count = (columns as usize).saturating_mul(rows as usize);
        Self {
            columns,
            rows,
            cells: vec![fill; count],
        }
    }

    /// Creates a map by evaluating `classify` for every cell in row-major order.
    #[must_use]
    pub fn from_fn<F>(columns: u32, rows: u32, mut classify: F) -> Self
    where
        F: FnMut(Position) -> TileType,
    {
        let mut cells = Vec::with_capacity((columns as usize).saturating_mul(rows as usize));
        for y in 0..rows {
            for x in 0..columns {
                cells.push(classify(Position::new(x as i32, y as i32)));
            }
        }
        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Whether `position` lies inside the map.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Tile stored at `position`, or `None` outside the map.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<TileType> {
        self.index(position).map(|index| self.cells[index])
    }

    /// Overwrites the tile at `position`. Returns `false` outside the map.
    pub fn set(&mut self, position: Position, tile_type: TileType) -> bool {
        match self.index(position) {
            Some(index) => {
                self.cells[index] = tile_type;
                true
            }
            None => false,
        }
    }

    /// Iterates every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, TileType)> + '_ {
        let columns = self.columns.max(1) as usize;
        self.cells.iter().enumerate().map(move |(index, tile)| {
            let x = (index % columns) as i32;
            let y = (index / columns) as i32;
            (Position::new(x, y), *tile)
        })
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

/// Generated terrain handed to the world when it is reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldLayout {
    /// Walkable floor classification.
    pub ground: TileTypeMap,
    /// Obstacle classification.
    pub objects: TileTypeMap,
    /// Cells enemies may spawn on.
    pub spawn_area: Vec<Position>,
    /// Cell the player starts on.
    pub player_spawn: Position,
}

/// A classified cell together with its rendered image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    tile_type: TileType,
    position: Position,
    image: Surface,
}

impl Tile {
    /// Creates a tile whose image is filled with the type's base palette.
    ///
    /// Edge images span three quarters of the tile height; air images stay
    /// transparent.
    #[must_use]
    pub fn new(tile_type: TileType, position: Position, tile_size: u32) -> Self {
        let height = match tile_type {
            TileType::Edge => tile_size * 3 / 4,
            _ => tile_size,
        };
        Self {
            tile_type,
            position,
            image: Surface::filled(tile_size, height, tile_type.base_color()),
        }
    }

    /// Classification of the tile.
    #[must_use]
    pub const fn tile_type(&self) -> TileType {
        self.tile_type
    }

    /// Grid position of the tile.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Rendered image.
    #[must_use]
    pub const fn image(&self) -> &Surface {
        &self.image
    }

    /// Mutable access to the rendered image.
    pub fn image_mut(&mut self) -> &mut Surface {
        &mut self.image
    }
}

/// Sparse tile layer stored as an arena with a position index.
#[derive(Clone, Debug)]
pub struct TileLayer {
    kind: LayerKind,
    tiles: Vec<Tile>,
    index: HashMap<Position, usize>,
}

impl TileLayer {
    /// Creates an empty layer.
    #[must_use]
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            tiles: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a layer containing one tile per cell of `map`.
    #[must_use]
    pub fn from_type_map(kind: LayerKind, map: &TileTypeMap, tile_size: u32) -> Self {
        let mut layer = Self::new(kind);
        layer.tiles.reserve(map.cells.len());
        for (position, tile_type) in map.iter() {
            layer.insert(Tile::new(tile_type, position, tile_size));
        }
        layer
    }

    /// Which world layer this is.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Stores `tile`, replacing any tile already at its position.
    pub fn insert(&mut self, tile: Tile) {
        let position = tile.position();
        if let Some(&slot) = self.index.get(&position) {
            self.tiles[slot] = tile;
            return;
        }
        let _ = self.index.insert(position, self.tiles.len());
        self.tiles.push(tile);
    }

    /// Tile at `position`, if any.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<&Tile> {
        self.index.get(&position).map(|&slot| &self.tiles[slot])
    }

    /// Mutable tile at `position`, if any.
    pub fn get_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let slot = *self.index.get(&position)?;
        self.tiles.get_mut(slot)
    }

    /// Classification at `position`, if a tile exists there.
    #[must_use]
    pub fn tile_type(&self, position: Position) -> Option<TileType> {
        self.get(position).map(Tile::tile_type)
    }

    /// Iterates tiles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Iterates tiles mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Number of occupied positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the layer holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
