use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Integer (column, row) address of a tile. Orders lexicographically by column, then row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileIndex {
    pub col: u32,
    pub row: u32,
}

impl TileIndex {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Walkability lookup consumed by the simulation. Loading and owning the
/// underlying map data is the caller's business.
pub trait TileGrid: Sync {
    /// Out-of-range indices are never walkable.
    fn is_walkable(&self, tile: TileIndex) -> bool;

    /// Grid dimensions in tiles, (columns, rows).
    fn size(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    Grass,
    Dirt,
    Water,
}

impl Terrain {
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Terrain::Water)
    }
}

/// Dense terrain grid.
#[derive(Debug, Clone)]
pub struct GameMap {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Vec<Terrain>>,
}

impl GameMap {
    /// An all-grass map.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![Terrain::Grass; width as usize]; height as usize],
        }
    }

    /// Build a map from row-major terrain rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> Result<Self, ConfigError> {
        let width = rows.first().map_or(0, |row| row.len());
        if width == 0 {
            return Err(ConfigError::invalid("tiles", "map has no tiles"));
        }
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(ConfigError::invalid(
                "tiles",
                format!("row {} has {} tiles, expected {}", bad, rows[bad].len(), width),
            ));
        }
        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            tiles: rows,
        })
    }

    #[inline(always)]
    pub fn get_terrain_at(&self, x: usize, y: usize) -> Option<&Terrain> {
        if x < self.width as usize && y < self.height as usize {
            return Some(&self.tiles[y][x]);
        }
        None
    }

    /// Returns false when the coordinates are outside the map.
    #[inline(always)]
    pub fn set_terrain_at(&mut self, x: usize, y: usize, terrain: Terrain) -> bool {
        if x < self.width as usize && y < self.height as usize {
            self.tiles[y][x] = terrain;
            return true;
        }
        false
    }

    pub fn walkable_tile_count(&self) -> usize {
        self.tiles
            .iter()
            .flatten()
            .filter(|terrain| terrain.is_walkable())
            .count()
    }
}

impl TileGrid for GameMap {
    #[inline(always)]
    fn is_walkable(&self, tile: TileIndex) -> bool {
        self.get_terrain_at(tile.col as usize, tile.row as usize)
            .is_some_and(Terrain::is_walkable)
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Continuous world extent and the tile size that maps it onto the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    pub tile_size: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
        }
    }

    #[inline(always)]
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }

    /// Clamp a position into the world rectangle.
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x.clamp(0.0, self.width), pos.y.clamp(0.0, self.height))
    }

    /// Tile containing an in-bounds position. Positions on the far edge belong
    /// to the last row/column of the grid.
    #[inline(always)]
    pub fn tile_of(&self, pos: Vec2, grid_size: (u32, u32)) -> Option<TileIndex> {
        if !self.contains(pos) || grid_size.0 == 0 || grid_size.1 == 0 {
            return None;
        }
        let col = ((pos.x / self.tile_size).floor() as u32).min(grid_size.0 - 1);
        let row = ((pos.y / self.tile_size).floor() as u32).min(grid_size.1 - 1);
        Some(TileIndex::new(col, row))
    }

    /// True if `pos` is inside the world and on a walkable tile.
    #[inline(always)]
    pub fn is_passable<G: TileGrid + ?Sized>(&self, grid: &G, pos: Vec2) -> bool {
        self.tile_of(pos, grid.size())
            .is_some_and(|tile| grid.is_walkable(tile))
    }
}
