#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static maze snapshot, tile classification and topology for Pac Pilot.
//!
//! The [`Maze`] holds one level's tile kinds. The [`query`] module answers
//! topology questions about individual tiles, [`corridor`] follows corridors
//! from a tile until the next node, and [`topology`] condenses the whole grid
//! into a graph of intersections and dead ends.

pub mod corridor;
pub mod topology;

use pacpilot_core::{TileCoord, TileKind};
use thiserror::Error;

/// Reasons a maze snapshot may be rejected as malformed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The grid has no columns or no rows.
    #[error("maze dimensions {width}x{height} must both be non-zero")]
    EmptyDimensions {
        /// Declared number of columns.
        width: u32,
        /// Declared number of rows.
        height: u32,
    },
    /// The tile buffer does not match the declared dimensions.
    #[error("maze declares {expected} tiles but {actual} were supplied")]
    CellCountMismatch {
        /// Number of tiles implied by the dimensions.
        expected: usize,
        /// Number of tiles actually supplied.
        actual: usize,
    },
    /// A row differs in length from the first row.
    #[error("row {row} holds {actual} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// The grid is too large to be addressed with 32-bit coordinates.
    #[error("maze dimensions exceed the addressable range")]
    TooLarge,
    /// An ASCII layout contained a character without a tile meaning.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the character.
        column: usize,
        /// Row of the character.
        row: usize,
    },
}

/// Snapshot of one level's tile kinds stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
}

impl Maze {
    /// Creates a maze from a row-major tile buffer.
    pub fn new(width: u32, height: u32, tiles: Vec<TileKind>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }

        let expected = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| GridError::TooLarge)?;
        if tiles.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Creates a maze from explicit rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<TileKind>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(GridError::RaggedRow {
                    row,
                    expected,
                    actual: cells.len(),
                });
            }
            tiles.extend_from_slice(cells);
        }

        let width = u32::try_from(expected).map_err(|_| GridError::TooLarge)?;
        let height = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;
        Self::new(width, height, tiles)
    }

    /// Parses an ASCII layout, one row per line.
    ///
    /// Glyphs follow [`TileKind::from_glyph`].
    pub fn from_ascii(layout: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (row, line) in layout.lines().enumerate() {
            let mut cells = Vec::with_capacity(line.len());
            for (column, glyph) in line.chars().enumerate() {
                let kind = TileKind::from_glyph(glyph).ok_or(GridError::UnknownGlyph {
                    glyph,
                    column,
                    row,
                })?;
                cells.push(kind);
            }
            rows.push(cells);
        }
        Self::from_rows(rows)
    }

    /// Number of columns in the maze.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the maze.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the tile lies inside the maze bounds.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.width && tile.row() < self.height
    }

    /// Kind of the provided tile, or `None` when it lies out of bounds.
    #[must_use]
    pub fn tile_kind(&self, tile: TileCoord) -> Option<TileKind> {
        self.index(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Replaces the kind stored at `tile`, returning the previous kind.
    ///
    /// The decision core never mutates a maze; engines use this to consume
    /// items between frames.
    pub fn set_tile_kind(&mut self, tile: TileCoord, kind: TileKind) -> Option<TileKind> {
        let index = self.index(tile)?;
        let slot = self.tiles.get_mut(index)?;
        Some(std::mem::replace(slot, kind))
    }

    /// Iterates every tile coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.height)
            .flat_map(move |row| (0..self.width).map(move |column| TileCoord::new(column, row)))
    }

    /// Dense row-major index of the tile, if it lies within the maze.
    #[must_use]
    pub fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }

        let row = usize::try_from(tile.row()).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Tile classification queries over a maze snapshot.
///
/// Every function is pure. Out-of-bounds tiles are never walkable.
pub mod query {
    use pacpilot_core::{Direction, TileCoord, TileKind};

    use super::Maze;

    /// Kind of the provided tile, or `None` when out of bounds.
    #[must_use]
    pub fn tile_kind(maze: &Maze, tile: TileCoord) -> Option<TileKind> {
        maze.tile_kind(tile)
    }

    /// Reports whether the tile may be occupied.
    #[must_use]
    pub fn is_walkable(maze: &Maze, tile: TileCoord) -> bool {
        maze.tile_kind(tile).is_some_and(TileKind::is_walkable)
    }

    /// Reports whether the tile is a wall or lies outside the maze.
    #[must_use]
    pub fn is_wall(maze: &Maze, tile: TileCoord) -> bool {
        maze.tile_kind(tile).map_or(true, |kind| kind == TileKind::Wall)
    }

    /// Reports whether the tile is a teleport.
    #[must_use]
    pub fn is_teleport(maze: &Maze, tile: TileCoord) -> bool {
        maze.tile_kind(tile) == Some(TileKind::Teleport)
    }

    /// Reports whether the tile currently holds a dot or power dot.
    #[must_use]
    pub fn has_item(maze: &Maze, tile: TileCoord) -> bool {
        maze.tile_kind(tile).is_some_and(TileKind::is_item)
    }

    /// Walkable neighbour of `tile` in `direction`, if any.
    #[must_use]
    pub fn walkable_neighbor(maze: &Maze, tile: TileCoord, direction: Direction) -> Option<TileCoord> {
        tile.step(direction)
            .filter(|neighbor| is_walkable(maze, *neighbor))
    }

    /// Directions in which the tile has a walkable neighbour.
    #[must_use]
    pub fn open_directions(maze: &Maze, tile: TileCoord) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|direction| walkable_neighbor(maze, tile, *direction).is_some())
            .collect()
    }

    fn walkable_neighbor_count(maze: &Maze, tile: TileCoord) -> usize {
        Direction::ALL
            .into_iter()
            .filter(|direction| walkable_neighbor(maze, tile, *direction).is_some())
            .count()
    }

    /// Walkable tile where three or four corridors meet.
    #[must_use]
    pub fn is_intersection(maze: &Maze, tile: TileCoord) -> bool {
        is_walkable(maze, tile) && walkable_neighbor_count(maze, tile) > 2
    }

    /// Walkable tile with a single walkable neighbour.
    #[must_use]
    pub fn is_dead_end(maze: &Maze, tile: TileCoord) -> bool {
        is_walkable(maze, tile) && walkable_neighbor_count(maze, tile) == 1
    }

    /// Walkable tile whose two walkable neighbours are not collinear.
    ///
    /// Corners bend a corridor; they are not topology nodes.
    #[must_use]
    pub fn is_corner(maze: &Maze, tile: TileCoord) -> bool {
        if !is_walkable(maze, tile) {
            return false;
        }

        let open = open_directions(maze, tile);
        match open.as_slice() {
            [first, second] => first.is_horizontal() != second.is_horizontal(),
            _ => false,
        }
    }

    /// Intersection or dead end.
    #[must_use]
    pub fn is_node(maze: &Maze, tile: TileCoord) -> bool {
        is_intersection(maze, tile) || is_dead_end(maze, tile)
    }

    /// New heading at a corner reached while travelling along `heading`.
    ///
    /// Returns the perpendicular whose neighbour is walkable when exactly one
    /// of the two perpendicular neighbours is; `None` otherwise.
    #[must_use]
    pub fn corner_turn(maze: &Maze, tile: TileCoord, heading: Direction) -> Option<Direction> {
        let [left, right] = heading.perpendiculars();
        let left_open = walkable_neighbor(maze, tile, left).is_some();
        let right_open = walkable_neighbor(maze, tile, right).is_some();
        match (left_open, right_open) {
            (true, false) => Some(left),
            (false, true) => Some(right),
            _ => None,
        }
    }

    /// Tiles currently holding a dot or power dot, in row-major order.
    #[must_use]
    pub fn item_tiles(maze: &Maze) -> Vec<TileCoord> {
        maze.coords().filter(|tile| has_item(maze, *tile)).collect()
    }
}
