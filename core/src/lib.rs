#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pac Pilot decision core.
//!
//! This crate defines the vocabulary every other crate speaks: tile
//! coordinates and directions on the bounded grid, the tile kinds stored in a
//! maze snapshot, the per-frame agent and ghost snapshots handed over by the
//! external engine, and the [`Route`] values returned by path queries. The
//! world crate classifies tiles and builds the topology graph, pure systems
//! answer path queries and decide a [`Direction`] per frame, and adapters
//! drive the whole pipeline.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Cardinal movement directions available to the agent and the ghosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in the canonical order used for neighbour expansion.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit vector expressed as `(column delta, row delta)`.
    #[must_use]
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Recovers the direction matching a unit vector, if any.
    #[must_use]
    pub const fn from_vector(vector: (i32, i32)) -> Option<Self> {
        match vector {
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }

    /// Direction pointing the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether the direction moves along the column axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// The two directions lying on the other axis.
    ///
    /// Horizontal directions yield `[Up, Down]`, vertical ones `[Left, Right]`.
    #[must_use]
    pub const fn perpendiculars(self) -> [Self; 2] {
        if self.is_horizontal() {
            [Self::Up, Self::Down]
        } else {
            [Self::Left, Self::Right]
        }
    }

    /// Direction of a single step from `from` to an adjacent `to`.
    ///
    /// Returns `None` when the tiles are identical or not grid-adjacent.
    #[must_use]
    pub fn between(from: TileCoord, to: TileCoord) -> Option<Self> {
        let dx = i64::from(to.column()) - i64::from(from.column());
        let dy = i64::from(to.row()) - i64::from(from.row());
        let vector = (i32::try_from(dx).ok()?, i32::try_from(dy).ok()?);
        Self::from_vector(vector)
    }
}

/// Location of a single tile expressed as column (x) and row (y) coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether both tiles lie on the same row or the same column.
    #[must_use]
    pub fn shares_axis(self, other: TileCoord) -> bool {
        self.column == other.column || self.row == other.row
    }

    /// Neighbouring tile one step away in `direction`.
    ///
    /// Returns `None` when the step would underflow a coordinate. Upper bounds
    /// belong to the maze and are not checked here.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<TileCoord> {
        match direction {
            Direction::Up => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::Down => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::Left => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
            Direction::Right => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Static content of a single maze tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid wall.
    Wall,
    /// Ghost-house door; never walkable for the agent.
    Door,
    /// Teleport tile linking opposite edges of the maze.
    Teleport,
    /// Open corridor without an item.
    Empty,
    /// Corridor holding a regular dot.
    Dot,
    /// Corridor holding a power dot that frightens the ghosts.
    PowerDot,
}

impl TileKind {
    /// Reports whether the tile carries a consumable item.
    #[must_use]
    pub const fn is_item(self) -> bool {
        matches!(self, Self::Dot | Self::PowerDot)
    }

    /// Reports whether the tile may be occupied at all.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall | Self::Door)
    }

    /// Reports whether shortest-path queries may pass through the tile.
    ///
    /// Teleports are occupiable but never traversed as an intermediate step.
    #[must_use]
    pub const fn is_routable(self) -> bool {
        self.is_walkable() && !matches!(self, Self::Teleport)
    }

    /// Parses the single-character glyph used by ASCII maze layouts.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(Self::Wall),
            '-' => Some(Self::Door),
            'T' => Some(Self::Teleport),
            ' ' => Some(Self::Empty),
            '.' => Some(Self::Dot),
            'o' => Some(Self::PowerDot),
            _ => None,
        }
    }

    /// Glyph representing the tile in ASCII maze layouts.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Door => '-',
            Self::Teleport => 'T',
            Self::Empty => ' ',
            Self::Dot => '.',
            Self::PowerDot => 'o',
        }
    }
}

/// Threat state of a ghost as observed in the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatState {
    /// The ghost hunts the agent.
    Normal,
    /// The ghost is vulnerable until its recovery countdown elapses.
    Frightened,
}

/// Unique identifier assigned to a ghost by the external engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GhostId(u32);

impl GhostId {
    /// Creates a new ghost identifier with the provided numeric value.
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

/// Immutable representation of a single ghost's state for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostSnapshot {
    /// Identifier that stays stable across frames.
    pub id: GhostId,
    /// Tile currently occupied by the ghost.
    pub tile: TileCoord,
    /// Direction the ghost is facing.
    pub facing: Direction,
    /// Current threat state.
    pub state: ThreatState,
    /// Frames remaining until a frightened ghost turns normal again.
    pub frames_till_recover: u32,
}

impl GhostSnapshot {
    /// Ghost that can still catch the agent: normal, or about to recover.
    #[must_use]
    pub fn is_threat(&self, recovery_threshold: u32) -> bool {
        self.state != ThreatState::Frightened || self.frames_till_recover < recovery_threshold
    }

    /// Ghost that stays vulnerable long enough to be worth chasing.
    #[must_use]
    pub fn is_huntable(&self, recovery_threshold: u32) -> bool {
        self.state == ThreatState::Frightened && self.frames_till_recover > recovery_threshold
    }
}

/// Immutable representation of the agent's state for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Tile currently occupied by the agent.
    pub tile: TileCoord,
    /// Direction the agent is facing.
    pub facing: Direction,
    /// Directions the agent may legally take from its tile.
    pub open_directions: Vec<Direction>,
}

impl AgentSnapshot {
    /// Reports whether the agent may move in `direction` this frame.
    #[must_use]
    pub fn can_move(&self, direction: Direction) -> bool {
        self.open_directions.contains(&direction)
    }
}

/// Ordered tiles leading away from a start tile (exclusive) to a goal (inclusive).
///
/// Consecutive tiles are grid-adjacent. An empty route means either that the
/// start already equals the goal or that no path exists; callers that need
/// to tell the two apart ask the solver for a distance instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Route {
    tiles: Vec<TileCoord>,
}

/// Corridor tile sequence between two topology nodes, produced by the
/// corridor walker. Exclusive of the source node, inclusive of the terminal.
pub type Edge = Route;

impl Route {
    /// Creates an empty route.
    #[must_use]
    pub const fn empty() -> Self {
        Self { tiles: Vec::new() }
    }

    /// Wraps an ordered tile sequence.
    #[must_use]
    pub fn from_tiles(tiles: Vec<TileCoord>) -> Self {
        Self { tiles }
    }

    /// Tiles in travel order.
    #[must_use]
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Number of single-tile steps in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the route holds no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Final tile of the route.
    #[must_use]
    pub fn last(&self) -> Option<TileCoord> {
        self.tiles.last().copied()
    }

    /// Reports whether the route passes through `tile`.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.tiles.contains(&tile)
    }

    /// Reports whether the two routes share at least one tile.
    ///
    /// Timing is ignored: two parties crossing the same tile at different
    /// frames still count as overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Route) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let seen: HashSet<TileCoord> = small.tiles.iter().copied().collect();
        large.tiles.iter().any(|tile| seen.contains(tile))
    }

    /// First step of the route taken from `start`.
    #[must_use]
    pub fn first_direction(&self, start: TileCoord) -> Option<Direction> {
        self.tiles
            .first()
            .and_then(|first| Direction::between(start, *first))
    }

    /// Converts the route into the directions that walk it from `start`.
    ///
    /// Conversion stops at the first pair of tiles that are not adjacent.
    #[must_use]
    pub fn directions(&self, start: TileCoord) -> Vec<Direction> {
        let mut current = start;
        let mut directions = Vec::with_capacity(self.tiles.len());
        for &next in &self.tiles {
            let Some(direction) = Direction::between(current, next) else {
                break;
            };
            directions.push(direction);
            current = next;
        }
        directions
    }
}

impl From<Vec<TileCoord>> for Route {
    fn from(tiles: Vec<TileCoord>) -> Self {
        Self::from_tiles(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, GhostId, GhostSnapshot, Route, ThreatState, TileCoord, TileKind};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn perpendiculars_switch_axis() {
        assert_eq!(Direction::Left.perpendiculars(), [Direction::Up, Direction::Down]);
        assert_eq!(Direction::Down.perpendiculars(), [Direction::Left, Direction::Right]);
    }

    #[test]
    fn vectors_are_bijective() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_vector(direction.vector()), Some(direction));
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Direction::from_vector((1, 1)), None);
    }

    #[test]
    fn step_refuses_to_underflow() {
        let corner = TileCoord::new(0, 0);
        assert_eq!(corner.step(Direction::Up), None);
        assert_eq!(corner.step(Direction::Left), None);
        assert_eq!(corner.step(Direction::Right), Some(TileCoord::new(1, 0)));
        assert_eq!(corner.step(Direction::Down), Some(TileCoord::new(0, 1)));
    }

    #[test]
    fn between_only_accepts_adjacent_tiles() {
        let origin = TileCoord::new(3, 3);
        assert_eq!(Direction::between(origin, TileCoord::new(3, 2)), Some(Direction::Up));
        assert_eq!(Direction::between(origin, TileCoord::new(2, 3)), Some(Direction::Left));
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, TileCoord::new(5, 3)), None);
    }

    #[test]
    fn overlap_ignores_order() {
        let a = Route::from_tiles(vec![TileCoord::new(1, 0), TileCoord::new(2, 0)]);
        let b = Route::from_tiles(vec![TileCoord::new(2, 1), TileCoord::new(2, 0)]);
        let c = Route::from_tiles(vec![TileCoord::new(5, 5)]);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&Route::empty()));
    }

    #[test]
    fn directions_follow_route() {
        let start = TileCoord::new(1, 1);
        let route = Route::from_tiles(vec![
            TileCoord::new(2, 1),
            TileCoord::new(2, 2),
            TileCoord::new(1, 2),
        ]);
        assert_eq!(
            route.directions(start),
            vec![Direction::Right, Direction::Down, Direction::Left]
        );
        assert_eq!(route.first_direction(start), Some(Direction::Right));
        assert_eq!(Route::empty().first_direction(start), None);
    }

    #[test]
    fn teleports_are_walkable_but_not_routable() {
        assert!(TileKind::Teleport.is_walkable());
        assert!(!TileKind::Teleport.is_routable());
        assert!(!TileKind::Door.is_walkable());
        assert!(TileKind::PowerDot.is_item());
        assert!(TileKind::Dot.is_routable());
    }

    #[test]
    fn recovery_threshold_splits_threat_and_prey() {
        let mut ghost = GhostSnapshot {
            id: GhostId::new(0),
            tile: TileCoord::new(0, 0),
            facing: Direction::Left,
            state: ThreatState::Frightened,
            frames_till_recover: 20,
        };
        assert!(ghost.is_huntable(5));
        assert!(!ghost.is_threat(5));

        ghost.frames_till_recover = 5;
        assert!(!ghost.is_huntable(5));
        assert!(!ghost.is_threat(5));

        ghost.frames_till_recover = 3;
        assert!(ghost.is_threat(5));

        ghost.state = ThreatState::Normal;
        assert!(ghost.is_threat(5));
        assert!(!ghost.is_huntable(5));
    }
}
