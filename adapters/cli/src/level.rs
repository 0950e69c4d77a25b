use pacpilot_core::{TileCoord, TileKind};
use pacpilot_world::{GridError, Maze};
use thiserror::Error;

/// Glyph marking the agent's spawn tile.
const AGENT_SPAWN: char = 'P';
/// Glyph marking a ghost's spawn tile.
const GHOST_SPAWN: char = 'G';

/// Level shipped with the binary, used when no level file is supplied.
pub(crate) const CLASSIC: &str = include_str!("../levels/classic.txt");

/// Reasons a level description may be rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LevelParseError {
    /// The text holds no rows.
    #[error("level text is empty")]
    Empty,
    /// A character has no tile meaning.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the character.
        column: usize,
        /// Row of the character.
        row: usize,
    },
    /// The level does not hold exactly one agent spawn.
    #[error("level must contain exactly one agent spawn `P`, found {count}")]
    AgentSpawnCount {
        /// Number of agent spawns found.
        count: usize,
    },
    /// The tile rows do not form a valid maze.
    #[error("invalid maze layout")]
    Grid(#[from] GridError),
}

/// Pristine level layout together with its spawn points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Level {
    /// Maze with every item still in place.
    pub(crate) maze: Maze,
    /// Tile on which the agent starts every life.
    pub(crate) agent_spawn: TileCoord,
    /// Tiles on which ghosts start, in reading order.
    pub(crate) ghost_spawns: Vec<TileCoord>,
}

impl Level {
    /// Parses a level, one row per line.
    ///
    /// Spawn glyphs stand on empty tiles; every other glyph follows
    /// [`TileKind::from_glyph`].
    pub(crate) fn parse(text: &str) -> Result<Self, LevelParseError> {
        let mut rows = Vec::new();
        let mut agent_spawns = Vec::new();
        let mut ghost_spawns = Vec::new();

        for (row, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let mut cells = Vec::with_capacity(line.len());
            for (column, glyph) in line.chars().enumerate() {
                let kind = match glyph {
                    AGENT_SPAWN => {
                        agent_spawns.push(coord(column, row)?);
                        TileKind::Empty
                    }
                    GHOST_SPAWN => {
                        ghost_spawns.push(coord(column, row)?);
                        TileKind::Empty
                    }
                    _ => TileKind::from_glyph(glyph).ok_or(LevelParseError::UnknownGlyph {
                        glyph,
                        column,
                        row,
                    })?,
                };
                cells.push(kind);
            }
            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(LevelParseError::Empty);
        }
        let maze = Maze::from_rows(rows)?;

        let &[agent_spawn] = agent_spawns.as_slice() else {
            return Err(LevelParseError::AgentSpawnCount {
                count: agent_spawns.len(),
            });
        };

        Ok(Self {
            maze,
            agent_spawn,
            ghost_spawns,
        })
    }
}

fn coord(column: usize, row: usize) -> Result<TileCoord, LevelParseError> {
    let column = u32::try_from(column).map_err(|_| GridError::TooLarge)?;
    let row = u32::try_from(row).map_err(|_| GridError::TooLarge)?;
    Ok(TileCoord::new(column, row))
}
