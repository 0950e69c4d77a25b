//! Level and life bookkeeping wrapped around a [`Pilot`].

use pacpilot_core::{AgentSnapshot, Direction, GhostId, GhostSnapshot, TileCoord};
use pacpilot_world::{query, Maze};
use thiserror::Error;

use crate::{ConfigError, FrameInput, Pilot, PolicyConfig};

/// Reasons a level start may be rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The agent spawn lies outside the maze.
    #[error("agent spawn {tile:?} lies outside the {width}x{height} maze")]
    AgentOutOfBounds {
        /// Offending spawn tile.
        tile: TileCoord,
        /// Maze width.
        width: u32,
        /// Maze height.
        height: u32,
    },
    /// The agent spawn is a wall or door.
    #[error("agent spawn {tile:?} is not walkable")]
    AgentOnBlockedTile {
        /// Offending spawn tile.
        tile: TileCoord,
    },
    /// A ghost spawn lies outside the maze.
    #[error("ghost {} spawns at {tile:?}, outside the maze", .id.get())]
    GhostOutOfBounds {
        /// Ghost whose spawn is invalid.
        id: GhostId,
        /// Offending spawn tile.
        tile: TileCoord,
    },
}

/// Engine-facing wrapper that tracks lives and levels for a pilot.
#[derive(Debug)]
pub struct Session {
    pilot: Pilot,
    lives: u32,
    level: u32,
}

impl Session {
    /// Creates a session with the provided number of lives.
    pub fn new(config: PolicyConfig, lives: u32) -> Result<Self, ConfigError> {
        Ok(Self::with_pilot(Pilot::new(config)?, lives))
    }

    /// Wraps an existing pilot.
    #[must_use]
    pub fn with_pilot(pilot: Pilot, lives: u32) -> Self {
        Self {
            pilot,
            lives,
            level: 0,
        }
    }

    /// Lives not yet consumed.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// One-based index of the current level; zero before the first level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Pilot driven by the session.
    #[must_use]
    pub fn pilot(&self) -> &Pilot {
        &self.pilot
    }

    /// Validates the level's initial state and rebuilds the topology graph.
    pub fn on_level_start(
        &mut self,
        maze: &Maze,
        ghosts: &[GhostSnapshot],
        agent: &AgentSnapshot,
    ) -> Result<(), SessionError> {
        if !maze.contains(agent.tile) {
            return Err(SessionError::AgentOutOfBounds {
                tile: agent.tile,
                width: maze.width(),
                height: maze.height(),
            });
        }
        if !query::is_walkable(maze, agent.tile) {
            return Err(SessionError::AgentOnBlockedTile { tile: agent.tile });
        }
        if let Some(ghost) = ghosts.iter().find(|ghost| !maze.contains(ghost.tile)) {
            return Err(SessionError::GhostOutOfBounds {
                id: ghost.id,
                tile: ghost.tile,
            });
        }

        self.level = self.level.saturating_add(1);
        self.pilot.on_level_start(maze);
        tracing::info!(
            level = self.level,
            nodes = self.pilot.graph().node_count(),
            edges = self.pilot.graph().edge_count(),
            "level started"
        );
        Ok(())
    }

    /// Forgets transient pilot state after the agent respawns and spends a life.
    pub fn on_new_life(&mut self) {
        tracing::info!(lives = self.lives, "agent respawned");
        self.lives = self.lives.saturating_sub(1);
        self.pilot.reset_transient();
    }

    /// Chooses the agent's direction for the current frame.
    pub fn calculate_direction(
        &mut self,
        maze: &Maze,
        ghosts: &[GhostSnapshot],
        agent: &AgentSnapshot,
        score: u32,
    ) -> Direction {
        let frame = FrameInput {
            maze,
            ghosts,
            agent,
            score,
            level: self.level,
        };
        self.pilot.decide(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacpilot_core::ThreatState;

    fn agent(tile: TileCoord) -> AgentSnapshot {
        AgentSnapshot {
            tile,
            facing: Direction::Left,
            open_directions: vec![Direction::Left, Direction::Right],
        }
    }

    #[test]
    fn level_start_counts_levels_and_builds_graph() {
        let maze = Maze::from_ascii("#####\n#   #\n#####").expect("maze parses");
        let mut session = Session::new(PolicyConfig::default(), 3).expect("valid config");
        assert_eq!(session.level(), 0);

        session
            .on_level_start(&maze, &[], &agent(TileCoord::new(2, 1)))
            .expect("level starts");
        assert_eq!(session.level(), 1);
        assert_eq!(session.pilot().graph().node_count(), 2);

        session
            .on_level_start(&maze, &[], &agent(TileCoord::new(2, 1)))
            .expect("level starts");
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn level_start_rejects_bad_spawns() {
        let maze = Maze::from_ascii("#####\n#   #\n#####").expect("maze parses");
        let mut session = Session::new(PolicyConfig::default(), 3).expect("valid config");

        assert_eq!(
            session.on_level_start(&maze, &[], &agent(TileCoord::new(7, 1))),
            Err(SessionError::AgentOutOfBounds {
                tile: TileCoord::new(7, 1),
                width: 5,
                height: 3
            })
        );
        assert_eq!(
            session.on_level_start(&maze, &[], &agent(TileCoord::new(0, 0))),
            Err(SessionError::AgentOnBlockedTile {
                tile: TileCoord::new(0, 0)
            })
        );

        let ghost = GhostSnapshot {
            id: GhostId::new(2),
            tile: TileCoord::new(1, 9),
            facing: Direction::Up,
            state: ThreatState::Normal,
            frames_till_recover: 0,
        };
        assert_eq!(
            session.on_level_start(&maze, &[ghost], &agent(TileCoord::new(1, 1))),
            Err(SessionError::GhostOutOfBounds {
                id: GhostId::new(2),
                tile: TileCoord::new(1, 9)
            })
        );
        assert_eq!(session.level(), 0);
    }

    #[test]
    fn new_life_spends_a_life_and_saturates() {
        let mut session = Session::new(PolicyConfig::default(), 1).expect("valid config");
        session.on_new_life();
        assert_eq!(session.lives(), 0);
        session.on_new_life();
        assert_eq!(session.lives(), 0);
    }
}
