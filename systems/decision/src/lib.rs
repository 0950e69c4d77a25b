#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame decision policy steering the agent through the maze.
//!
//! [`Pilot`] evaluates a fixed ladder of branches every frame: teleport
//! escape, pursuit of a remembered frightened ghost, opportunistic hunting,
//! safe item collection and finally a random corridor walk. [`Session`]
//! wraps a pilot with the level and life bookkeeping an engine expects.

pub mod config;
pub mod session;

use std::collections::VecDeque;

use pacpilot_core::{AgentSnapshot, Direction, Edge, GhostId, GhostSnapshot, Route, TileCoord};
use pacpilot_system_pathfinding::PathFinder;
use pacpilot_world::{corridor, query, topology::TopologyGraph, Maze};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use config::{ConfigError, PolicyConfig};
pub use session::{Session, SessionError};

/// Everything the engine exposes to the pilot for a single frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Current maze snapshot, with consumed items already removed.
    pub maze: &'a Maze,
    /// Every ghost in the maze.
    pub ghosts: &'a [GhostSnapshot],
    /// The agent being steered.
    pub agent: &'a AgentSnapshot,
    /// Current score; informational only.
    pub score: u32,
    /// Current level, used to look up the ghost speed.
    pub level: u32,
}

/// Branch of the policy that produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
    /// The agent stood on a teleport.
    TeleportEscape,
    /// The agent kept following its committed route.
    Committed,
    /// The agent chased the ghost remembered from earlier frames.
    RememberedHunt,
    /// The agent started chasing a nearby frightened ghost.
    Hunt,
    /// The agent headed for a safe item.
    Collect,
    /// No goal was viable; a random open direction was taken.
    Fallback,
    /// The agent had no usable direction and held its facing.
    Hold,
}

/// Direction chosen for a frame, together with the branch that chose it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Direction handed back to the engine.
    pub direction: Direction,
    /// Branch of the policy that produced the direction.
    pub branch: Branch,
}

impl Decision {
    const fn new(direction: Direction, branch: Branch) -> Self {
        Self { direction, branch }
    }
}

/// Decision engine owning the per-level graph and the state carried across frames.
#[derive(Debug)]
pub struct Pilot {
    config: PolicyConfig,
    finder: PathFinder,
    rng: ChaCha8Rng,
    graph: TopologyGraph,
    hunt_target: Option<GhostId>,
    committed: VecDeque<TileCoord>,
}

impl Pilot {
    /// Creates a pilot whose random source is seeded from the configuration.
    pub fn new(config: PolicyConfig) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self::with_rng(config, rng)
    }

    /// Creates a pilot using an explicitly provided random source.
    pub fn with_rng(config: PolicyConfig, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            finder: PathFinder::new(),
            rng,
            graph: TopologyGraph::default(),
            hunt_target: None,
            committed: VecDeque::new(),
        })
    }

    /// Configuration driving the pilot.
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Topology graph cached for the current level.
    #[must_use]
    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    /// Ghost currently remembered as the hunt target.
    #[must_use]
    pub fn hunt_target(&self) -> Option<GhostId> {
        self.hunt_target
    }

    /// Remaining tiles of the route remembered from earlier frames.
    pub fn committed_route(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.committed.iter().copied()
    }

    /// Rebuilds the topology graph for a new level and forgets transient state.
    pub fn on_level_start(&mut self, maze: &Maze) {
        self.graph = TopologyGraph::build(maze);
        self.reset_transient();
    }

    /// Forgets the committed route and the hunt target.
    pub fn reset_transient(&mut self) {
        self.hunt_target = None;
        self.committed.clear();
    }

    /// Chooses the direction for the current frame.
    pub fn decide(&mut self, frame: &FrameInput<'_>) -> Direction {
        self.decide_with_branch(frame).direction
    }

    /// Chooses the direction for the current frame and reports the branch taken.
    pub fn decide_with_branch(&mut self, frame: &FrameInput<'_>) -> Decision {
        let decision = self.evaluate(frame);
        tracing::debug!(
            tile = ?frame.agent.tile,
            score = frame.score,
            level = frame.level,
            direction = ?decision.direction,
            branch = ?decision.branch,
            "decided"
        );
        decision
    }

    fn evaluate(&mut self, frame: &FrameInput<'_>) -> Decision {
        let agent = frame.agent;
        if !frame.maze.contains(agent.tile) {
            tracing::warn!(tile = ?agent.tile, "agent outside the maze; holding facing");
            self.committed.clear();
            return Decision::new(agent.facing, Branch::Hold);
        }

        if query::is_teleport(frame.maze, agent.tile) {
            self.committed.clear();
            return Decision::new(self.config.escape_direction, Branch::TeleportEscape);
        }

        if self.config.commit_to_corridor {
            if let Some(direction) = self.follow_commitment(frame) {
                return Decision::new(direction, Branch::Committed);
            }
        }

        if let Some(decision) = self.pursue_remembered_target(frame) {
            return decision;
        }

        let hunt = self.select_hunt(frame);
        let threat_routes = self.threat_routes(frame);

        if let Some(route) = hunt {
            if self.is_intercepted(frame, &route, &threat_routes) {
                tracing::trace!(hunt_target = ?self.hunt_target, "hunt route intercepted");
            } else if let Some(direction) = route.first_direction(agent.tile) {
                self.commit(route);
                return Decision::new(direction, Branch::Hunt);
            }
        }

        if let Some(direction) = self.collect(frame, &threat_routes) {
            return Decision::new(direction, Branch::Collect);
        }

        self.fallback(frame)
    }

    fn follow_commitment(&mut self, frame: &FrameInput<'_>) -> Option<Direction> {
        let agent = frame.agent;
        while self.committed.front() == Some(&agent.tile) {
            let _ = self.committed.pop_front();
        }

        let next = *self.committed.front()?;
        let threshold = self.config.hunt_recovery_threshold;
        let threatened = frame
            .ghosts
            .iter()
            .filter(|ghost| ghost.is_threat(threshold))
            .any(|ghost| self.committed.contains(&ghost.tile));

        match Direction::between(agent.tile, next) {
            Some(direction) if agent.can_move(direction) && !threatened => Some(direction),
            _ => {
                self.committed.clear();
                None
            }
        }
    }

    fn pursue_remembered_target(&mut self, frame: &FrameInput<'_>) -> Option<Decision> {
        let target_id = self.hunt_target?;
        let threshold = self.config.hunt_recovery_threshold;
        let target = frame
            .ghosts
            .iter()
            .find(|ghost| ghost.id == target_id)
            .filter(|ghost| ghost.is_huntable(threshold))?;

        let agent = frame.agent;
        if agent.tile == target.tile {
            self.committed.clear();
            return Some(Decision::new(hold_or_any(agent), Branch::RememberedHunt));
        }

        let route = self.finder.shortest_path(frame.maze, agent.tile, target.tile);
        if route.len() >= self.config.hunt_route_limit {
            return None;
        }

        // Empty here means unreachable; let the later branches decide.
        let Some(direction) = route.first_direction(agent.tile) else {
            tracing::trace!(hunt_target = ?self.hunt_target, "remembered target unreachable");
            return None;
        };
        self.commit(route);
        Some(Decision::new(direction, Branch::RememberedHunt))
    }

    fn select_hunt(&mut self, frame: &FrameInput<'_>) -> Option<Route> {
        let agent = frame.agent;
        let threshold = self.config.hunt_recovery_threshold;

        let mut ranked: Vec<&GhostSnapshot> = frame.ghosts.iter().collect();
        ranked.sort_by_key(|ghost| ghost.tile.manhattan_distance(agent.tile));

        for ghost in ranked {
            if !ghost.is_huntable(threshold) {
                continue;
            }
            if ghost.tile.manhattan_distance(agent.tile) >= self.config.hunt_radius {
                continue;
            }
            if ghost.tile.shares_axis(agent.tile) {
                continue;
            }

            let route = self.finder.shortest_path(frame.maze, agent.tile, ghost.tile);
            if route.is_empty() {
                continue;
            }

            let blocked = frame
                .ghosts
                .iter()
                .filter(|other| other.id != ghost.id)
                .any(|other| route.contains(other.tile));
            if blocked {
                continue;
            }

            self.hunt_target = Some(ghost.id);
            return Some(route);
        }

        None
    }

    fn threat_routes(&mut self, frame: &FrameInput<'_>) -> Vec<Route> {
        let threshold = self.config.hunt_recovery_threshold;
        frame
            .ghosts
            .iter()
            .filter(|ghost| ghost.is_threat(threshold))
            .map(|ghost| {
                self.finder
                    .shortest_path(frame.maze, ghost.tile, frame.agent.tile)
            })
            .filter(|route| !route.is_empty())
            .collect()
    }

    fn is_intercepted(
        &self,
        frame: &FrameInput<'_>,
        route: &Route,
        threat_routes: &[Route],
    ) -> bool {
        let ghost_speed = self.config.ghost_speed(frame.level);
        let agent_time = route.len() as f64 / self.config.agent_speed + self.config.safety_margin;
        threat_routes.iter().any(|threat| {
            let ghost_time = threat.len() as f64 / ghost_speed;
            ghost_time < agent_time && route.overlaps(threat)
        })
    }

    fn collect(&mut self, frame: &FrameInput<'_>, threat_routes: &[Route]) -> Option<Direction> {
        let agent = frame.agent;
        let mut candidates = query::item_tiles(frame.maze);
        candidates.sort_by_key(|tile| tile.manhattan_distance(agent.tile));
        candidates.truncate(self.config.dot_candidate_limit);

        for item in candidates {
            let route = self.finder.shortest_path(frame.maze, agent.tile, item);
            if route.is_empty() {
                tracing::trace!(?item, "item unreachable");
                continue;
            }

            if frame.ghosts.iter().any(|ghost| route.contains(ghost.tile)) {
                tracing::trace!(?item, "ghost occupies the route");
                continue;
            }

            if self.is_intercepted(frame, &route, threat_routes) {
                tracing::trace!(?item, "route intercepted");
                continue;
            }

            if let Some(direction) = route.first_direction(agent.tile) {
                self.commit(route);
                return Some(direction);
            }
        }

        None
    }

    fn fallback(&mut self, frame: &FrameInput<'_>) -> Decision {
        let agent = frame.agent;
        let Some(&direction) = agent.open_directions.choose(&mut self.rng) else {
            tracing::warn!(tile = ?agent.tile, "no open directions; holding facing");
            self.committed.clear();
            return Decision::new(agent.facing, Branch::Hold);
        };

        let edge = self.corridor_from(frame.maze, agent.tile, direction);
        self.commit(edge);
        Decision::new(direction, Branch::Fallback)
    }

    fn corridor_from(&self, maze: &Maze, tile: TileCoord, direction: Direction) -> Edge {
        let cached = self.graph.edges_from(tile).and_then(|edges| {
            edges
                .values()
                .find(|edge| edge.first_direction(tile) == Some(direction))
        });
        match cached {
            Some(edge) => edge.clone(),
            None => corridor::walk(maze, tile, direction),
        }
    }

    fn commit(&mut self, route: Route) {
        self.committed = route.tiles().iter().copied().collect();
    }
}

fn hold_or_any(agent: &AgentSnapshot) -> Direction {
    if agent.can_move(agent.facing) {
        return agent.facing;
    }
    agent
        .open_directions
        .first()
        .copied()
        .unwrap_or(agent.facing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacpilot_core::ThreatState;

    fn agent_at(maze: &Maze, tile: TileCoord, facing: Direction) -> AgentSnapshot {
        AgentSnapshot {
            tile,
            facing,
            open_directions: query::open_directions(maze, tile),
        }
    }

    #[test]
    fn hold_prefers_current_facing() {
        let maze = Maze::from_ascii("#####\n#   #\n#####").expect("maze parses");
        let agent = agent_at(&maze, TileCoord::new(2, 1), Direction::Left);
        assert_eq!(hold_or_any(&agent), Direction::Left);

        let agent = agent_at(&maze, TileCoord::new(2, 1), Direction::Up);
        assert_eq!(hold_or_any(&agent), Direction::Right);
    }

    #[test]
    fn interception_scales_with_level_speed() {
        let maze = Maze::from_ascii("##########\n#        #\n##########").expect("maze parses");
        let pilot = Pilot::new(PolicyConfig::default()).expect("valid config");
        let agent = agent_at(&maze, TileCoord::new(1, 1), Direction::Right);
        let ghosts = [GhostSnapshot {
            id: GhostId::new(0),
            tile: TileCoord::new(8, 1),
            facing: Direction::Left,
            state: ThreatState::Normal,
            frames_till_recover: 0,
        }];
        let route: Route = (2..=6)
            .map(|column| TileCoord::new(column, 1))
            .collect::<Vec<_>>()
            .into();
        let threat: Route = (1..=7)
            .rev()
            .map(|column| TileCoord::new(column, 1))
            .collect::<Vec<_>>()
            .into();

        let frame = |level| FrameInput {
            maze: &maze,
            ghosts: &ghosts,
            agent: &agent,
            score: 0,
            level,
        };

        // 7 / 4 = 1.75 is not below 5 / 8 + 0.5 = 1.125.
        assert!(!pilot.is_intercepted(&frame(0), &route, std::slice::from_ref(&threat)));
        // 7 / 8 = 0.875 is.
        assert!(pilot.is_intercepted(&frame(8), &route, std::slice::from_ref(&threat)));
    }
}
