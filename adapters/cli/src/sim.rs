use std::fmt;

use pacpilot_core::{
    AgentSnapshot, Direction, GhostId, GhostSnapshot, ThreatState, TileCoord, TileKind,
};
use pacpilot_system_decision::{Session, SessionError};
use pacpilot_world::{query, Maze};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{config::HarnessSettings, level::Level};

/// Points granted for eating a dot.
const DOT_POINTS: u32 = 10;
/// Points granted for eating a power dot.
const POWER_DOT_POINTS: u32 = 50;
/// Points granted for eating a frightened ghost.
const GHOST_POINTS: u32 = 200;

/// Reason a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Every life was spent.
    OutOfLives,
    /// The frame budget ran out.
    FrameBudget,
}

/// Tallies reported once a run stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    /// Why the run stopped.
    pub(crate) outcome: Outcome,
    /// Frames simulated.
    pub(crate) frames: u64,
    /// Final score.
    pub(crate) score: u32,
    /// Level being played when the run stopped.
    pub(crate) level: u32,
    /// Levels whose every item was eaten.
    pub(crate) levels_cleared: u32,
    /// Lives left.
    pub(crate) lives: u32,
    /// Dots and power dots eaten.
    pub(crate) items_eaten: u32,
    /// Frightened ghosts sent home.
    pub(crate) ghosts_eaten: u32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Outcome::OutOfLives => "out of lives",
            Outcome::FrameBudget => "frame budget exhausted",
        };
        writeln!(f, "run finished: {outcome}")?;
        writeln!(f, "  frames:         {}", self.frames)?;
        writeln!(f, "  score:          {}", self.score)?;
        writeln!(f, "  level:          {}", self.level)?;
        writeln!(f, "  levels cleared: {}", self.levels_cleared)?;
        writeln!(f, "  lives left:     {}", self.lives)?;
        writeln!(f, "  items eaten:    {}", self.items_eaten)?;
        write!(f, "  ghosts eaten:   {}", self.ghosts_eaten)
    }
}

#[derive(Clone, Debug)]
struct Ghost {
    id: GhostId,
    home: TileCoord,
    tile: TileCoord,
    facing: Direction,
    frightened_for: u32,
}

impl Ghost {
    fn snapshot(&self) -> GhostSnapshot {
        let state = if self.frightened_for > 0 {
            ThreatState::Frightened
        } else {
            ThreatState::Normal
        };
        GhostSnapshot {
            id: self.id,
            tile: self.tile,
            facing: self.facing,
            state,
            frames_till_recover: self.frightened_for,
        }
    }

    fn send_home(&mut self) {
        self.tile = self.home;
        self.facing = Direction::Up;
        self.frightened_for = 0;
    }
}

/// Minimal game loop that feeds the pilot fresh snapshots every frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    level: Level,
    settings: HarnessSettings,
    session: Session,
    rng: ChaCha8Rng,
    maze: Maze,
    agent_tile: TileCoord,
    agent_facing: Direction,
    ghosts: Vec<Ghost>,
    items_left: usize,
    frame: u64,
    score: u32,
    levels_cleared: u32,
    items_eaten: u32,
    ghosts_eaten: u32,
}

impl Simulation {
    /// Starts the first level of a run.
    pub(crate) fn new(
        level: Level,
        settings: HarnessSettings,
        session: Session,
    ) -> Result<Self, SessionError> {
        let ghosts = (0u32..)
            .zip(&level.ghost_spawns)
            .map(|(id, &home)| Ghost {
                id: GhostId::new(id),
                home,
                tile: home,
                facing: Direction::Up,
                frightened_for: 0,
            })
            .collect();

        let mut simulation = Self {
            maze: level.maze.clone(),
            agent_tile: level.agent_spawn,
            agent_facing: Direction::Left,
            rng: ChaCha8Rng::seed_from_u64(settings.ghost_seed),
            level,
            settings,
            session,
            ghosts,
            items_left: 0,
            frame: 0,
            score: 0,
            levels_cleared: 0,
            items_eaten: 0,
            ghosts_eaten: 0,
        };
        simulation.start_level()?;
        Ok(simulation)
    }

    /// Simulates frames until the lives or the frame budget run out.
    pub(crate) fn run(&mut self) -> Result<Summary, SessionError> {
        while self.frame < self.settings.frames {
            if let Some(outcome) = self.step()? {
                return Ok(self.summary(outcome));
            }
        }
        Ok(self.summary(Outcome::FrameBudget))
    }

    fn summary(&self, outcome: Outcome) -> Summary {
        Summary {
            outcome,
            frames: self.frame,
            score: self.score,
            level: self.session.level(),
            levels_cleared: self.levels_cleared,
            lives: self.session.lives(),
            items_eaten: self.items_eaten,
            ghosts_eaten: self.ghosts_eaten,
        }
    }

    fn start_level(&mut self) -> Result<(), SessionError> {
        self.maze = self.level.maze.clone();
        self.items_left = query::item_tiles(&self.maze).len();
        self.reset_positions();
        let ghosts = self.ghost_snapshots();
        let agent = self.agent_snapshot();
        self.session.on_level_start(&self.maze, &ghosts, &agent)
    }

    fn reset_positions(&mut self) {
        self.agent_tile = self.level.agent_spawn;
        self.agent_facing = Direction::Left;
        for ghost in &mut self.ghosts {
            ghost.send_home();
        }
    }

    fn agent_snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            tile: self.agent_tile,
            facing: self.agent_facing,
            open_directions: query::open_directions(&self.maze, self.agent_tile),
        }
    }

    fn ghost_snapshots(&self) -> Vec<GhostSnapshot> {
        self.ghosts.iter().map(Ghost::snapshot).collect()
    }

    fn step(&mut self) -> Result<Option<Outcome>, SessionError> {
        self.frame += 1;

        let ghosts = self.ghost_snapshots();
        let agent = self.agent_snapshot();
        let direction =
            self.session
                .calculate_direction(&self.maze, &ghosts, &agent, self.score);

        if let Some(next) = advance(&self.maze, self.agent_tile, direction) {
            self.agent_tile = next;
        }
        self.agent_facing = direction;
        self.eat();

        let mut ghost_from = Vec::with_capacity(self.ghosts.len());
        for ghost in &mut self.ghosts {
            ghost_from.push(ghost.tile);
            ghost.frightened_for = ghost.frightened_for.saturating_sub(1);
            wander(&self.maze, ghost, &mut self.rng);
        }

        let mut caught = false;
        for (ghost, &from) in self.ghosts.iter_mut().zip(&ghost_from) {
            // Leaving the agent's new tile covers both swaps and a ghost
            // stepping ahead of an agent that walked onto it.
            let met = ghost.tile == self.agent_tile || from == self.agent_tile;
            if !met {
                continue;
            }

            if ghost.frightened_for > 0 {
                tracing::debug!(ghost = ghost.id.get(), frame = self.frame, "ghost eaten");
                ghost.send_home();
                self.score = self.score.saturating_add(GHOST_POINTS);
                self.ghosts_eaten += 1;
                continue;
            }

            tracing::info!(ghost = ghost.id.get(), frame = self.frame, "agent caught");
            caught = true;
            break;
        }

        if caught {
            self.session.on_new_life();
            if self.session.lives() == 0 {
                return Ok(Some(Outcome::OutOfLives));
            }
            self.reset_positions();
            return Ok(None);
        }

        if self.items_left == 0 && !query::item_tiles(&self.level.maze).is_empty() {
            self.levels_cleared += 1;
            tracing::info!(
                level = self.session.level(),
                frame = self.frame,
                score = self.score,
                "level cleared"
            );
            self.start_level()?;
        }

        Ok(None)
    }

    fn eat(&mut self) {
        let points = match self.maze.tile_kind(self.agent_tile) {
            Some(TileKind::Dot) => DOT_POINTS,
            Some(TileKind::PowerDot) => {
                for ghost in &mut self.ghosts {
                    ghost.frightened_for = self.settings.frightened_frames;
                }
                POWER_DOT_POINTS
            }
            _ => return,
        };

        let _ = self.maze.set_tile_kind(self.agent_tile, TileKind::Empty);
        self.items_left = self.items_left.saturating_sub(1);
        self.items_eaten += 1;
        self.score = self.score.saturating_add(points);
    }
}

/// Tile reached by moving from `tile` in `direction`.
///
/// A horizontal move off a teleport that leads nowhere wraps to the partner
/// teleport on the same row.
fn advance(maze: &Maze, tile: TileCoord, direction: Direction) -> Option<TileCoord> {
    if let Some(next) = query::walkable_neighbor(maze, tile, direction) {
        return Some(next);
    }
    if !direction.is_horizontal() || !query::is_teleport(maze, tile) {
        return None;
    }
    (0..maze.width())
        .map(|column| TileCoord::new(column, tile.row()))
        .find(|&other| other != tile && query::is_teleport(maze, other))
}

/// Moves a ghost one tile, never reversing unless the corridor ends.
fn wander(maze: &Maze, ghost: &mut Ghost, rng: &mut ChaCha8Rng) {
    let passable = |direction: Direction| {
        ghost
            .tile
            .step(direction)
            .and_then(|next| maze.tile_kind(next))
            .is_some_and(TileKind::is_routable)
    };

    let mut options: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&direction| direction != ghost.facing.opposite() && passable(direction))
        .collect();
    if options.is_empty() && passable(ghost.facing.opposite()) {
        options.push(ghost.facing.opposite());
    }

    let Some(&direction) = options.choose(rng) else {
        return;
    };
    if let Some(next) = ghost.tile.step(direction) {
        ghost.tile = next;
        ghost.facing = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacpilot_system_decision::PolicyConfig;

    fn simulation(text: &str, settings: HarnessSettings) -> Simulation {
        let level = Level::parse(text).expect("level parses");
        let session = Session::new(PolicyConfig::default(), settings.lives).expect("valid config");
        Simulation::new(level, settings, session).expect("level starts")
    }

    fn settings(lives: u32, frames: u64) -> HarnessSettings {
        HarnessSettings {
            lives,
            frames,
            ..HarnessSettings::default()
        }
    }

    #[test]
    fn clearing_the_last_item_starts_the_next_level() {
        let mut sim = simulation("#####\n#P..#\n#####", settings(3, 2));
        let summary = sim.run().expect("run completes");

        assert_eq!(summary.outcome, Outcome::FrameBudget);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.score, 2 * DOT_POINTS);
        assert_eq!(summary.levels_cleared, 1);
        assert_eq!(summary.level, 2);
        assert_eq!(sim.agent_tile, TileCoord::new(1, 1));
        assert_eq!(sim.items_left, 2);
    }

    #[test]
    fn threatening_ghost_costs_lives_until_none_remain() {
        let mut sim = simulation("#######\n#P   G#\n#######", settings(2, 200));
        let summary = sim.run().expect("run completes");

        assert_eq!(summary.outcome, Outcome::OutOfLives);
        assert_eq!(summary.lives, 0);
        assert!(summary.frames < 200);
    }

    #[test]
    fn power_dot_lets_the_agent_eat_a_ghost() {
        let mut sim = simulation("########\n#Po  .G#\n########", settings(3, 100));

        for _ in 0..20 {
            let _ = sim.step().expect("frame succeeds");
            if sim.ghosts_eaten > 0 {
                break;
            }
        }

        assert_eq!(sim.ghosts_eaten, 1);
        assert_eq!(sim.score, POWER_DOT_POINTS + GHOST_POINTS);
        assert_eq!(sim.ghosts[0].tile, sim.ghosts[0].home);
        assert_eq!(sim.ghosts[0].frightened_for, 0);
        assert_eq!(sim.session.lives(), 3);
    }

    #[test]
    fn agent_meets_a_ghost_walking_away_from_it() {
        let level = "########\n#PG    #\n########";

        let mut sim = simulation(level, settings(3, 100));
        sim.ghosts[0].facing = Direction::Right;
        let _ = sim.step().expect("frame succeeds");
        assert_eq!(sim.session.lives(), 2);
        assert_eq!(sim.agent_tile, TileCoord::new(1, 1));
        assert_eq!(sim.ghosts[0].tile, sim.ghosts[0].home);

        let mut sim = simulation(level, settings(3, 100));
        sim.ghosts[0].facing = Direction::Right;
        sim.ghosts[0].frightened_for = 20;
        let _ = sim.step().expect("frame succeeds");
        assert_eq!(sim.ghosts_eaten, 1);
        assert_eq!(sim.score, GHOST_POINTS);
        assert_eq!(sim.session.lives(), 3);
        assert_eq!(sim.agent_tile, TileCoord::new(2, 1));
        assert_eq!(sim.ghosts[0].tile, sim.ghosts[0].home);
    }

    #[test]
    fn teleports_wrap_horizontally() {
        let maze = Maze::from_ascii("#####\nT   T\n#####").expect("maze parses");

        assert_eq!(
            advance(&maze, TileCoord::new(0, 1), Direction::Left),
            Some(TileCoord::new(4, 1))
        );
        assert_eq!(
            advance(&maze, TileCoord::new(4, 1), Direction::Right),
            Some(TileCoord::new(0, 1))
        );
        assert_eq!(
            advance(&maze, TileCoord::new(4, 1), Direction::Left),
            Some(TileCoord::new(3, 1))
        );
        assert_eq!(advance(&maze, TileCoord::new(0, 1), Direction::Up), None);
        assert_eq!(advance(&maze, TileCoord::new(1, 1), Direction::Up), None);
    }

    #[test]
    fn ghosts_only_reverse_at_dead_ends() {
        let maze = Maze::from_ascii("#####\n#   #\n#####").expect("maze parses");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ghost = Ghost {
            id: GhostId::new(0),
            home: TileCoord::new(1, 1),
            tile: TileCoord::new(2, 1),
            facing: Direction::Right,
            frightened_for: 0,
        };

        wander(&maze, &mut ghost, &mut rng);
        assert_eq!(ghost.tile, TileCoord::new(3, 1));
        wander(&maze, &mut ghost, &mut rng);
        assert_eq!(ghost.tile, TileCoord::new(2, 1));
        assert_eq!(ghost.facing, Direction::Left);
        wander(&maze, &mut ghost, &mut rng);
        assert_eq!(ghost.tile, TileCoord::new(1, 1));
    }

    #[test]
    fn same_seeds_replay_the_same_run() {
        let replay = || {
            let mut sim = simulation(crate::level::CLASSIC, settings(3, 400));
            let mut trail = Vec::new();
            while sim.frame < 400 {
                if sim.step().expect("frame succeeds").is_some() {
                    break;
                }
                trail.push((sim.agent_tile, sim.score));
            }
            (trail, sim.summary(Outcome::FrameBudget))
        };

        assert_eq!(replay(), replay());
    }
}
