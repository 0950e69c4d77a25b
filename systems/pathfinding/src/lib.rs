#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first shortest-path queries over the raw tile grid.

use std::collections::VecDeque;

use pacpilot_core::{Direction, Route, TileCoord};
use pacpilot_world::Maze;

/// Shortest-path solver that reuses scratch buffers between queries.
///
/// Walls, doors and teleports are obstacles. A teleport is accepted only as
/// the goal of a query, never as an intermediate step. Grid bounds always
/// come from the maze being searched.
#[derive(Debug, Default)]
pub struct PathFinder {
    came_from: Vec<Option<TileCoord>>,
    frontier: VecDeque<TileCoord>,
}

impl PathFinder {
    /// Creates a solver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a shortest route from `start` (exclusive) to `goal` (inclusive).
    ///
    /// Returns an empty route when `start == goal` and also when no route
    /// exists; use [`PathFinder::distance`] to tell the two apart.
    pub fn shortest_path(&mut self, maze: &Maze, start: TileCoord, goal: TileCoord) -> Route {
        if start == goal || !maze.contains(start) {
            return Route::empty();
        }

        let goal_walkable = maze.tile_kind(goal).is_some_and(|kind| kind.is_walkable());
        if !goal_walkable {
            return Route::empty();
        }

        self.prepare(maze);
        let Some(start_index) = maze.index(start) else {
            return Route::empty();
        };
        self.came_from[start_index] = Some(start);
        self.frontier.push_back(start);

        while let Some(cell) = self.frontier.pop_front() {
            for direction in Direction::ALL {
                let Some(neighbor) = cell.step(direction) else {
                    continue;
                };
                let Some(neighbor_index) = maze.index(neighbor) else {
                    continue;
                };
                if self.came_from[neighbor_index].is_some() {
                    continue;
                }

                if neighbor == goal {
                    self.came_from[neighbor_index] = Some(cell);
                    return self.reconstruct(maze, start, goal);
                }

                let routable = maze
                    .tile_kind(neighbor)
                    .is_some_and(|kind| kind.is_routable());
                if !routable {
                    continue;
                }

                self.came_from[neighbor_index] = Some(cell);
                self.frontier.push_back(neighbor);
            }
        }

        tracing::trace!(?start, ?goal, "no route");
        Route::empty()
    }

    /// Hop count of the shortest route, or `None` when the goal is unreachable.
    pub fn distance(&mut self, maze: &Maze, start: TileCoord, goal: TileCoord) -> Option<usize> {
        if start == goal {
            return maze.contains(start).then_some(0);
        }

        let route = self.shortest_path(maze, start, goal);
        if route.is_empty() {
            None
        } else {
            Some(route.len())
        }
    }

    fn prepare(&mut self, maze: &Maze) {
        let cell_count = maze.cell_count();
        if self.came_from.len() != cell_count {
            self.came_from = vec![None; cell_count];
        } else {
            self.came_from.fill(None);
        }
        self.frontier.clear();
    }

    fn reconstruct(&self, maze: &Maze, start: TileCoord, goal: TileCoord) -> Route {
        let mut tiles = Vec::new();
        let mut current = goal;
        while current != start {
            tiles.push(current);
            let Some(previous) = maze
                .index(current)
                .and_then(|index| self.came_from.get(index).copied().flatten())
            else {
                return Route::empty();
            };
            current = previous;
        }
        tiles.reverse();
        Route::from_tiles(tiles)
    }
}

/// Convenience wrapper that runs a single query with fresh buffers.
#[must_use]
pub fn shortest_path(maze: &Maze, start: TileCoord, goal: TileCoord) -> Route {
    PathFinder::new().shortest_path(maze, start, goal)
}
