//! Corridor walker that follows a passage until it reaches the next node.

use pacpilot_core::{Direction, Edge, TileCoord};

use crate::{query, Maze};

/// Follows the corridor leaving `tile` in `direction` up to the next node.
///
/// The returned edge excludes `tile` and ends with the first intersection or
/// dead end met on the way. Corners bend the walk onto their open
/// perpendicular. The edge is empty when the first step is blocked or when
/// the corridor loops without ever meeting a node.
#[must_use]
pub fn walk(maze: &Maze, tile: TileCoord, direction: Direction) -> Edge {
    let budget = maze.cell_count();
    let mut tiles = Vec::new();
    let mut heading = direction;
    let mut next = query::walkable_neighbor(maze, tile, heading);

    while let Some(current) = next {
        if tiles.len() >= budget {
            tracing::trace!(?tile, ?direction, "corridor loops without a node");
            return Edge::empty();
        }

        tiles.push(current);
        if query::is_node(maze, current) {
            return Edge::from_tiles(tiles);
        }

        if let Some(turn) = query::corner_turn(maze, current, heading) {
            heading = turn;
        }
        next = query::walkable_neighbor(maze, current, heading);
    }

    Edge::empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOOK: &str = "\
#######
#     #
# #####
# #####
#######";

    #[test]
    fn blocked_first_step_yields_empty_edge() {
        let maze = Maze::from_ascii(HOOK).expect("maze parses");
        assert!(walk(&maze, TileCoord::new(1, 3), Direction::Down).is_empty());
        assert!(walk(&maze, TileCoord::new(1, 3), Direction::Left).is_empty());
    }

    #[test]
    fn turns_at_corners_and_stops_at_dead_end() {
        let maze = Maze::from_ascii(HOOK).expect("maze parses");
        let edge = walk(&maze, TileCoord::new(1, 3), Direction::Up);
        let expected: Vec<TileCoord> = [(1, 2), (1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]
            .into_iter()
            .map(|(column, row)| TileCoord::new(column, row))
            .collect();
        assert_eq!(edge.tiles(), expected.as_slice());
    }

    #[test]
    fn stops_at_first_intersection() {
        let maze = Maze::from_ascii(
            "\
#######
#     #
### ###
### ###
#######",
        )
        .expect("maze parses");
        let edge = walk(&maze, TileCoord::new(1, 1), Direction::Right);
        assert_eq!(
            edge.tiles(),
            &[TileCoord::new(2, 1), TileCoord::new(3, 1)]
        );
    }

    #[test]
    fn node_free_loop_yields_empty_edge() {
        let maze = Maze::from_ascii(
            "\
#####
#   #
# # #
#   #
#####",
        )
        .expect("maze parses");
        assert!(walk(&maze, TileCoord::new(1, 1), Direction::Right).is_empty());
        assert!(walk(&maze, TileCoord::new(2, 1), Direction::Right).is_empty());
    }

    #[test]
    fn starting_mid_corridor_reaches_the_end() {
        let maze = Maze::from_ascii("#######\n#     #\n#######").expect("maze parses");
        let edge = walk(&maze, TileCoord::new(3, 1), Direction::Left);
        assert_eq!(edge.tiles(), &[TileCoord::new(2, 1), TileCoord::new(1, 1)]);
        assert_eq!(edge.last(), Some(TileCoord::new(1, 1)));
    }
}
