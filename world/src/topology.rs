//! Condensed graph of intersections and dead ends built once per level.

use std::collections::HashMap;

use pacpilot_core::{Direction, Edge, TileCoord};

use crate::{corridor, query, Maze};

/// Graph whose vertices are the maze's nodes and whose edges are the
/// corridors joining neighbouring nodes.
///
/// Each node maps the terminal node of every corridor leaving it to the
/// corridor's tiles. When two corridors from the same node end at the same
/// terminal, the shorter one is retained, ties keeping the corridor found
/// first in [`Direction::ALL`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopologyGraph {
    nodes: HashMap<TileCoord, HashMap<TileCoord, Edge>>,
}

impl TopologyGraph {
    /// Scans the maze and walks every corridor leaving every node.
    #[must_use]
    pub fn build(maze: &Maze) -> Self {
        let mut nodes = HashMap::new();

        for tile in maze.coords() {
            if !query::is_node(maze, tile) {
                continue;
            }

            let mut connected: HashMap<TileCoord, Edge> = HashMap::new();
            for direction in Direction::ALL {
                let edge = corridor::walk(maze, tile, direction);
                let Some(terminal) = edge.last() else {
                    continue;
                };

                match connected.get(&terminal) {
                    Some(existing) if existing.len() <= edge.len() => {}
                    _ => {
                        let _ = connected.insert(terminal, edge);
                    }
                }
            }

            let _ = nodes.insert(tile, connected);
        }

        let graph = Self { nodes };
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built topology graph"
        );
        graph
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(HashMap::len).sum()
    }

    /// Reports whether the tile is a node of the graph.
    #[must_use]
    pub fn contains_node(&self, tile: TileCoord) -> bool {
        self.nodes.contains_key(&tile)
    }

    /// Nodes sorted by row, then column.
    #[must_use]
    pub fn nodes(&self) -> Vec<TileCoord> {
        let mut nodes: Vec<TileCoord> = self.nodes.keys().copied().collect();
        nodes.sort_by_key(|tile| (tile.row(), tile.column()));
        nodes
    }

    /// Corridors leaving `node`, keyed by their terminal node.
    #[must_use]
    pub fn edges_from(&self, node: TileCoord) -> Option<&HashMap<TileCoord, Edge>> {
        self.nodes.get(&node)
    }

    /// Corridor from `from` to the neighbouring node `to`, if one exists.
    #[must_use]
    pub fn edge(&self, from: TileCoord, to: TileCoord) -> Option<&Edge> {
        self.nodes.get(&from).and_then(|edges| edges.get(&to))
    }

    /// Neighbouring nodes of `node`, sorted by row, then column.
    #[must_use]
    pub fn neighbors(&self, node: TileCoord) -> Vec<TileCoord> {
        let mut neighbors: Vec<TileCoord> = self
            .nodes
            .get(&node)
            .map(|edges| edges.keys().copied().collect())
            .unwrap_or_default();
        neighbors.sort_by_key(|tile| (tile.row(), tile.column()));
        neighbors
    }
}
