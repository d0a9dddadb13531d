#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable waypoint graph describing every route monsters may take.
//!
//! A [`PathGraph`] is built once when a level loads and never changes
//! afterwards. Spawn and exit nodes are derived from the edge set on demand.
//! Each spawn resolves its own random route through the graph into an owned
//! [`Path`] so branching maps produce independent routes per monster.

use std::collections::HashMap;

use rand::Rng;
use waypoint_defence_core::{ConfigurationError, GridCoord, NodeId, Position};

/// A single waypoint with its ordered outgoing edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    coord: GridCoord,
    successors: Vec<NodeId>,
}

impl Node {
    /// Creates a node located at `coord` leading to the listed successors.
    #[must_use]
    pub fn new(id: NodeId, coord: GridCoord, successors: Vec<NodeId>) -> Self {
        Self {
            id,
            coord,
            successors,
        }
    }

    /// Identifier of the node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Logical position of the node.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::from(self.coord)
    }

    /// Outgoing edges in declaration order.
    #[must_use]
    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    /// Reports whether the node has no outgoing edge.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.successors.is_empty()
    }
}

/// Immutable directed graph of waypoints for one level.
#[derive(Clone, Debug)]
pub struct PathGraph {
    nodes: Vec<Node>,
    links: Vec<Vec<usize>>,
    lookup: HashMap<NodeId, usize>,
}

impl PathGraph {
    /// Builds a graph from the provided nodes, resolving every successor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyGraph`] without nodes,
    /// [`ConfigurationError::DuplicateNode`] when an identifier repeats,
    /// [`ConfigurationError::UnresolvedNode`] when a successor is missing and
    /// [`ConfigurationError::CyclicGraph`] when a node can reach itself.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, ConfigurationError> {
        if nodes.is_empty() {
            return Err(ConfigurationError::EmptyGraph);
        }

        let mut lookup = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if lookup.insert(node.id, index).is_some() {
                return Err(ConfigurationError::DuplicateNode(node.id));
            }
        }

        let mut links = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let mut resolved = Vec::with_capacity(node.successors.len());
            for successor in &node.successors {
                let Some(&target) = lookup.get(successor) else {
                    return Err(ConfigurationError::UnresolvedNode {
                        node: node.id,
                        successor: *successor,
                    });
                };
                resolved.push(target);
            }
            links.push(resolved);
        }

        if let Some(index) = find_cycle(&links) {
            return Err(ConfigurationError::CyclicGraph(nodes[index].id));
        }

        Ok(Self {
            nodes,
            links,
            lookup,
        })
    }

    /// Converts a flat ordered path into a linear graph.
    ///
    /// Node identifiers follow the list index, each node leading to the next.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyGraph`] for an empty list.
    pub fn linear(points: &[GridCoord]) -> Result<Self, ConfigurationError> {
        let count = u32::try_from(points.len()).map_err(|_| ConfigurationError::InvalidValue {
            subject: "path".to_owned(),
            field: "length",
            reason: "too many waypoints",
        })?;

        let nodes = points
            .iter()
            .zip(0..count)
            .map(|(coord, index)| {
                let successors = if index + 1 < count {
                    vec![NodeId::new(index + 1)]
                } else {
                    Vec::new()
                };
                Node::new(NodeId::new(index), *coord, successors)
            })
            .collect();

        Self::from_nodes(nodes)
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the graph holds no nodes. Never true for a built graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.lookup.get(&id).map(|&index| &self.nodes[index])
    }

    /// Nodes without an incoming edge, in declaration order.
    #[must_use]
    pub fn spawns(&self) -> Vec<&Node> {
        let mut referenced = vec![false; self.nodes.len()];
        for targets in &self.links {
            for &target in targets {
                referenced[target] = true;
            }
        }

        self.nodes
            .iter()
            .zip(referenced)
            .filter_map(|(node, referenced)| (!referenced).then_some(node))
            .collect()
    }

    /// Nodes without an outgoing edge, in declaration order.
    #[must_use]
    pub fn ends(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|node| node.is_exit()).collect()
    }

    /// Resolves one random route starting at `start`.
    ///
    /// At every node one successor is chosen uniformly at random until a node
    /// without successors is reached. The graph is acyclic, so every walk
    /// ends on an exit after at most [`PathGraph::len`] waypoints. Returns
    /// `None` when `start` is not part of the graph.
    pub fn path_from<R>(&self, start: NodeId, rng: &mut R) -> Option<Path>
    where
        R: Rng + ?Sized,
    {
        let mut current = *self.lookup.get(&start)?;
        let mut waypoints = vec![self.nodes[current].position()];

        loop {
            let successors = &self.links[current];
            if successors.is_empty() {
                break;
            }

            current = successors[rng.gen_range(0..successors.len())];
            waypoints.push(self.nodes[current].position());
        }

        Some(Path::new(waypoints))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    Active,
    Done,
}

/// Depth-first search over resolved links. Returns the index of a node that
/// is revisited while still on the search stack.
fn find_cycle(links: &[Vec<usize>]) -> Option<usize> {
    let mut state = vec![Visit::Unseen; links.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..links.len() {
        if state[root] != Visit::Unseen {
            continue;
        }
        state[root] = Visit::Active;
        stack.push((root, 0));

        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            let Some(&successor) = links[node].get(*next) else {
                state[node] = Visit::Done;
                let _ = stack.pop();
                continue;
            };
            *next += 1;

            match state[successor] {
                Visit::Active => return Some(successor),
                Visit::Unseen => {
                    state[successor] = Visit::Active;
                    stack.push((successor, 0));
                }
                Visit::Done => {}
            }
        }
    }
    None
}

/// Finite route resolved at spawn time and frozen onto a monster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Position>,
}

impl Path {
    /// Wraps an ordered list of waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<Position>) -> Self {
        Self { waypoints }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Waypoint at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Position> {
        self.waypoints.get(index).copied()
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the route holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Summed length of the segments from waypoint `from` to the end.
    #[must_use]
    pub fn length_from(&self, from: usize) -> f32 {
        self.waypoints
            .get(from..)
            .unwrap_or_default()
            .windows(2)
            .map(|segment| segment[0].distance(segment[1]))
            .sum()
    }
}

impl From<Vec<Position>> for Path {
    fn from(waypoints: Vec<Position>) -> Self {
        Self::new(waypoints)
    }
}
