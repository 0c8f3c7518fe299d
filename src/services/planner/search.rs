use super::graph::{GraphContext, NodeId};
use super::neighbors::Edge;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What the solvers need from a graph.
pub trait RoutingGraph {
    fn node_count(&self) -> usize;

    fn neighbors(&self, node: NodeId) -> Vec<Edge>;

    /// Straight-line distance between two nodes, in edge-weight units
    fn straight_line_m(&self, a: NodeId, b: NodeId) -> f64;

    /// Lower bound on `weight / straight_line_m` over all edges
    fn heuristic_scale(&self) -> f64 {
        1.0
    }
}

impl RoutingGraph for GraphContext<'_> {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn neighbors(&self, node: NodeId) -> Vec<Edge> {
        self.valid_neighbors(node)
    }

    fn straight_line_m(&self, a: NodeId, b: NodeId) -> f64 {
        self.nodes[a].coordinates.distance_m(&self.nodes[b].coordinates)
    }

    fn heuristic_scale(&self) -> f64 {
        self.config.min_weight_multiplier()
    }
}

#[derive(Copy, Clone, Debug)]
struct State {
    cost: f64,
    node: NodeId,
}

// Min-heap by cost, then by node index so equal costs pop in a stable order
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Shortest path by Dijkstra. Empty when `goal` is unreachable.
pub fn dijkstra<G: RoutingGraph + ?Sized>(graph: &G, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    shortest_path(graph, start, goal, 0.0)
}

/// Shortest path by A* with a straight-line heuristic scaled to stay admissible.
pub fn astar<G: RoutingGraph + ?Sized>(graph: &G, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    shortest_path(graph, start, goal, graph.heuristic_scale())
}

fn shortest_path<G: RoutingGraph + ?Sized>(
    graph: &G,
    start: NodeId,
    goal: NodeId,
    heuristic_scale: f64,
) -> Vec<NodeId> {
    let n = graph.node_count();
    if start >= n || goal >= n {
        return Vec::new();
    }

    let heuristic = |node: NodeId| {
        if heuristic_scale > 0.0 {
            graph.straight_line_m(node, goal) * heuristic_scale
        } else {
            0.0
        }
    };

    let mut best = vec![f64::INFINITY; n];
    let mut previous: Vec<Option<NodeId>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    best[start] = 0.0;
    heap.push(State {
        cost: heuristic(start),
        node: start,
    });

    while let Some(State { node, .. }) = heap.pop() {
        if settled[node] {
            continue;
        }
        if node == goal {
            break;
        }
        settled[node] = true;

        for edge in graph.neighbors(node) {
            if settled[edge.to] {
                continue;
            }
            let candidate = best[node] + edge.weight;
            if candidate < best[edge.to] {
                best[edge.to] = candidate;
                previous[edge.to] = Some(node);
                heap.push(State {
                    cost: candidate + heuristic(edge.to),
                    node: edge.to,
                });
            }
        }
    }

    if best[goal].is_infinite() {
        return Vec::new();
    }
    reconstruct_path(&previous, start, goal)
}

/// Walk predecessors back from `goal`; reject a chain that does not end at `start`.
fn reconstruct_path(previous: &[Option<NodeId>], start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = previous[current] {
        path.push(prev);
        current = prev;
        if path.len() > previous.len() {
            return Vec::new();
        }
    }
    path.reverse();

    if path.first() != Some(&start) {
        return Vec::new();
    }
    path
}
