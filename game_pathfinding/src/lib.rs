use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// A weighted graph that can be searched.
///
/// `Node`: node identifier (e.g. a province handle).
/// `Ctx`: context passed to cost calculations (e.g. the world state).
pub trait Graph<Node, Ctx> {
    /// Nodes reachable in one step from `node`.
    fn neighbors(&self, node: Node, context: &Ctx) -> Vec<Node>;

    /// Cost of moving from `from` to the adjacent node `to`.
    fn cost(&self, from: Node, to: Node, context: &Ctx) -> u32;
}

/// Single-source shortest travel costs.
pub struct Dijkstra;

impl Dijkstra {
    /// Cost of the cheapest path from `start` to every reachable node.
    ///
    /// Unreachable nodes are absent from the map. `start` maps to 0.
    pub fn distances_from<Node, Ctx, G>(graph: &G, start: Node, context: &Ctx) -> HashMap<Node, u32>
    where
        Node: Copy + Eq + Hash,
        G: Graph<Node, Ctx>,
    {
        Self::search(graph, start, None, context)
    }

    /// Cost of the cheapest path from `start` to `goal`, stopping once it is known.
    pub fn distance<Node, Ctx, G>(graph: &G, start: Node, goal: Node, context: &Ctx) -> Option<u32>
    where
        Node: Copy + Eq + Hash,
        G: Graph<Node, Ctx>,
    {
        Self::search(graph, start, Some(goal), context)
            .get(&goal)
            .copied()
    }

    fn search<Node, Ctx, G>(
        graph: &G,
        start: Node,
        goal: Option<Node>,
        context: &Ctx,
    ) -> HashMap<Node, u32>
    where
        Node: Copy + Eq + Hash,
        G: Graph<Node, Ctx>,
    {
        let mut dist: HashMap<Node, u32> = HashMap::new();
        let mut settled: HashMap<Node, u32> = HashMap::new();
        let mut open = BinaryHeap::new();

        dist.insert(start, 0);
        open.push(Entry {
            node: start,
            cost: 0,
        });

        while let Some(Entry { node, cost }) = open.pop() {
            if settled.contains_key(&node) {
                continue;
            }
            settled.insert(node, cost);
            if goal == Some(node) {
                break;
            }

            for next in graph.neighbors(node, context) {
                if settled.contains_key(&next) {
                    continue;
                }
                let tentative = cost.saturating_add(graph.cost(node, next, context));
                if tentative < *dist.get(&next).unwrap_or(&u32::MAX) {
                    dist.insert(next, tentative);
                    open.push(Entry {
                        node: next,
                        cost: tentative,
                    });
                }
            }
        }

        settled
    }
}

/// Heap entry; reversed ordering turns `BinaryHeap` into a min-heap.
#[derive(Copy, Clone, Eq, PartialEq)]
struct Entry<Node> {
    node: Node,
    cost: u32,
}

impl<Node: Eq> Ord for Entry<Node> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
    }
}

impl<Node: Eq> PartialOrd for Entry<Node> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 1 2
    // 3 4 5
    // 6 7 8
    struct GridGraph;

    impl Graph<u32, ()> for GridGraph {
        fn neighbors(&self, node: u32, _context: &()) -> Vec<u32> {
            let mut n = Vec::new();
            let x = node % 3;
            let y = node / 3;
            if x > 0 {
                n.push(node - 1);
            }
            if x < 2 {
                n.push(node + 1);
            }
            if y > 0 {
                n.push(node - 3);
            }
            if y < 2 {
                n.push(node + 3);
            }
            n
        }

        fn cost(&self, _from: u32, _to: u32, _context: &()) -> u32 {
            1
        }
    }

    #[test]
    fn test_grid_distances() {
        let dist = Dijkstra::distances_from(&GridGraph, 0, &());
        assert_eq!(dist.len(), 9);
        assert_eq!(dist[&0], 0);
        assert_eq!(dist[&4], 2);
        assert_eq!(dist[&8], 4);
    }

    // 0 -> 1 (cost 10), 0 -> 2 (cost 1), 2 -> 1 (cost 1); 3 is isolated
    struct WeightedGraph;

    impl Graph<u32, ()> for WeightedGraph {
        fn neighbors(&self, node: u32, _context: &()) -> Vec<u32> {
            match node {
                0 => vec![1, 2],
                2 => vec![1],
                _ => vec![],
            }
        }

        fn cost(&self, from: u32, to: u32, _context: &()) -> u32 {
            match (from, to) {
                (0, 1) => 10,
                _ => 1,
            }
        }
    }

    #[test]
    fn test_cheaper_detour_wins() {
        assert_eq!(Dijkstra::distance(&WeightedGraph, 0, 1, &()), Some(2));
    }

    #[test]
    fn test_unreachable_is_absent() {
        let dist = Dijkstra::distances_from(&WeightedGraph, 0, &());
        assert!(!dist.contains_key(&3));
        assert_eq!(Dijkstra::distance(&WeightedGraph, 0, 3, &()), None);
    }

    /// Cost depends on the context, not only on the graph.
    struct TollGraph;

    impl Graph<u32, u32> for TollGraph {
        fn neighbors(&self, node: u32, _context: &u32) -> Vec<u32> {
            if node < 3 { vec![node + 1] } else { vec![] }
        }

        fn cost(&self, _from: u32, _to: u32, toll: &u32) -> u32 {
            *toll
        }
    }

    #[test]
    fn test_context_cost() {
        assert_eq!(Dijkstra::distance(&TollGraph, 0, 3, &5), Some(15));
    }
}
