//! Province graph queries backed by `game_pathfinding`.

use crate::state::{NationId, ProvinceId, WorldState};
use game_pathfinding::{Dijkstra, Graph};
use std::collections::HashMap;

/// Province adjacency with straight-line travel cost between neighbours.
pub struct ProvinceGraph;

impl Graph<ProvinceId, WorldState> for ProvinceGraph {
    fn neighbors(&self, node: ProvinceId, state: &WorldState) -> Vec<ProvinceId> {
        state.province(node).neighbors.clone()
    }

    fn cost(&self, from: ProvinceId, to: ProvinceId, state: &WorldState) -> u32 {
        let a = state.province(from);
        let b = state.province(to);
        let dx = (a.x - b.x) as i64;
        let dy = (a.y - b.y) as i64;
        // Every step costs at least 1 so coincident provinces still order by hops
        (isqrt((dx * dx + dy * dy) as u64) as u32).max(1)
    }
}

/// Integer square root (floor) without floats.
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Travel cost from the nation's capital to every reachable province.
///
/// Empty when the nation has no capital.
pub fn distances_from_capital(state: &WorldState, nation: NationId) -> HashMap<ProvinceId, u32> {
    match state.nation(nation).capital {
        Some(capital) => Dijkstra::distances_from(&ProvinceGraph, capital, state),
        None => HashMap::new(),
    }
}

/// Orders provinces by travel cost from the capital; unreachable ones last, ties by handle.
pub fn sort_by_distance(provinces: &mut [ProvinceId], distances: &HashMap<ProvinceId, u32>) {
    provinces.sort_by_key(|p| (distances.get(p).copied().unwrap_or(u32::MAX), *p));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WorldStateBuilder;

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(24), 4);
        assert_eq!(isqrt(25), 5);
        assert_eq!(isqrt(10_000), 100);
    }

    #[test]
    fn test_distance_order() {
        // Chain 0 - 1 - 2, plus an isolated province 3
        let state = WorldStateBuilder::new()
            .nations(1)
            .province(NationId(0))
            .province(NationId(0))
            .province(NationId(0))
            .province(NationId(0))
            .link(ProvinceId(0), ProvinceId(1))
            .link(ProvinceId(1), ProvinceId(2))
            .build();
        let dist = distances_from_capital(&state, NationId(0));
        assert_eq!(dist[&ProvinceId(0)], 0);
        assert!(dist[&ProvinceId(1)] < dist[&ProvinceId(2)]);

        let mut provinces = vec![ProvinceId(3), ProvinceId(2), ProvinceId(0), ProvinceId(1)];
        sort_by_distance(&mut provinces, &dist);
        assert_eq!(
            provinces,
            vec![ProvinceId(0), ProvinceId(1), ProvinceId(2), ProvinceId(3)]
        );
    }
}
