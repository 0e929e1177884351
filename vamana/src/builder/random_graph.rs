use rand::Rng;

use crate::error::{VamanaError, VamanaResult};
use crate::graph::DirectedGraph;

/// A directed graph on `n` vertices where every vertex has exactly `r`
/// distinct out-neighbors chosen uniformly without replacement, never
/// including itself. An optional starting point for Filtered-Vamana: some
/// configurations converge faster than from the empty graph.
pub fn random_regular_graph(n: u32, r: u32, rng: &mut impl Rng) -> VamanaResult<DirectedGraph> {
    if r == 0 {
        return Err(VamanaError::Shape("R must be positive".into()));
    }
    if n == 0 || r > n - 1 {
        return Err(VamanaError::Shape(format!(
            "cannot pick {r} distinct out-neighbors for {n} vertices"
        )));
    }

    let mut graph = DirectedGraph::new(n);
    for i in 0..n {
        let mut candidates: Vec<u32> = (0..n).filter(|&v| v != i).collect();
        for _ in 0..r {
            let pick = rng.random_range(0..candidates.len());
            let picked = candidates.swap_remove(pick);
            graph.insert(i, picked)?;
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn every_vertex_gets_exactly_r_distinct_out_neighbors() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = random_regular_graph(50, 5, &mut rng).unwrap();
        for v in 0..50 {
            let neighbors = graph.neighbors(v).unwrap();
            assert_eq!(neighbors.len(), 5);
            assert!(!neighbors.contains(&v));
        }
    }

    #[test]
    fn rejects_impossible_degree() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_regular_graph(3, 3, &mut rng).is_err());
    }
}
