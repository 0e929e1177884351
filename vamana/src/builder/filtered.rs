use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use rand::Rng;
use rand::seq::SliceRandom;

use super::random_graph::random_regular_graph;
use crate::candidate::candidate;
use crate::error::{VamanaError, VamanaResult};
use crate::graph::DirectedGraph;
use crate::medoid::{MedoidMap, find_medoid};
use crate::prune::filtered_robust_prune;
use crate::search::filtered_greedy_search;
use crate::store::VectorStore;

/// Construction parameters for Filtered-Vamana (C6). Validated once, at the
/// entry point of [`build_filtered`].
#[derive(Debug, Clone, Copy)]
pub struct FilteredBuildParams {
    pub alpha: f32,
    pub l: usize,
    pub r: usize,
    pub tau: usize,
    pub random_init_graph: bool,
}

impl FilteredBuildParams {
    fn validate(&self, n: u32) -> VamanaResult<()> {
        if n == 0 {
            return Err(VamanaError::Shape("store has no base vectors".into()));
        }
        if self.alpha < 1.0 {
            return Err(VamanaError::Shape("alpha must be >= 1".into()));
        }
        if self.r == 0 {
            return Err(VamanaError::Shape("R must be positive".into()));
        }
        if self.l == 0 {
            return Err(VamanaError::Shape("L must be positive".into()));
        }
        if self.tau == 0 {
            return Err(VamanaError::Shape("tau must be positive".into()));
        }
        Ok(())
    }
}

/// Iterative construction that runs filtered greedy search and filtered
/// robust-prune over a random permutation of vertices.
pub fn build_filtered(
    store: &VectorStore,
    params: &FilteredBuildParams,
    rng: &mut impl Rng,
) -> VamanaResult<DirectedGraph> {
    let n = store.size();
    params.validate(n)?;

    let medoids: MedoidMap = find_medoid(store, params.tau, rng);

    let mut graph = if params.random_init_graph {
        let r_eff = params.r.min(n.saturating_sub(1) as usize).max(1) as u32;
        random_regular_graph(n, r_eff, rng)?
    } else {
        DirectedGraph::new(n)
    };

    let mut sigma: Vec<u32> = (0..n).collect();
    sigma.shuffle(rng);

    for &x in &sigma {
        let f = store.filter(x);
        // A vertex itself carrying the wildcard label has no medoid entry;
        // seed the search from itself instead of skipping it outright.
        let start = medoids.get(&OrderedFloat(f)).copied().unwrap_or(x);

        let result = filtered_greedy_search(&graph, store, &[start], x, 0, params.l, None)?;
        filtered_robust_prune(&mut graph, store, x, result.pool, params.alpha, params.r)?;

        let out_x: Vec<u32> = graph.neighbors(x)?.iter().copied().collect();
        for j in out_x {
            graph.insert(j, x)?;
            if graph.neighbors(j)?.len() > params.r {
                let pool: BTreeSet<_> = graph
                    .neighbors(j)?
                    .iter()
                    .map(|&w| candidate(store.distance(j, w), w))
                    .collect();
                filtered_robust_prune(&mut graph, store, j, pool, params.alpha, params.r)?;
            }
        }
    }

    Ok(graph)
}
