use std::collections::BTreeSet;

use rayon::prelude::*;

use super::unfiltered::vamana_local;
use crate::candidate::candidate;
use crate::error::{VamanaError, VamanaResult};
use crate::graph::DirectedGraph;
use crate::prune::filtered_robust_prune;
use crate::store::VectorStore;

/// Construction parameters for Stitched-Vamana (C7).
#[derive(Debug, Clone, Copy)]
pub struct StitchedBuildParams {
    pub alpha: f32,
    pub l_small: usize,
    pub r_small: usize,
    pub r_stitched: usize,
}

impl StitchedBuildParams {
    fn validate(&self, n: u32) -> VamanaResult<()> {
        if n == 0 {
            return Err(VamanaError::Shape("store has no base vectors".into()));
        }
        if self.alpha < 1.0 {
            return Err(VamanaError::Shape("alpha must be >= 1".into()));
        }
        if self.r_small == 0 || self.r_stitched == 0 {
            return Err(VamanaError::Shape("R must be positive".into()));
        }
        if self.l_small == 0 {
            return Err(VamanaError::Shape("L must be positive".into()));
        }
        Ok(())
    }
}

/// Builds one per-filter subgraph via the unfiltered Vamana (each filter's
/// subgraph is independent, so this runs in parallel), unions them into a
/// single graph, then reprunes every vertex with the filtered predicate and
/// the global out-degree cap.
pub fn build_stitched(
    store: &VectorStore,
    params: &StitchedBuildParams,
    rng_seed: u64,
) -> VamanaResult<DirectedGraph> {
    let n = store.size();
    params.validate(n)?;

    let mut graph = DirectedGraph::new(n);

    let labels: Vec<f32> = store.filter_labels().collect();
    let subgraphs: Vec<(Vec<u32>, DirectedGraph)> = labels
        .par_iter()
        .enumerate()
        .map(|(i, &label)| -> VamanaResult<Option<(Vec<u32>, DirectedGraph)>> {
            let Some(members_set) = store.filter_indices(label) else {
                return Ok(None);
            };
            // Filters with a single member cannot host an R>=1 subgraph and
            // contribute nothing to stitch.
            if members_set.len() < 2 {
                return Ok(None);
            }
            let members: Vec<u32> = members_set.iter().copied().collect();

            use rand::SeedableRng;
            let mut local_rng = rand::rngs::StdRng::seed_from_u64(rng_seed ^ i as u64);
            let g = vamana_local(
                store,
                &members,
                params.alpha,
                params.l_small,
                params.r_small,
                &mut local_rng,
            )?;
            Ok(Some((members, g)))
        })
        .collect::<VamanaResult<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    for (members, subgraph) in &subgraphs {
        graph.stitch(subgraph, members)?;
    }

    for v in 0..n {
        let pool: BTreeSet<_> = graph
            .neighbors(v)?
            .iter()
            .map(|&w| candidate(store.distance(v, w), w))
            .collect();
        filtered_robust_prune(&mut graph, store, v, pool, params.alpha, params.r_stitched)?;
    }

    Ok(graph)
}
