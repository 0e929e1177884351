//! Filtered and Stitched Vamana: an approximate-nearest-neighbor index over
//! a static, filter-labeled vector collection.
//!
//! The public surface is the three operations a caller needs: build a graph
//! with [`build_filtered`] or [`build_stitched`], then [`search`] it.
//! Everything else (the graph, the store, the medoid map) is exposed so a
//! driver can load data, persist a built graph, and wire its own CLI.

pub mod builder;
pub mod candidate;
pub mod error;
pub mod graph;
pub mod medoid;
pub mod prune;
pub mod search;
pub mod serialize;
pub mod store;
pub mod utils;

pub use builder::{FilteredBuildParams, StitchedBuildParams, build_filtered, build_stitched};
pub use error::{VamanaError, VamanaResult};
pub use graph::DirectedGraph;
pub use medoid::{MedoidMap, find_medoid};
pub use store::{GroundtruthLayout, VectorStore};

use ordered_float::OrderedFloat;

use crate::search::filtered_greedy_search;
use crate::store::NO_FILTER;

/// Search `graph` for the `k` nearest neighbors of vertex `query`, with
/// filter compatibility inferred from the query's own label. A wildcard-
/// labeled query dispatches to every medoid in `medoids` and relies on
/// [`crate::search::filtered_greedy_search`]'s single shared beam to merge
/// their results (equivalent to searching from each medoid separately and
/// merging the top-K of each, at the cost of fewer distance computations).
pub fn search(
    graph: &DirectedGraph,
    store: &VectorStore,
    medoids: &MedoidMap,
    query: u32,
    k: usize,
    l: usize,
) -> VamanaResult<Vec<u32>> {
    let filter = store.filter(query);
    let starts: Vec<u32> = if filter == NO_FILTER {
        medoids.values().copied().collect()
    } else {
        medoids.get(&OrderedFloat(filter)).copied().into_iter().collect()
    };

    if starts.is_empty() {
        return Err(VamanaError::NoMedoid(filter));
    }

    let result = filtered_greedy_search(graph, store, &starts, query, k, l, None)?;
    Ok(result.top_k)
}
