use std::collections::BTreeSet;

use crate::candidate::{Candidate, candidate};
use crate::error::VamanaResult;
use crate::graph::DirectedGraph;
use crate::store::VectorStore;

/// Result of a filtered greedy search: the `K` closest vertices found, and
/// the full candidate pool (visited plus remaining beam) used as the input
/// to robust-prune during construction.
pub struct SearchResult {
    pub top_k: Vec<u32>,
    pub pool: BTreeSet<Candidate>,
}

/// Beam-search the graph from `starts`, restricted to vertices filter-
/// compatible with `query`. Seeds the beam with every start that is
/// filter-compatible with the query (a single call covers both the
/// single-medoid filtered case and the all-medoids unfiltered case).
///
/// `step_limit` caps the number of expansion iterations; `None` runs to
/// exhaustion (every candidate visited).
pub fn filtered_greedy_search(
    graph: &DirectedGraph,
    store: &VectorStore,
    starts: &[u32],
    query: u32,
    k: usize,
    l: usize,
    step_limit: Option<usize>,
) -> VamanaResult<SearchResult> {
    let n = store.len();
    let mut visited = vec![false; n as usize];
    let mut beam: BTreeSet<Candidate> = BTreeSet::new();

    for &start in starts {
        if store.same_filter(query, start) {
            beam.insert(candidate(store.distance(query, start), start));
        }
    }

    let mut steps = 0usize;
    loop {
        if let Some(limit) = step_limit {
            if steps >= limit {
                break;
            }
        }

        let Some(&(_, p_star)) = beam.iter().find(|(_, v)| !visited[*v as usize]) else {
            break;
        };
        visited[p_star as usize] = true;
        steps += 1;

        for &neighbor in graph.neighbors(p_star)? {
            vector::prefetch_vector(store.get(neighbor));
            if !visited[neighbor as usize] && store.same_filter(query, neighbor) {
                beam.insert(candidate(store.distance(query, neighbor), neighbor));
            }
        }

        while beam.len() > l {
            let last = *beam.iter().next_back().unwrap();
            beam.remove(&last);
        }
    }

    let top_k = beam.iter().take(k).map(|(_, v)| *v).collect();

    // Re-add every visited vertex so the returned pool (the construction
    // algorithms' candidate set) includes the full expansion, not just the
    // surviving beam.
    for (v, was_visited) in visited.iter().enumerate() {
        if *was_visited {
            let v = v as u32;
            beam.insert(candidate(store.distance(query, v), v));
        }
    }

    Ok(SearchResult { top_k, pool: beam })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_store(n: u32) -> VectorStore {
        let mut buf = Vec::new();
        buf.extend(n.to_le_bytes());
        for i in 0..n {
            buf.extend(0.0f32.to_le_bytes());
            buf.extend(0.0f32.to_le_bytes());
            for d in 1..=3 {
                buf.extend(((3 * i + d) as f32).to_le_bytes());
            }
        }
        VectorStore::load(std::io::Cursor::new(buf), 3, n, 1).unwrap()
    }

    fn sequential_graph(n: u32) -> DirectedGraph {
        let mut g = DirectedGraph::new(n);
        for i in 0..n.saturating_sub(2) {
            g.insert(i, i + 1).unwrap();
            g.insert(i, i + 2).unwrap();
        }
        g
    }

    #[test]
    fn sequential_graph_search_finds_nearest() {
        let n = 1000;
        let store = sequential_store(n);
        let graph = sequential_graph(n);

        // query q = (3000, 2000, 1000), loaded as the first query record.
        let mut query_buf = Vec::new();
        query_buf.extend(0.0f32.to_le_bytes()); // type: unfiltered
        query_buf.extend(0.0f32.to_le_bytes()); // filter
        query_buf.extend(0.0f32.to_le_bytes()); // timestamp
        query_buf.extend(0.0f32.to_le_bytes()); // timestamp
        for v in [3000.0f32, 2000.0, 1000.0] {
            query_buf.extend(v.to_le_bytes());
        }
        let mut store = store;
        store.read_queries(std::io::Cursor::new(query_buf), 1).unwrap();
        let q = n; // first query index

        let result =
            filtered_greedy_search(&graph, &store, &[0], q, 5, 10, None).unwrap();

        assert_eq!(result.top_k[0], 666);
        let rest: std::collections::HashSet<_> = result.top_k[1..].iter().copied().collect();
        for expected in [664, 668, 662, 670] {
            assert!(rest.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn filtered_search_honors_predicate() {
        let n = 1000;
        let mut buf = Vec::new();
        buf.extend(n.to_le_bytes());
        for i in 0..n {
            buf.extend(((i % 2) as f32).to_le_bytes());
            buf.extend(0.0f32.to_le_bytes());
            for d in 1..=3 {
                buf.extend(((3 * i + d) as f32).to_le_bytes());
            }
        }
        let mut store = VectorStore::load(std::io::Cursor::new(buf), 3, n, 1).unwrap();
        let graph = sequential_graph(n);

        let mut query_buf = Vec::new();
        query_buf.extend(1.0f32.to_le_bytes()); // type: filtered
        query_buf.extend(0.0f32.to_le_bytes()); // filter = 0
        query_buf.extend(0.0f32.to_le_bytes());
        query_buf.extend(0.0f32.to_le_bytes());
        for v in [3000.0f32, 2000.0, 1000.0] {
            query_buf.extend(v.to_le_bytes());
        }
        store.read_queries(std::io::Cursor::new(query_buf), 1).unwrap();
        let q = n;

        let result = filtered_greedy_search(&graph, &store, &[0], q, 5, 10, None).unwrap();
        for v in result.top_k {
            assert_eq!(store.filter(v), 0.0);
        }
    }
}
