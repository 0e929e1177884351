use std::collections::BTreeSet;

use crate::candidate::{Candidate, candidate};
use crate::error::VamanaResult;
use crate::graph::DirectedGraph;
use crate::store::VectorStore;

/// Reselect `out(p)` to at most `r` well-diversified neighbors drawn from
/// `pool`. `alpha >= 1` trades degree for recall; `alpha == 1` is the
/// classical relative-neighborhood-graph rule.
///
/// The filter predicate (retain `p'` in the pool rather than running the
/// alpha-test against it, when `p` and `p'` share a filter that `p*`
/// doesn't) is checked *before* the alpha-test on every iteration; this
/// ordering is load-bearing for recall parity and must not be reordered.
pub fn filtered_robust_prune(
    graph: &mut DirectedGraph,
    store: &VectorStore,
    p: u32,
    pool: impl IntoIterator<Item = Candidate>,
    alpha: f32,
    r: usize,
) -> VamanaResult<()> {
    let mut v: BTreeSet<Candidate> = pool.into_iter().collect();

    let current_out: Vec<u32> = graph.neighbors(p)?.iter().copied().collect();
    for &nb in &current_out {
        v.insert(candidate(store.distance(p, nb), nb));
    }
    v.retain(|&(_, vertex)| vertex != p);

    for nb in current_out {
        graph.remove(p, nb)?;
    }

    let mut out_degree = 0usize;
    while let Some(&p_star_candidate) = v.iter().next() {
        v.remove(&p_star_candidate);
        let p_star = p_star_candidate.1;

        graph.insert(p, p_star)?;
        out_degree += 1;
        if out_degree == r {
            break;
        }

        let mut to_drop = Vec::new();
        for &(d_p_prime, p_prime) in v.iter() {
            if store.same_filter(p_prime, p) && !store.same_filter(p_prime, p_star) {
                continue;
            }
            let d_star_prime = store.distance(p_star, p_prime);
            if alpha * d_star_prime <= d_p_prime.0 {
                to_drop.push((d_p_prime, p_prime));
            }
        }
        for dropped in to_drop {
            v.remove(&dropped);
        }
    }

    Ok(())
}

/// Identical to [`filtered_robust_prune`] but without the filter predicate,
/// for use by the unfiltered builder that feeds [`crate::builder::stitched`].
pub fn robust_prune(
    graph: &mut DirectedGraph,
    store: &VectorStore,
    p: u32,
    pool: impl IntoIterator<Item = Candidate>,
    alpha: f32,
    r: usize,
) -> VamanaResult<()> {
    let mut v: BTreeSet<Candidate> = pool.into_iter().collect();

    let current_out: Vec<u32> = graph.neighbors(p)?.iter().copied().collect();
    for &nb in &current_out {
        v.insert(candidate(store.distance(p, nb), nb));
    }
    v.retain(|&(_, vertex)| vertex != p);

    for nb in current_out {
        graph.remove(p, nb)?;
    }

    let mut out_degree = 0usize;
    while let Some(&p_star_candidate) = v.iter().next() {
        v.remove(&p_star_candidate);
        let p_star = p_star_candidate.1;

        graph.insert(p, p_star)?;
        out_degree += 1;
        if out_degree == r {
            break;
        }

        let to_drop: Vec<Candidate> = v
            .iter()
            .filter(|&&(d_p_prime, p_prime)| {
                alpha * store.distance(p_star, p_prime) <= d_p_prime.0
            })
            .copied()
            .collect();
        for dropped in to_drop {
            v.remove(&dropped);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_store(n: u32) -> VectorStore {
        let mut buf = Vec::new();
        buf.extend(n.to_le_bytes());
        for i in 0..n {
            buf.extend(0.0f32.to_le_bytes());
            buf.extend(0.0f32.to_le_bytes());
            buf.extend((i as f32).to_le_bytes());
            buf.extend((i as f32).to_le_bytes());
            buf.extend((i as f32).to_le_bytes());
        }
        VectorStore::load(std::io::Cursor::new(buf), 3, n, 0).unwrap()
    }

    #[test]
    fn caps_out_degree_and_forbids_self_loops() {
        let n = 20;
        let store = uniform_store(n);
        let mut graph = DirectedGraph::new(n);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    graph.insert(i, j).unwrap();
                }
            }
        }

        for v in 0..n {
            filtered_robust_prune(&mut graph, &store, v, std::iter::empty(), 1.5, 3).unwrap();
        }

        for v in 0..n {
            let neighbors = graph.neighbors(v).unwrap();
            assert!(neighbors.len() <= 3);
            assert!(!neighbors.contains(&v));
        }
    }
}
