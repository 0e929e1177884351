use std::collections::BTreeSet;

use hashbrown::HashSet;
use rand::Rng;
use rand::seq::SliceRandom;

use super::random_graph::random_regular_graph;
use crate::candidate::{Candidate, candidate};
use crate::error::VamanaResult;
use crate::graph::DirectedGraph;
use crate::store::VectorStore;

/// `members[i]` is the global store index of local vertex `i`. All graph
/// operations here address local vertices; all store lookups go through
/// this map.
fn local_distance(store: &VectorStore, members: &[u32], local_a: u32, local_b: u32) -> f32 {
    store.distance(members[local_a as usize], members[local_b as usize])
}

/// Brute-force medoid of `members` (O(|members|^2)): the member minimizing
/// total distance to every other member. Returns a *local* index.
pub fn brute_force_medoid(store: &VectorStore, members: &[u32]) -> u32 {
    let mut best_local = 0u32;
    let mut best_sum = f32::MAX;
    for (i, &global_i) in members.iter().enumerate() {
        let mut sum = 0.0f32;
        for (j, &global_j) in members.iter().enumerate() {
            if i == j {
                continue;
            }
            sum += store.distance(global_i, global_j);
        }
        if sum < best_sum {
            best_sum = sum;
            best_local = i as u32;
        }
    }
    best_local
}

fn greedy_search_local(
    graph: &DirectedGraph,
    store: &VectorStore,
    members: &[u32],
    start: u32,
    query: u32,
    k: usize,
    l: usize,
) -> VamanaResult<(Vec<u32>, BTreeSet<Candidate>)> {
    let mut visited = vec![false; members.len()];
    let mut beam: BTreeSet<Candidate> = BTreeSet::new();
    beam.insert(candidate(local_distance(store, members, query, start), start));

    loop {
        let Some(&(_, p_star)) = beam.iter().find(|(_, v)| !visited[*v as usize]) else {
            break;
        };
        visited[p_star as usize] = true;

        for &neighbor in graph.neighbors(p_star)? {
            vector::prefetch_vector(store.get(members[neighbor as usize]));
            if !visited[neighbor as usize] {
                beam.insert(candidate(local_distance(store, members, query, neighbor), neighbor));
            }
        }

        while beam.len() > l {
            let last = *beam.iter().next_back().unwrap();
            beam.remove(&last);
        }
    }

    let top_k = beam.iter().take(k).map(|(_, v)| *v).collect();
    for (v, was_visited) in visited.iter().enumerate() {
        if *was_visited {
            let v = v as u32;
            beam.insert(candidate(local_distance(store, members, query, v), v));
        }
    }
    Ok((top_k, beam))
}

/// Robust-prune without the filter predicate: every member is eligible,
/// matching the unfiltered variant spec §4.5 describes ("identical but omit
/// step 3c").
fn robust_prune_local(
    graph: &mut DirectedGraph,
    store: &VectorStore,
    members: &[u32],
    p: u32,
    pool: impl IntoIterator<Item = Candidate>,
    alpha: f32,
    r: usize,
) -> VamanaResult<()> {
    let mut v: BTreeSet<Candidate> = pool.into_iter().collect();

    let current_out: Vec<u32> = graph.neighbors(p)?.iter().copied().collect();
    for &nb in &current_out {
        v.insert(candidate(local_distance(store, members, p, nb), nb));
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
                alpha * local_distance(store, members, p_star, p_prime) <= d_p_prime.0
            })
            .copied()
            .collect();
        for dropped in to_drop {
            v.remove(&dropped);
        }
    }

    Ok(())
}

/// Unfiltered Vamana over an arbitrary subset of the store, addressed
/// through `members` (local index `i` denotes `members[i]`). Used directly
/// by [`crate::builder::stitched::build_stitched`] once per filter, on the
/// filter's own index set.
pub fn vamana_local(
    store: &VectorStore,
    members: &[u32],
    alpha: f32,
    l: usize,
    r: usize,
    rng: &mut impl Rng,
) -> VamanaResult<DirectedGraph> {
    let n = members.len() as u32;
    let r_eff = r.min(n.saturating_sub(1) as usize).max(1) as u32;

    let mut graph = random_regular_graph(n, r_eff, rng)?;
    let medoid = brute_force_medoid(store, members);

    let mut sigma: Vec<u32> = (0..n).collect();
    sigma.shuffle(rng);

    for &x in &sigma {
        let (_, pool) = greedy_search_local(&graph, store, members, medoid, x, 1, l)?;
        robust_prune_local(&mut graph, store, members, x, pool, alpha, r)?;

        let out_x: Vec<u32> = graph.neighbors(x)?.iter().copied().collect();
        for j in out_x {
            let out_j: HashSet<u32> = graph.neighbors(j)?.clone();
            if out_j.len() + 1 > r {
                let mut pool_j: BTreeSet<Candidate> = out_j
                    .iter()
                    .map(|&w| candidate(local_distance(store, members, j, w), w))
                    .collect();
                pool_j.insert(candidate(local_distance(store, members, j, x), x));
                robust_prune_local(&mut graph, store, members, j, pool_j, alpha, r)?;
            } else {
                graph.insert(j, x)?;
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn synthetic_store(n: u32) -> VectorStore {
        let mut buf = Vec::new();
        buf.extend(n.to_le_bytes());
        for i in 0..n {
            buf.extend(0.0f32.to_le_bytes());
            buf.extend(0.0f32.to_le_bytes());
            for d in 0..4 {
                buf.extend(((i * 4 + d) as f32).to_le_bytes());
            }
        }
        VectorStore::load(std::io::Cursor::new(buf), 4, n, 0).unwrap()
    }

    #[test]
    fn build_respects_out_degree_cap() {
        let store = synthetic_store(60);
        let members: Vec<u32> = (0..60).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let graph = vamana_local(&store, &members, 1.2, 20, 5, &mut rng).unwrap();

        for v in 0..60 {
            let neighbors = graph.neighbors(v).unwrap();
            assert!(neighbors.len() <= 5);
            assert!(!neighbors.contains(&v));
        }
    }
}
