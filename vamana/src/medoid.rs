use std::collections::HashMap;

use ordered_float::OrderedFloat;
use rand::Rng;

use crate::store::{NO_FILTER, VectorStore};

/// `M: label -> vertex`, a representative start vertex per filter chosen by
/// a tau-sample heuristic. The wildcard label is never placed here:
/// unfiltered queries consult every medoid at search time instead.
pub type MedoidMap = HashMap<OrderedFloat<f32>, u32>;

/// For each filter label with index set `Pf`, sample up to `tau` indices
/// from `Pf` without replacement and pick the medoid uniformly among the
/// sample. Approximates the true medoid (O(|Pf|^2) to compute exactly) at a
/// cost capped by `tau`.
pub fn find_medoid(store: &VectorStore, tau: usize, rng: &mut impl Rng) -> MedoidMap {
    let mut medoids = MedoidMap::new();

    for label in store.filter_labels() {
        if label == NO_FILTER {
            continue;
        }
        let Some(members) = store.filter_indices(label) else {
            continue;
        };
        let mut pool: Vec<u32> = members.iter().copied().collect();
        let n = tau.min(pool.len());

        let mut sample = Vec::with_capacity(n);
        for _ in 0..n {
            let i = rng.random_range(0..pool.len());
            sample.push(pool.swap_remove(i));
        }

        let chosen = sample[rng.random_range(0..n)];
        medoids.insert(OrderedFloat(label), chosen);
    }

    medoids
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
            buf.extend(((i % 2) as f32).to_le_bytes());
            buf.extend(0.0f32.to_le_bytes());
            buf.extend((i as f32).to_le_bytes());
            buf.extend((i as f32).to_le_bytes());
            buf.extend((i as f32).to_le_bytes());
        }
        VectorStore::load(std::io::Cursor::new(buf), 3, n, 0).unwrap()
    }

    #[test]
    fn medoid_respects_filter_partition() {
        let store = synthetic_store(50);
        let mut rng = StdRng::seed_from_u64(7);
        let medoids = find_medoid(&store, 17, &mut rng);

        assert_eq!(medoids.len(), 2);
        let even = medoids[&OrderedFloat(0.0)];
        let odd = medoids[&OrderedFloat(1.0)];
        assert_eq!(even % 2, 0);
        assert_eq!(odd % 2, 1);
        assert!(even < 50);
        assert!(odd < 50);
    }
}
