use ordered_float::OrderedFloat;

/// A beam/pool entry: (squared distance to the query, vertex). Ordered
/// lexicographically so ties on distance break deterministically on vertex
/// index, matching the search and prune invariants.
pub type Candidate = (OrderedFloat<f32>, u32);

pub fn candidate(dist: f32, vertex: u32) -> Candidate {
    (OrderedFloat(dist), vertex)
}
