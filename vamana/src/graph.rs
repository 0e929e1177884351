use hashbrown::HashSet;

use crate::error::{VamanaError, VamanaResult};

/// Directed proximity graph over vertices `0..N`, each owning a set of
/// out-neighbors. Index-addressed rather than pointer-addressed: the graph
/// owns only adjacency, the vector store owns the data.
#[derive(Debug, Clone)]
pub struct DirectedGraph {
    neighbors: Vec<HashSet<u32>>,
}

impl DirectedGraph {
    pub fn new(num_vertices: u32) -> Self {
        DirectedGraph {
            neighbors: (0..num_vertices).map(|_| HashSet::new()).collect(),
        }
    }

    pub fn size(&self) -> u32 {
        self.neighbors.len() as u32
    }

    fn check_vertex(&self, v: u32) -> VamanaResult<()> {
        if v >= self.size() {
            return Err(VamanaError::InvalidVertex(v));
        }
        Ok(())
    }

    /// Insert edge (source -> destination). Idempotent: inserting an edge
    /// that already exists is not an error.
    pub fn insert(&mut self, source: u32, destination: u32) -> VamanaResult<()> {
        self.check_vertex(source)?;
        self.check_vertex(destination)?;
        if source == destination {
            return Err(VamanaError::SelfLoop(source));
        }
        self.neighbors[source as usize].insert(destination);
        Ok(())
    }

    /// Remove edge (source -> destination) if present, returning whether it
    /// existed.
    pub fn remove(&mut self, source: u32, destination: u32) -> VamanaResult<bool> {
        self.check_vertex(source)?;
        self.check_vertex(destination)?;
        if source == destination {
            return Err(VamanaError::SelfLoop(source));
        }
        Ok(self.neighbors[source as usize].remove(&destination))
    }

    pub fn neighbors(&self, v: u32) -> VamanaResult<&HashSet<u32>> {
        self.check_vertex(v)?;
        Ok(&self.neighbors[v as usize])
    }

    /// Replace the out-neighbor set of `v` wholesale. Used by robust-prune,
    /// which always rebuilds `out(p)` from scratch.
    pub fn set_neighbors(&mut self, v: u32, neighbors: HashSet<u32>) -> VamanaResult<()> {
        self.check_vertex(v)?;
        Ok(self.neighbors[v as usize] = neighbors)
    }

    /// Union `other` into `self`, mapping each of `other`'s local vertex
    /// indices `a` through `remap[a]` before inserting. `other`'s local
    /// vertex `i` denotes base vertex `remap[i]`.
    pub fn stitch(&mut self, other: &DirectedGraph, remap: &[u32]) -> VamanaResult<()> {
        for (local_a, remap_a) in remap.iter().enumerate() {
            for local_b in other.neighbors(local_a as u32)? {
                let remap_b = remap[*local_b as usize];
                self.insert(*remap_a, remap_b)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut g = DirectedGraph::new(5);
        g.insert(0, 1).unwrap();
        g.insert(0, 1).unwrap();
        assert_eq!(g.neighbors(0).unwrap().len(), 1);
    }

    #[test]
    fn self_loop_rejected() {
        let mut g = DirectedGraph::new(5);
        assert!(matches!(g.insert(2, 2), Err(VamanaError::SelfLoop(2))));
    }

    #[test]
    fn out_of_bounds_rejected() {
        let mut g = DirectedGraph::new(3);
        assert!(matches!(g.insert(0, 5), Err(VamanaError::InvalidVertex(5))));
    }

    #[test]
    fn remove_reports_existence() {
        let mut g = DirectedGraph::new(3);
        g.insert(0, 1).unwrap();
        assert!(g.remove(0, 1).unwrap());
        assert!(!g.remove(0, 1).unwrap());
    }

    #[test]
    fn stitch_unions_through_remap() {
        let n: u32 = 1000;
        let wrap = |x: i64| -> u32 { x.rem_euclid(n as i64) as u32 };

        let mut g1 = DirectedGraph::new(n);
        let mut g2 = DirectedGraph::new(n);
        for i in 0..n {
            g1.insert(i, wrap(i as i64 + 1)).unwrap();
            g1.insert(i, wrap(i as i64 + 2)).unwrap();
            g2.insert(i, wrap(i as i64 - 1)).unwrap();
            g2.insert(i, wrap(i as i64 - 2)).unwrap();
        }

        let identity: Vec<u32> = (0..n).collect();
        g1.stitch(&g2, &identity).unwrap();

        for i in 0..n {
            let expected: HashSet<u32> = [
                wrap(i as i64 + 1),
                wrap(i as i64 + 2),
                wrap(i as i64 - 1),
                wrap(i as i64 - 2),
            ]
            .into_iter()
            .collect();
            assert_eq!(g1.neighbors(i).unwrap().len(), 4);
            assert_eq!(g1.neighbors(i).unwrap(), &expected);
        }
    }
}
