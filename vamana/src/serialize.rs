use std::io::{Read, Write};

use crate::error::VamanaResult;
use crate::graph::DirectedGraph;

/// Writes the graph as: little-endian `N:int32`, then per vertex
/// `k_v:int32` followed by `k_v` int32 neighbor indices. Hand-rolled rather
/// than a generic serde format, since the wire layout is an exact contract
/// with the benchmark toolchain's own reader.
pub fn write_graph(graph: &DirectedGraph, mut sink: impl Write) -> VamanaResult<()> {
    sink.write_all(&graph.size().to_le_bytes())?;
    for v in 0..graph.size() {
        let neighbors = graph.neighbors(v)?;
        sink.write_all(&(neighbors.len() as u32).to_le_bytes())?;
        for &w in neighbors {
            sink.write_all(&w.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Reads a graph written by [`write_graph`]. Reconstructs purely via
/// `insert` calls, so every graph invariant (no self-loops, no out-of-range
/// vertices) is re-enforced on load rather than trusted from the file.
pub fn read_graph(mut source: impl Read) -> VamanaResult<DirectedGraph> {
    let n = read_u32(&mut source)?;
    let mut graph = DirectedGraph::new(n);
    for v in 0..n {
        let k_v = read_u32(&mut source)?;
        for _ in 0..k_v {
            let neighbor = read_u32(&mut source)?;
            graph.insert(v, neighbor)?;
        }
    }
    Ok(graph)
}

fn read_u32(mut source: impl Read) -> VamanaResult<u32> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
