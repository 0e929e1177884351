use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

use hashbrown::HashSet;
use ordered_float::OrderedFloat;

use crate::error::{VamanaError, VamanaResult};

/// Sentinel filter label meaning "matches any filter".
pub const NO_FILTER: f32 = -1.0;

fn read_u32_le(mut reader: impl Read) -> VamanaResult<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32_le(mut reader: impl Read) -> VamanaResult<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn skip(mut reader: impl Read, n: u64) -> VamanaResult<()> {
    let mut sink = std::io::sink();
    std::io::copy(&mut reader.by_ref().take(n), &mut sink)?;
    Ok(())
}

/// Whether a groundtruth file carries a leading `int32 K` record-width
/// header before the fixed-width records, or starts directly with records.
/// The two utilities in a benchmark's toolchain must agree; this is never
/// auto-detected (spec's own warning about silently seeking past a header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundtruthLayout {
    Headerless,
    LeadingCount,
}

/// Owns raw vectors, per-point filter labels, the inverse filter->index map,
/// and the squared-Euclidean distance kernel. Base vectors occupy
/// `[0, base_size)`; queries loaded alongside occupy `[base_size, len)` in
/// the same index space.
pub struct VectorStore {
    dim: usize,
    vectors: Vec<f32>,
    filters: Vec<f32>,
    filters_map: HashMap<OrderedFloat<f32>, HashSet<u32>>,
    base_size: u32,
    capacity: u32,
    len: u32,
}

impl VectorStore {
    /// Ingest `n_base` base vectors from `source`, reserving space for
    /// `n_query` queries in the same index space. Wire format: `u32 N`
    /// (vectors available in the file), then per record `f32 filter`,
    /// `f32 timestamp` (ignored), `dim x f32` values.
    pub fn load(mut source: impl Read, dim: usize, n_base: u32, n_query: u32) -> VamanaResult<Self> {
        if dim == 0 {
            return Err(VamanaError::Shape("dimension must be positive".into()));
        }

        let available = read_u32_le(&mut source)?;
        let base_size = available.min(n_base);
        let capacity = base_size + n_query;

        let mut vectors = vec![0.0f32; capacity as usize * dim];
        let mut filters = vec![0.0f32; capacity as usize];
        let mut filters_map: HashMap<OrderedFloat<f32>, HashSet<u32>> = HashMap::new();

        for i in 0..base_size {
            let filter = read_f32_le(&mut source)?;
            filters[i as usize] = filter;
            filters_map
                .entry(OrderedFloat(filter))
                .or_default()
                .insert(i);

            skip(&mut source, 4)?; // timestamp, ignored

            let row = &mut vectors[i as usize * dim..(i as usize + 1) * dim];
            let mut buf = vec![0u8; dim * 4];
            source.read_exact(&mut buf)?;
            for (slot, chunk) in row.iter_mut().zip(buf.chunks_exact(4)) {
                *slot = f32::from_le_bytes(chunk.try_into().unwrap());
            }
        }

        Ok(VectorStore {
            dim,
            vectors,
            filters,
            filters_map,
            base_size,
            capacity,
            len: base_size,
        })
    }

    /// Append up to `m` query records from `source`. Each record begins with
    /// a `f32 type`: `0` (unfiltered) and `1` (filtered) are read in full;
    /// `>1` marks a timestamp-only record and is skipped whole. Surviving
    /// queries are numbered consecutively from `base_size`.
    pub fn read_queries(&mut self, mut source: impl Read, m: u32) -> VamanaResult<u32> {
        let mut read = 0;
        while read < m && self.len < self.capacity {
            let kind = match read_f32_le(&mut source) {
                Ok(v) => v,
                Err(VamanaError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            };

            if kind > 1.0 {
                // Timestamp-only record: type float + filter + 2 timestamps +
                // dim values, already consumed the type float above.
                skip(&mut source, (self.dim as u64 + 3) * 4)?;
                continue;
            }

            let idx = self.len;
            let filter = read_f32_le(&mut source)?;
            self.filters[idx as usize] = filter;

            skip(&mut source, 2 * 4)?; // two timestamp floats, ignored

            let row_start = idx as usize * self.dim;
            let mut buf = vec![0u8; self.dim * 4];
            source.read_exact(&mut buf)?;
            for (slot, chunk) in self.vectors[row_start..row_start + self.dim]
                .iter_mut()
                .zip(buf.chunks_exact(4))
            {
                *slot = f32::from_le_bytes(chunk.try_into().unwrap());
            }

            self.len += 1;
            read += 1;
        }
        Ok(read)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of base vectors (excludes queries).
    pub fn size(&self) -> u32 {
        self.base_size
    }

    /// Total vectors currently held, base plus queries loaded so far.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: u32) -> &[f32] {
        let start = index as usize * self.dim;
        &self.vectors[start..start + self.dim]
    }

    pub fn filter(&self, index: u32) -> f32 {
        self.filters[index as usize]
    }

    /// Two vectors are filter-compatible iff their labels are equal, or
    /// either label is the wildcard sentinel.
    pub fn same_filter(&self, index1: u32, index2: u32) -> bool {
        let a = self.filter(index1);
        let b = self.filter(index2);
        a == b || a == NO_FILTER || b == NO_FILTER
    }

    pub fn filter_indices(&self, label: f32) -> Option<&HashSet<u32>> {
        self.filters_map.get(&OrderedFloat(label))
    }

    pub fn filter_labels(&self) -> impl Iterator<Item = f32> + '_ {
        self.filters_map.keys().map(|l| l.0)
    }

    /// Squared Euclidean distance. Not memoized: correctness does not depend
    /// on caching, and an unconditional direct computation is trivially safe
    /// for concurrent readers.
    pub fn distance(&self, index1: u32, index2: u32) -> f32 {
        vector::squared_euclidean(self.get(index1), self.get(index2))
    }

    /// Read the `K=100` groundtruth indices for the `query_index`-th query
    /// record, with sentinel `-1` padding where fewer than `K` neighbors
    /// exist.
    pub fn query_groundtruth(
        mut source: impl Read + Seek,
        query_index: u32,
        layout: GroundtruthLayout,
    ) -> VamanaResult<Vec<i32>> {
        const K: u64 = 100;
        let mut offset = query_index as u64 * K * 4;
        if layout == GroundtruthLayout::LeadingCount {
            offset += 4;
        }
        source.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; K as usize * 4];
        source.read_exact(&mut buf)?;
        Ok(buf
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect())
    }
}
