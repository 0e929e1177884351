//! Distance kernel for the Vamana index: squared-Euclidean distance over
//! runtime-length `f32` vectors, plus a cache-line prefetch hint.
//!
//! Split out of the `vamana` crate the same way the teacher splits `vector`
//! out of `diskann`: this crate knows nothing about filters, graphs, or
//! construction, only how to compare two flat vectors.

mod l2;
mod utils;

pub use l2::squared_euclidean;
pub use utils::prefetch_vector;
