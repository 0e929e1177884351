mod random_graph;
mod unfiltered;

pub mod filtered;
pub mod stitched;

pub use filtered::{FilteredBuildParams, build_filtered};
pub use random_graph::random_regular_graph;
pub use stitched::{StitchedBuildParams, build_stitched};
