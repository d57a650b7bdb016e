//! Spatial and temporal encoders over an adjacency model
//!
//! These combine the constraint primitives with variable allocation: flood fills for
//! growing regions, lines for paths and loops, and the balanced OR-tree for a linear
//! at-most-one.

pub mod adjacency;
pub mod flood;
mod layers;
pub mod line;
pub mod tree;

pub use adjacency::{panel, Adjacency, Boundary};
pub use flood::{floodfill, FloodFill};
pub use layers::{layer_label, summary_label};
pub use line::{line, Line, LineMap, LineSeed};
pub use tree::tree_one;
