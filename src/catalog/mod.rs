//! Segment catalog data structures and CSV loading

mod data;
pub mod loader;

pub use data::{Segment, CatalogStats};
pub use loader::{load_segments, load_segments_from_reader, SegmentLibrary};
