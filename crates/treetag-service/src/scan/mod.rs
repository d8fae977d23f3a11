//! Local scan counting, points, and missions.

pub mod tracker;

pub use tracker::{Mission, ScanProgress, ScanTracker};
