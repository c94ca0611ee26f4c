//! Nearest-neighbor temporal consistency filter for radar point clouds.
//!
//! Points of the newest frame that have no close neighbor in enough of the
//! preceding frames are treated as transient noise and removed.

pub mod assignment;
pub mod config;
pub mod frame_history;
pub mod match_labels;
pub mod neighbor_grid;
pub mod noise_filter;
pub mod pipeline;

pub use config::{CoordinateSubset, MatchStrategy, NoiseFilterCfg};
pub use frame_history::FrameHistory;
pub use match_labels::{MatchLabel, MatchLabels, NOISE_SCORE_LIMIT};
pub use noise_filter::{FilterReport, NoiseFilter};
pub use pipeline::NoiseFilterPipeline;
