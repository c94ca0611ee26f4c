mod recording;
pub use recording::*;
mod error;
pub use error::*;
pub mod frame;

use sophus::nalgebra::Vector3;

pub type Real = f32;
pub type PointCoordinates = Vector3<Real>;

/// Reference coordinate frame the radar driver publishes in.
pub const DEFAULT_REFERENCE_FRAME: &str = "base_radar_link";
