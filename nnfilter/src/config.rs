use std::num::NonZeroUsize;

use anyhow::{bail, Result};
use rnoise_core::{frame::Point, Real, DEFAULT_REFERENCE_FRAME};
use serde::Deserialize;

use crate::{frame_history::FrameHistory, noise_filter::NoiseFilter, pipeline::NoiseFilterPipeline};

/// Coordinates that enter the point-to-point distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSubset {
    /// Distance along x only. This is what deployed filters have always computed.
    #[default]
    XOnly,
    /// Full euclidean distance over x, y and z.
    Xyz,
}

impl CoordinateSubset {
    /// Distance between two points over this subset.
    ///
    /// Evaluated in f64: squares of f32 coordinates overflow past 1e19 and
    /// underflow below 1e-19, which would turn real gaps into `inf` or `0`.
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        match self {
            CoordinateSubset::XOnly => (a.x as f64 - b.x as f64).abs(),
            CoordinateSubset::Xyz => {
                (a.position().cast::<f64>() - b.position().cast::<f64>()).norm()
            }
        }
    }

    /// Number of axes the distance runs over.
    pub fn dimensions(&self) -> usize {
        match self {
            CoordinateSubset::XOnly => 1,
            CoordinateSubset::Xyz => 3,
        }
    }
}

/// How a current point is paired with the points of one historical frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Each point independently looks for its nearest neighbor.
    #[default]
    NearestNeighbor,
    /// Points are paired one-to-one by a minimum total cost assignment.
    OptimalAssignment,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoiseFilterCfg {
    /// c_corr: two points closer than this are the same feature
    pub correspondence_threshold: Real,
    /// number of frames in the history window, current frame included
    pub window_size: usize,
    pub coordinate_subset: CoordinateSubset,
    pub match_strategy: MatchStrategy,
    /// frame id stamped on published clouds
    pub reference_frame: String,
}

impl Default for NoiseFilterCfg {
    fn default() -> Self {
        Self {
            correspondence_threshold: 0.3,
            window_size: 10,
            coordinate_subset: CoordinateSubset::XOnly,
            match_strategy: MatchStrategy::NearestNeighbor,
            reference_frame: String::from(DEFAULT_REFERENCE_FRAME),
        }
    }
}

impl NoiseFilterCfg {
    pub fn finalize(self) -> Result<NoiseFilterPipeline> {
        let Some(window_size) = NonZeroUsize::new(self.window_size) else {
            bail!("window size must hold at least the current frame");
        };
        if !self.correspondence_threshold.is_finite() || self.correspondence_threshold < 0.0 {
            bail!(
                "correspondence threshold must be finite and non-negative, got {}",
                self.correspondence_threshold
            );
        }
        if self.reference_frame.is_empty() {
            bail!("reference frame must not be empty");
        }

        log::info!(
            "window of {} frames, correspondence threshold {}",
            window_size,
            self.correspondence_threshold
        );
        log::info!(
            "matching: {:?} over {:?}, publishing in {}",
            self.match_strategy,
            self.coordinate_subset,
            self.reference_frame
        );
        if self.coordinate_subset == CoordinateSubset::XOnly {
            log::info!("distances use x only; set coordinate_subset = xyz for euclidean distance");
        }

        let filter = NoiseFilter::new(
            self.correspondence_threshold,
            self.coordinate_subset,
            self.match_strategy,
        );
        Ok(NoiseFilterPipeline::new(
            FrameHistory::new(window_size),
            filter,
            self.reference_frame,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = NoiseFilterCfg::default();
        assert_eq!(cfg.correspondence_threshold, 0.3);
        assert_eq!(cfg.window_size, 10);
        assert_eq!(cfg.coordinate_subset, CoordinateSubset::XOnly);
        assert_eq!(cfg.match_strategy, MatchStrategy::NearestNeighbor);
        assert_eq!(cfg.reference_frame, "base_radar_link");

        let pipeline = cfg.finalize().unwrap();
        assert_eq!(pipeline.window_capacity(), 10);
    }

    #[test]
    fn test_rejects_invalid() {
        let cfg = NoiseFilterCfg {
            window_size: 0,
            ..Default::default()
        };
        assert!(cfg.finalize().is_err());

        for threshold in [-0.1, Real::NAN, Real::INFINITY] {
            let cfg = NoiseFilterCfg {
                correspondence_threshold: threshold,
                ..Default::default()
            };
            assert!(cfg.finalize().is_err());
        }

        let cfg = NoiseFilterCfg {
            reference_frame: String::new(),
            ..Default::default()
        };
        assert!(cfg.finalize().is_err());
    }

    #[test]
    fn test_distance() {
        let a = Point::new(1.0, 0.0, 0.0, 1.0);
        let b = Point::new(4.0, 4.0, 0.0, 9.0);
        assert_eq!(CoordinateSubset::XOnly.distance(&a, &b), 3.0);
        assert_eq!(CoordinateSubset::Xyz.distance(&a, &b), 5.0);
        assert_eq!(CoordinateSubset::XOnly.dimensions(), 1);
    }

    #[test]
    fn test_distance_tiny_gaps() {
        let origin = Point::new(0.0, 0.0, 0.0, 1.0);
        let along_x = Point::new(1e-24, 0.0, 0.0, 1.0);
        let along_y = Point::new(0.0, 1e-24, 0.0, 1.0);

        let expected = 1e-24f32 as f64;
        assert_eq!(CoordinateSubset::XOnly.distance(&origin, &along_x), expected);
        assert!((CoordinateSubset::Xyz.distance(&origin, &along_x) - expected).abs() < 1e-36);
        assert!((CoordinateSubset::Xyz.distance(&origin, &along_y) - expected).abs() < 1e-36);
        assert_eq!(CoordinateSubset::XOnly.distance(&origin, &along_y), 0.0);
    }

    #[test]
    fn test_distance_huge_gaps() {
        let a = Point::new(-1e20, 0.0, 0.0, 1.0);
        let b = Point::new(1e20, 0.0, 0.0, 1.0);
        let expected = 2.0 * (1e20f32 as f64);
        assert_eq!(CoordinateSubset::XOnly.distance(&a, &b), expected);
        assert!((CoordinateSubset::Xyz.distance(&a, &b) / expected - 1.0).abs() < 1e-12);

        let low = Point::new(-Real::MAX, -Real::MAX, -Real::MAX, 1.0);
        let high = Point::new(Real::MAX, Real::MAX, Real::MAX, 1.0);
        for subset in [CoordinateSubset::XOnly, CoordinateSubset::Xyz] {
            let distance = subset.distance(&low, &high);
            assert!(distance.is_finite());
            assert!(distance > Real::MAX as f64);
        }
    }
}
