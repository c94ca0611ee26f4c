//! Temporal consistency filter.
//!
//! Every point of the newest frame is compared against each older frame of
//! the window. A point that finds no neighbor closer than the correspondence
//! threshold in at least four of those frames is considered noise.

use rnoise_core::{frame::Frame, Real, Result};

use crate::{
    assignment::CostMatrix,
    config::{CoordinateSubset, MatchStrategy},
    match_labels::{is_noise, MatchLabel, MatchLabels},
    neighbor_grid::NeighborGrid,
};

#[derive(Clone, Debug)]
pub struct NoiseFilter {
    correspondence_threshold: Real,
    coordinate_subset: CoordinateSubset,
    match_strategy: MatchStrategy,
}

/// Outcome of one classification, with the intermediate labels kept for
/// diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterReport {
    pub output: Frame,
    pub labels: MatchLabels,
    // label row sums, one per point of the current frame
    pub scores: Vec<i32>,
    pub noise_indices: Vec<usize>,
}

impl FilterReport {
    fn empty() -> Self {
        Self {
            output: Frame::empty(),
            labels: MatchLabels::new(0),
            scores: Vec::new(),
            noise_indices: Vec::new(),
        }
    }

    pub fn number_of_noise_points(&self) -> usize {
        self.noise_indices.len()
    }
}

impl NoiseFilter {
    pub fn new(
        correspondence_threshold: Real,
        coordinate_subset: CoordinateSubset,
        match_strategy: MatchStrategy,
    ) -> Self {
        Self {
            correspondence_threshold,
            coordinate_subset,
            match_strategy,
        }
    }

    pub fn correspondence_threshold(&self) -> Real {
        self.correspondence_threshold
    }

    pub fn coordinate_subset(&self) -> CoordinateSubset {
        self.coordinate_subset
    }

    pub fn match_strategy(&self) -> MatchStrategy {
        self.match_strategy
    }

    /// Filters the last frame of `window` against the frames before it.
    pub fn classify<F: AsRef<Frame>>(&self, window: &[F]) -> Result<Frame> {
        Ok(self.classify_detailed(window)?.output)
    }

    pub fn classify_detailed<F: AsRef<Frame>>(&self, window: &[F]) -> Result<FilterReport> {
        let Some((current, history)) = window.split_last() else {
            return Ok(FilterReport::empty());
        };
        let current = current.as_ref();
        current.validate()?;

        let mut labels = MatchLabels::new(current.len());
        for (index, frame) in history.iter().enumerate() {
            let frame = frame.as_ref();
            frame.validate()?;

            let column = self.label_against(current, frame);
            log::trace!(
                "labels against frame {} ({} points): {:?}",
                index,
                frame.len(),
                column.iter().map(|l| l.value()).collect::<Vec<_>>()
            );
            labels.push_column(column);
        }

        let scores = labels.scores();
        let keep: Vec<bool> = scores.iter().map(|&score| !is_noise(score)).collect();
        let noise_indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter(|(_, keep)| !**keep)
            .map(|(index, _)| index)
            .collect();
        let output = current.select(&keep)?;

        log::trace!("match labels: {:?}", labels.as_values());

        Ok(FilterReport {
            output,
            labels,
            scores,
            noise_indices,
        })
    }

    /// One label per point of `current`, judged against a single older frame.
    pub fn label_against(&self, current: &Frame, history: &Frame) -> Vec<MatchLabel> {
        // no candidates at all, nothing can match
        if history.is_empty() {
            return vec![MatchLabel::Unmatched; current.len()];
        }

        match self.match_strategy {
            MatchStrategy::NearestNeighbor => {
                let grid = NeighborGrid::new(
                    history.points(),
                    self.coordinate_subset,
                    self.correspondence_threshold,
                );
                current
                    .iter()
                    .map(|point| {
                        if grid.has_neighbor(point) {
                            MatchLabel::Matched
                        } else {
                            MatchLabel::Unmatched
                        }
                    })
                    .collect()
            }
            MatchStrategy::OptimalAssignment => {
                let costs = CostMatrix::between(current, history, self.coordinate_subset);
                costs
                    .assign()
                    .into_iter()
                    .enumerate()
                    .map(|(row, col)| {
                        MatchLabel::from_distance(
                            col.map(|col| costs.get(row, col)),
                            self.correspondence_threshold,
                        )
                    })
                    .collect()
            }
        }
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(0.3, CoordinateSubset::default(), MatchStrategy::default())
    }
}
