use anyhow::Result;
use parking_lot::Mutex;
use rnoise_core::frame::Frame;
use rnoise_sensor::{PointCloudMsg, Publisher};

use crate::{
    frame_history::FrameHistory,
    noise_filter::{FilterReport, NoiseFilter},
};

struct PipelineState {
    history: FrameHistory,
    // number of frames accepted so far
    serial: u64,
}

/// Owns the frame window and the filter for one stream.
///
/// Pushing a frame and classifying it happen under a single lock, so
/// concurrent producers never observe or classify a half-updated window.
pub struct NoiseFilterPipeline {
    filter: NoiseFilter,
    reference_frame: String,
    state: Mutex<PipelineState>,
}

impl NoiseFilterPipeline {
    pub fn new(history: FrameHistory, filter: NoiseFilter, reference_frame: String) -> Self {
        Self {
            filter,
            reference_frame,
            state: Mutex::new(PipelineState { history, serial: 0 }),
        }
    }

    /// Adds `frame` to the window and filters it against the older frames.
    ///
    /// Frames with non-finite values are rejected before they reach the window.
    pub fn process(&self, frame: Frame) -> rnoise_core::Result<FilterReport> {
        let mut state = self.state.lock();
        Self::process_locked(&self.filter, &mut state, frame)
    }

    /// Like [`process`](Self::process), but drops the frame and returns `None`
    /// when another frame is being classified.
    pub fn try_process(&self, frame: Frame) -> Option<rnoise_core::Result<FilterReport>> {
        let Some(mut state) = self.state.try_lock() else {
            log::debug!("classification in progress, dropping frame of {} points", frame.len());
            return None;
        };
        Some(Self::process_locked(&self.filter, &mut state, frame))
    }

    fn process_locked(
        filter: &NoiseFilter,
        state: &mut PipelineState,
        frame: Frame,
    ) -> rnoise_core::Result<FilterReport> {
        frame.validate()?;

        state.serial += 1;
        log::debug!(
            "total num of points in frame {}: {}",
            state.serial,
            frame.len()
        );

        state.history.push(frame);
        let window = state.history.snapshot();
        let report = filter.classify_detailed(&window)?;

        log::debug!(
            "frame {}: {} noise points {:?}",
            state.serial,
            report.noise_indices.len(),
            report.noise_indices
        );
        Ok(report)
    }

    /// Full per-message path: decode, filter, encode in the reference frame and publish.
    pub fn handle_message<P: Publisher + ?Sized>(
        &self,
        msg: &PointCloudMsg,
        publisher: &mut P,
    ) -> Result<FilterReport> {
        let frame = msg.to_frame()?;
        let report = self.process(frame)?;
        publisher.publish(PointCloudMsg::from_frame(&report.output, &self.reference_frame))?;
        Ok(report)
    }

    pub fn filter(&self) -> &NoiseFilter {
        &self.filter
    }

    pub fn reference_frame(&self) -> &str {
        &self.reference_frame
    }

    pub fn frames_processed(&self) -> u64 {
        self.state.lock().serial
    }

    pub fn window_len(&self) -> usize {
        self.state.lock().history.len()
    }

    pub fn window_capacity(&self) -> usize {
        self.state.lock().history.capacity()
    }
}
