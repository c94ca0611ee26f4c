use std::{collections::VecDeque, num::NonZeroUsize, sync::Arc};

use rnoise_core::frame::Frame;

/// Sliding window over the most recent frames, oldest first.
///
/// Frames are shared with classification through `Arc`, so a snapshot stays
/// valid after later pushes evict its frames.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    capacity: NonZeroUsize,
    frames: VecDeque<Arc<Frame>>,
}

impl FrameHistory {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity.get()),
        }
    }

    /// Appends `frame` as the newest entry, evicting the oldest when full.
    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() == self.capacity.get() {
            self.frames.pop_front();
        }
        self.frames.push_back(Arc::new(frame));
    }

    pub fn snapshot(&self) -> Vec<Arc<Frame>> {
        self.frames.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
