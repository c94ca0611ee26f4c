use std::iter::{ExactSizeIterator, Iterator};

use crate::frame::Frame;

/// Yields the frames of a [`Recording`] in capture order.
pub struct RecordingIterator<'a> {
    current: usize,
    recording: &'a dyn Recording,
}

impl<'a> RecordingIterator<'a> {
    pub fn new<R>(recording: &'a R) -> Self
    where
        R: Recording,
    {
        RecordingIterator {
            current: 0,
            recording,
        }
    }
}

impl Iterator for RecordingIterator<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.recording.len() {
            return None;
        }
        let frame = self.recording.frame(self.current);
        self.current += 1;
        frame
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.recording.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RecordingIterator<'_> {}

/// A finite, replayable sequence of captured frames standing in for a live feed.
pub trait Recording: Send + Sync {
    fn frame(&self, index: usize) -> Option<Frame>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn frames(&self) -> RecordingIterator<'_>
    where
        Self: Sized,
    {
        RecordingIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Point;

    struct InMemory(Vec<Frame>);

    impl Recording for InMemory {
        fn frame(&self, index: usize) -> Option<Frame> {
            self.0.get(index).cloned()
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    #[test]
    fn test_frames_in_order() {
        let recording = InMemory(
            (0..3)
                .map(|i| Frame::new(vec![Point::new(i as f32, 0.0, 0.0, 1.0)]))
                .collect(),
        );
        let frames = recording.frames();
        assert_eq!(frames.len(), 3);
        let xs: Vec<_> = frames.map(|f| f.points()[0].x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert!(InMemory(vec![]).is_empty());
    }
}
