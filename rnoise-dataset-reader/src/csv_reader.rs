use std::{io::Read, path::Path};

use anyhow::{bail, Context, Result};
use rnoise_core::{
    frame::{Frame, Point},
    Real, Recording,
};
use serde::Deserialize;

/// One CSV row: `frame,x,y,z,intensity`.
///
/// A row whose coordinates are all empty marks a frame without points.
#[derive(Debug, Deserialize)]
struct PointRecord {
    frame: u64,
    x: Option<Real>,
    y: Option<Real>,
    z: Option<Real>,
    intensity: Option<Real>,
}

/// Radar frames replayed from a CSV capture.
///
/// Consecutive rows sharing a `frame` value form one frame.
pub struct CsvRecording {
    frame_ids: Vec<u64>,
    frames: Vec<Frame>,
}

impl CsvRecording {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening recording {}", path.display()))?;
        let recording = Self::from_reader(std::io::BufReader::new(file))?;
        log::info!(
            "loaded {} frames from {}",
            recording.frames.len(),
            path.display()
        );
        Ok(recording)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut frame_ids = vec![];
        let mut frames: Vec<Vec<Point>> = vec![];

        for (line, record) in reader.deserialize::<PointRecord>().enumerate() {
            let record = record.with_context(|| format!("parsing record {}", line + 1))?;

            if frame_ids.last() != Some(&record.frame) {
                frame_ids.push(record.frame);
                frames.push(vec![]);
            }

            let point = match (record.x, record.y, record.z, record.intensity) {
                (None, None, None, None) => continue,
                (Some(x), Some(y), Some(z), Some(intensity)) => Point::new(x, y, z, intensity),
                _ => bail!(
                    "record {} of frame {} has missing coordinates",
                    line + 1,
                    record.frame
                ),
            };
            // NaN returns are dropped, as the live driver feed does
            if point.has_nan() {
                continue;
            }
            if !point.is_finite() {
                bail!(
                    "record {} of frame {} is not finite: {:?}",
                    line + 1,
                    record.frame,
                    point
                );
            }
            if let Some(points) = frames.last_mut() {
                points.push(point);
            }
        }

        Ok(Self {
            frame_ids,
            frames: frames.into_iter().map(Frame::new).collect(),
        })
    }

    /// Identifier of the frame at `index`, as written in the capture.
    pub fn frame_id(&self, index: usize) -> Option<u64> {
        self.frame_ids.get(index).copied()
    }
}

impl Recording for CsvRecording {
    fn frame(&self, index: usize) -> Option<Frame> {
        self.frames.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_consecutive_rows() {
        let data = "frame,x,y,z,intensity
1, 0.0, 0.0, 0.0, 1.0
1, 5.0, 0.0, 0.0, 2.0
2, 0.1, 0.0, 0.0, 1.0
4,,,,
5, 1.0, 2.0, 3.0, 4.0
";
        let recording = CsvRecording::from_reader(data.as_bytes()).unwrap();
        assert_eq!(recording.len(), 4);
        assert_eq!(recording.frame_id(2), Some(4));

        let sizes: Vec<_> = recording.frames().map(|f| f.len()).collect();
        assert_eq!(sizes, vec![2, 1, 0, 1]);
        assert_eq!(
            recording.frame(3).unwrap().points()[0],
            Point::new(1.0, 2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn test_skips_nan_rows() {
        let data = "frame,x,y,z,intensity
1,NaN,0,0,1
1,2,0,0,1
";
        let recording = CsvRecording::from_reader(data.as_bytes()).unwrap();
        assert_eq!(recording.frame(0).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_partial_rows() {
        let data = "frame,x,y,z,intensity
1,2,0,,1
";
        assert!(CsvRecording::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_infinite_rows() {
        let data = "frame,x,y,z,intensity
1,inf,0,0,1
";
        assert!(CsvRecording::from_reader(data.as_bytes()).is_err());
    }
}
