//! Wire-format point clouds as published by the radar driver.
//!
//! The layout mirrors `sensor_msgs/PointCloud2`: a packed byte buffer of
//! `height * width` points, each `point_step` bytes wide, with named fields at
//! fixed byte offsets. Only the `x`, `y`, `z` and `intensity` fields are read.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rnoise_core::{
    frame::{Frame, Point, POINT_FIELDS},
    Error, Real, Result,
};
use serde::{Deserialize, Serialize};

/// Field names read from incoming clouds, in point order.
pub const XYZI_FIELDS: [&str; 4] = ["x", "y", "z", "intensity"];

// outgoing layout: x, y, z packed then intensity after 4 bytes of padding
const XYZI_OFFSETS: [u32; 4] = [0, 4, 8, 16];
const XYZI_POINT_STEP: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointFieldType {
    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Float32 = 7,
    Float64 = 8,
}

impl PointFieldType {
    pub fn from_code(field: &str, code: u8) -> Result<Self> {
        Ok(match code {
            1 => PointFieldType::Int8,
            2 => PointFieldType::UInt8,
            3 => PointFieldType::Int16,
            4 => PointFieldType::UInt16,
            5 => PointFieldType::Int32,
            6 => PointFieldType::UInt32,
            7 => PointFieldType::Float32,
            8 => PointFieldType::Float64,
            _ => {
                return Err(Error::UnsupportedDatatype {
                    field: field.to_string(),
                    datatype: code,
                })
            }
        })
    }

    pub fn size(&self) -> usize {
        match self {
            PointFieldType::Int8 | PointFieldType::UInt8 => 1,
            PointFieldType::Int16 | PointFieldType::UInt16 => 2,
            PointFieldType::Int32 | PointFieldType::UInt32 | PointFieldType::Float32 => 4,
            PointFieldType::Float64 => 8,
        }
    }

    fn read(&self, bytes: &[u8], big_endian: bool) -> Real {
        macro_rules! read_as {
            ($t:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&bytes[..$n]);
                if big_endian {
                    <$t>::from_be_bytes(raw)
                } else {
                    <$t>::from_le_bytes(raw)
                }
            }};
        }

        match self {
            PointFieldType::Int8 => bytes[0] as i8 as Real,
            PointFieldType::UInt8 => bytes[0] as Real,
            PointFieldType::Int16 => read_as!(i16, 2) as Real,
            PointFieldType::UInt16 => read_as!(u16, 2) as Real,
            PointFieldType::Int32 => read_as!(i32, 4) as Real,
            PointFieldType::UInt32 => read_as!(u32, 4) as Real,
            PointFieldType::Float32 => read_as!(f32, 4),
            PointFieldType::Float64 => read_as!(f64, 8) as Real,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

impl PointField {
    pub fn new(name: &str, offset: u32, datatype: PointFieldType) -> Self {
        Self {
            name: name.to_string(),
            offset,
            datatype: datatype as u8,
            count: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    // time since the unix epoch
    pub stamp: Duration,
    pub frame_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloudMsg {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    pub is_dense: bool,
}

impl PointCloudMsg {
    pub fn number_of_points(&self) -> usize {
        self.height as usize * self.width as usize
    }

    fn field(&self, name: &str) -> Result<(usize, PointFieldType)> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::MissingField(name.to_string()))?;
        let datatype = PointFieldType::from_code(name, field.datatype)?;

        let offset = field.offset as usize;
        if offset + datatype.size() > self.point_step as usize {
            return Err(Error::MalformedCloud(format!(
                "field {:?} at offset {} does not fit in a {}-byte point",
                name, offset, self.point_step
            )));
        }
        Ok((offset, datatype))
    }

    /// Decodes the cloud into a frame, skipping points with a NaN in any
    /// of the four fields. Infinite values are rejected.
    pub fn to_frame(&self) -> Result<Frame> {
        let mut layout = Vec::with_capacity(XYZI_FIELDS.len());
        for name in XYZI_FIELDS {
            layout.push(self.field(name)?);
        }

        let point_step = self.point_step as usize;
        let row_step = self.row_step as usize;
        let width = self.width as usize;
        let height = self.height as usize;

        if width * point_step > row_step {
            return Err(Error::MalformedCloud(format!(
                "row of {} points with step {} exceeds row_step {}",
                width, point_step, row_step
            )));
        }
        if self.data.len() < row_step * height {
            return Err(Error::MalformedCloud(format!(
                "data holds {} bytes, expected at least {}",
                self.data.len(),
                row_step * height
            )));
        }

        let mut values = Vec::with_capacity(self.number_of_points() * POINT_FIELDS);
        let mut number_of_nans = 0;
        for row in 0..height {
            for col in 0..width {
                let base = row * row_step + col * point_step;
                let mut fields = [0.0 as Real; POINT_FIELDS];
                for (value, (offset, datatype)) in fields.iter_mut().zip(layout.iter()) {
                    *value = datatype.read(&self.data[base + offset..], self.is_bigendian);
                }

                let point = Point::from(fields);
                if point.has_nan() {
                    number_of_nans += 1;
                    continue;
                }
                if !point.is_finite() {
                    return Err(Error::InvalidFrame(format!(
                        "point {} of the cloud has infinite values {:?}",
                        row * width + col,
                        point
                    )));
                }
                values.extend_from_slice(&fields);
            }
        }

        if number_of_nans > 0 {
            log::trace!("skipped {} points containing NaN", number_of_nans);
        }
        Frame::from_flat(&values)
    }

    /// Encodes a frame with the current wall-clock time as stamp.
    pub fn from_frame(frame: &Frame, frame_id: &str) -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_frame_stamped(frame, frame_id, stamp)
    }

    pub fn from_frame_stamped(frame: &Frame, frame_id: &str, stamp: Duration) -> Self {
        let point_step = XYZI_POINT_STEP as usize;
        let mut data = vec![0u8; point_step * frame.len()];
        let values = frame.to_flat();
        for (chunk, fields) in data
            .chunks_exact_mut(point_step)
            .zip(values.chunks_exact(POINT_FIELDS))
        {
            for (offset, value) in XYZI_OFFSETS.iter().zip(fields) {
                let offset = *offset as usize;
                chunk[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            }
        }

        let fields = XYZI_FIELDS
            .iter()
            .zip(XYZI_OFFSETS)
            .map(|(name, offset)| PointField::new(name, offset, PointFieldType::Float32))
            .collect();

        Self {
            header: Header {
                stamp,
                frame_id: frame_id.to_string(),
            },
            height: 1,
            width: frame.len() as u32,
            fields,
            is_bigendian: false,
            point_step: XYZI_POINT_STEP,
            row_step: XYZI_POINT_STEP * frame.len() as u32,
            data,
            is_dense: frame.iter().all(|p| p.is_finite()),
        }
    }
}
