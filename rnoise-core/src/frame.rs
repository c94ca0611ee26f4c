use serde::{Deserialize, Serialize};

use crate::{Error, PointCoordinates, Real, Result};

/// Number of values carried by one point: x, y, z and intensity.
pub const POINT_FIELDS: usize = 4;

/// A single radar return. Points carry no identity across frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Real,
    pub y: Real,
    pub z: Real,
    pub intensity: Real,
}

impl Point {
    pub fn new(x: Real, y: Real, z: Real, intensity: Real) -> Self {
        Self { x, y, z, intensity }
    }

    pub fn position(&self) -> PointCoordinates {
        PointCoordinates::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.intensity.is_finite()
    }

    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan() || self.intensity.is_nan()
    }
}

impl From<[Real; POINT_FIELDS]> for Point {
    fn from(v: [Real; POINT_FIELDS]) -> Self {
        Point::new(v[0], v[1], v[2], v[3])
    }
}

/// Points captured during one sensor cycle, in sensor order.
///
/// A frame is never modified once built; filtering produces a new frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    points: Vec<Point>,
}

impl Frame {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a frame from a flat `[x, y, z, intensity, x, y, ...]` buffer.
    pub fn from_flat(values: &[Real]) -> Result<Self> {
        if values.len() % POINT_FIELDS != 0 {
            return Err(Error::InvalidFrame(format!(
                "flat buffer of {} values is not a whole number of {}-field points",
                values.len(),
                POINT_FIELDS
            )));
        }

        let points = values
            .chunks_exact(POINT_FIELDS)
            .map(|c| Point::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self { points })
    }

    pub fn to_flat(&self) -> Vec<Real> {
        self.points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z, p.intensity])
            .collect()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Fails on the first point with a NaN or infinite value.
    pub fn validate(&self) -> Result<()> {
        match self.points.iter().position(|p| !p.is_finite()) {
            Some(index) => Err(Error::InvalidFrame(format!(
                "point {} has non-finite values {:?}",
                index, self.points[index]
            ))),
            None => Ok(()),
        }
    }

    /// Keeps the points whose index is flagged in `keep`, preserving order.
    pub fn select(&self, keep: &[bool]) -> Result<Frame> {
        if keep.len() != self.points.len() {
            return Err(Error::InvalidFrame(format!(
                "selection mask has {} entries for {} points",
                keep.len(),
                self.points.len()
            )));
        }

        let points = self
            .points
            .iter()
            .zip(keep)
            .filter(|(_, keep)| **keep)
            .map(|(p, _)| *p)
            .collect();
        Ok(Frame::new(points))
    }
}

impl AsRef<Frame> for Frame {
    fn as_ref(&self) -> &Frame {
        self
    }
}

impl From<Vec<Point>> for Frame {
    fn from(points: Vec<Point>) -> Self {
        Frame::new(points)
    }
}

impl FromIterator<Point> for Frame {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Frame::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
