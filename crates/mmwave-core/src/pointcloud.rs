use crate::point::Point;
use chrono::{DateTime, Utc};

/// One frame of detections, stamped when it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub time: DateTime<Utc>,
    pub points: Vec<Point>,
}

/// A frame split into parallel per-axis sequences, ready for plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSeries {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn axes(&self) -> AxisSeries {
        AxisSeries::from(self.points.as_slice())
    }
}

impl From<Vec<Point>> for PointCloud {
    fn from(value: Vec<Point>) -> Self {
        Self {
            time: chrono::Utc::now(),
            points: value,
        }
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        PointCloud {
            time: Utc::now(),
            points: Vec::new(),
        }
    }
}

impl AxisSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Pairs of (x, y), the top-down projection.
    pub fn xy(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.x.iter().zip(self.y.iter()).map(|(&x, &y)| [x, y])
    }

    pub fn xyz(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((&x, &y), &z)| [x, y, z])
    }
}

impl From<&[Point]> for AxisSeries {
    fn from(points: &[Point]) -> Self {
        let (x, y, z) = points.iter().map(|p| (p.x, p.y, p.z)).unzip3();
        AxisSeries { x, y, z }
    }
}

// Helper function for unzipping tuples
trait Unzip3<A, B, C> {
    fn unzip3(self) -> (Vec<A>, Vec<B>, Vec<C>);
}

impl<I, A, B, C> Unzip3<A, B, C> for I
where
    I: Iterator<Item = (A, B, C)>,
{
    fn unzip3(self) -> (Vec<A>, Vec<B>, Vec<C>) {
        let (lower, _) = self.size_hint();
        let mut x = Vec::with_capacity(lower);
        let mut y = Vec::with_capacity(lower);
        let mut z = Vec::with_capacity(lower);
        for (a, b, c) in self {
            x.push(a);
            y.push(b);
            z.push(c);
        }
        (x, y, z)
    }
}
