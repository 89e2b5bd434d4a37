use serde::{Deserialize, Serialize};

/// Closed interval over one axis.
///
/// `min > max` is accepted and simply renders as an inverted axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn as_tuple(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl From<(f32, f32)> for Range {
    fn from((min, max): (f32, f32)) -> Self {
        Self { min, max }
    }
}

/// Fixed plot bounds for the three axes, in meters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct AreaLimit3D {
    pub x: Range,
    pub y: Range,
    pub z: Range,
}

impl AreaLimit3D {
    pub fn new(x: impl Into<Range>, y: impl Into<Range>, z: impl Into<Range>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    /// The eight corners of the box, bottom face first.
    pub fn corners(&self) -> [[f32; 3]; 8] {
        let (x0, x1) = self.x.as_tuple();
        let (y0, y1) = self.y.as_tuple();
        let (z0, z1) = self.z.as_tuple();
        [
            [x0, y0, z0],
            [x1, y0, z0],
            [x1, y1, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x1, y0, z1],
            [x1, y1, z1],
            [x0, y1, z1],
        ]
    }
}

impl Default for AreaLimit3D {
    fn default() -> Self {
        Self::new((-5.0, 5.0), (0.0, 5.0), (-5.0, 5.0))
    }
}
