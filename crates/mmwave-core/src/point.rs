use serde::{Deserialize, Serialize};

/// A single detection in meters, relative to the sensor.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Copy, PartialEq, PartialOrd)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Point {
    fn from(value: [f32; 3]) -> Self {
        Self {
            x: value[0],
            y: value[1],
            z: value[2],
        }
    }
}

impl From<(f32, f32, f32)> for Point {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

impl From<Point> for [f32; 3] {
    fn from(point: Point) -> Self {
        [point.x, point.y, point.z]
    }
}
