use egui::{DragValue, Ui};
use ndarray::{array, Array2};
use std::f32::consts::{FRAC_PI_2, PI};

/// Orbit camera used to flatten the 3D scatter onto the plot.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Orbit {
    pub yaw: f32,   // Rotation about the vertical axis, radians
    pub pitch: f32, // Tilt towards the viewer, radians
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            yaw: -0.6,
            pitch: 0.35,
        }
    }
}

impl Orbit {
    fn rotation(&self) -> Array2<f32> {
        let yaw = self.yaw;
        let pitch = self.pitch;

        // Yaw rotation matrix (rotate around Z-axis)
        let yaw_matrix = array![
            [yaw.cos(), -yaw.sin(), 0.0],
            [yaw.sin(), yaw.cos(), 0.0],
            [0.0, 0.0, 1.0]
        ];
        // Pitch rotation matrix (rotate around X-axis)
        let pitch_matrix = array![
            [1.0, 0.0, 0.0],
            [0.0, pitch.cos(), -pitch.sin()],
            [0.0, pitch.sin(), pitch.cos()]
        ];

        // Combine rotations (first yaw, then pitch)
        pitch_matrix.dot(&yaw_matrix)
    }

    /// Screen position of a point: rotated x to the right, rotated z up.
    pub fn project(&self, point: [f32; 3]) -> [f64; 2] {
        Self::apply(&self.rotation(), point)
    }

    pub fn project_all(&self, points: impl Iterator<Item = [f32; 3]>) -> Vec<[f64; 2]> {
        let rotation = self.rotation();
        points.map(|point| Self::apply(&rotation, point)).collect()
    }

    fn apply(rotation: &Array2<f32>, point: [f32; 3]) -> [f64; 2] {
        let rotated = rotation.dot(&array![point[0], point[1], point[2]]);
        [rotated[0] as f64, rotated[2] as f64]
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("yaw:");
            ui.add(DragValue::new(&mut self.yaw).speed(0.01).clamp_range(-PI..=PI));
            ui.label("pitch:");
            ui.add(DragValue::new(&mut self.pitch).speed(0.01).clamp_range(-FRAC_PI_2..=FRAC_PI_2));
        });
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::Orbit;

    fn are_close(v1: [f64; 2], v2: [f64; 2], tol: f64) -> bool {
        v1.iter().zip(v2.iter()).all(|(a, b)| (a - b).abs() < tol)
    }

    #[test]
    pub fn test_front_view_drops_depth() {
        let orbit = Orbit {
            yaw: 0.,
            pitch: 0.,
        };
        assert!(are_close(orbit.project([1., 2., 3.]), [1., 3.], 1e-6));
    }

    #[test]
    pub fn test_yaw_turns_width_into_depth() {
        let orbit = Orbit {
            yaw: PI / 2.,
            pitch: 0.,
        };
        assert!(are_close(orbit.project([1., 0., 0.]), [0., 0.], 1e-6));
        assert!(are_close(orbit.project([0., 1., 0.]), [-1., 0.], 1e-6));
    }

    #[test]
    pub fn test_pitch_lifts_depth() {
        let orbit = Orbit {
            yaw: 0.,
            pitch: PI / 2.,
        };
        assert!(are_close(orbit.project([0., 1., 0.]), [0., 1.], 1e-6));
    }

    #[test]
    pub fn test_project_all_matches_project() {
        let orbit = Orbit::default();
        let points = [[1., 2., 3.], [-0.5, 4., 0.]];
        let projected = orbit.project_all(points.into_iter());
        assert_eq!(projected[0], orbit.project(points[0]));
        assert_eq!(projected[1], orbit.project(points[1]));
    }
}
