use mmwave_core::{bounds::AreaLimit3D, pointcloud::AxisSeries};
use std::fmt::Display;

pub const TITLE: &str = "Detection distribution map";
pub const LEGEND: &str = "Detection Object";
pub static AXIS_LABELS: [&str; 3] = ["X (Unit: Meter)", "Y (Unit: Meter)", "Z (Unit: Meter)"];

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Projection {
    /// All three axes
    Scatter3d,
    /// Top-down, x against y
    Scatter2d,
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum RedrawStrategy {
    /// Rebuild labels, legend and points every tick
    ClearAndRedraw,
    /// Keep the decorated plot and swap only its points
    ReplaceData,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct View {
    pub name: String,
    pub projection: Projection,
    pub strategy: RedrawStrategy,
}

impl View {
    pub fn scatter_3d() -> Self {
        Self {
            name: "3d".to_owned(),
            projection: Projection::Scatter3d,
            strategy: RedrawStrategy::ReplaceData,
        }
    }

    pub fn scatter_2d() -> Self {
        Self {
            name: "2d".to_owned(),
            projection: Projection::Scatter2d,
            strategy: RedrawStrategy::ClearAndRedraw,
        }
    }

    /// Axis labels shown by this projection.
    pub fn axis_labels(&self) -> &'static [&'static str] {
        match self.projection {
            Projection::Scatter3d => &AXIS_LABELS,
            Projection::Scatter2d => &AXIS_LABELS[..2],
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.name, self.projection)
    }
}

/// The drawing side of a view.
///
/// `bounds` are the configured limits and must be applied as given, whatever
/// the data spans.
pub trait Renderer: Send + 'static {
    fn render(&mut self, view: &View, axes: &AxisSeries, bounds: &AreaLimit3D);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, view: &View, axes: &AxisSeries, bounds: &AreaLimit3D) {
        (**self).render(view, axes, bounds)
    }
}
