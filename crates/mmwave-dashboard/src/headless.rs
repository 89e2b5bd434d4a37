use mmwave_core::{bounds::AreaLimit3D, pointcloud::AxisSeries};
use mmwave_presenter::{Renderer, View};
use tracing::{debug, info};

/// Reports each frame through tracing instead of drawing it.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&mut self, view: &View, axes: &AxisSeries, bounds: &AreaLimit3D) {
        info!(view=%view.name, points = axes.len(), "frame");
        debug!(x=?axes.x, y=?axes.y, z=?axes.z, bounds=?bounds);
    }
}
