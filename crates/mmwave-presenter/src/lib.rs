pub mod render;
pub mod view;

pub use render::{Projection, RedrawStrategy, Renderer, View};
pub use view::{redraw_interval, LiveView, PointSource, ViewHandle, ViewReport};
