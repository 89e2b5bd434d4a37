use chrono::{DateTime, Utc};
use mmwave_core::{bounds::AreaLimit3D, pointcloud::AxisSeries};
use mmwave_presenter::{
    render::{LEGEND, TITLE},
    RedrawStrategy, Renderer, View,
};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// What a plot panel draws on its next repaint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub title: String,
    pub legend: String,
    pub axis_labels: Vec<String>,
    pub bounds: AreaLimit3D,
    pub axes: AxisSeries,
    pub updated: Option<DateTime<Utc>>,
    /// Times the labels and legend were rebuilt
    pub decorations: u64,
    pub frames: u64,
}

impl Scene {
    fn decorate(&mut self, view: &View) {
        self.title = TITLE.to_owned();
        self.legend = LEGEND.to_owned();
        self.axis_labels = view.axis_labels().iter().map(|&l| l.to_owned()).collect();
        self.decorations += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedScene(Arc<Mutex<Scene>>);

impl SharedScene {
    pub fn lock(&self) -> MutexGuard<'_, Scene> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Scene {
        self.lock().clone()
    }
}

/// Renders into a [`SharedScene`] and wakes the window.
pub struct CanvasRenderer {
    scene: SharedScene,
    repaint: Arc<OnceLock<egui::Context>>,
}

impl CanvasRenderer {
    pub fn new(scene: SharedScene, repaint: Arc<OnceLock<egui::Context>>) -> Self {
        Self { scene, repaint }
    }
}

impl Renderer for CanvasRenderer {
    fn render(&mut self, view: &View, axes: &AxisSeries, bounds: &AreaLimit3D) {
        {
            let mut scene = self.scene.lock();
            match view.strategy {
                RedrawStrategy::ClearAndRedraw => {
                    let (decorations, frames) = (scene.decorations, scene.frames);
                    *scene = Scene {
                        decorations,
                        frames,
                        ..Default::default()
                    };
                    scene.decorate(view);
                }
                RedrawStrategy::ReplaceData if scene.decorations == 0 => scene.decorate(view),
                RedrawStrategy::ReplaceData => {}
            }
            scene.bounds = *bounds;
            scene.axes = axes.clone();
            scene.updated = Some(Utc::now());
            scene.frames += 1;
        }
        if let Some(ctx) = self.repaint.get() {
            ctx.request_repaint();
        }
    }
}
