use crate::{canvas::SharedScene, projection::Orbit};
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoint, PlotPoints, PlotUi, Points, Text};
use mmwave_core::bounds::AreaLimit3D;
use mmwave_presenter::{Projection, View};

/// Box edges as corner index pairs, see [`AreaLimit3D::corners`].
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

pub struct Panel {
    pub view: View,
    pub scene: SharedScene,
}

pub struct DashboardApp {
    panels: Vec<Panel>,
    orbit: Orbit,
}

impl DashboardApp {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self {
            panels,
            orbit: Orbit::default(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Millimeter Wave Radar detection chart");
                if self
                    .panels
                    .iter()
                    .any(|panel| panel.view.projection == Projection::Scatter3d)
                {
                    ui.separator();
                    self.orbit.ui(ui);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.panels.is_empty() {
                ui.label("No views selected");
                return;
            }
            let orbit = self.orbit;
            ui.columns(self.panels.len(), |columns| {
                for (panel, ui) in self.panels.iter().zip(columns.iter_mut()) {
                    panel.show(ui, &orbit);
                }
            });
        });
    }
}

impl Panel {
    fn show(&self, ui: &mut egui::Ui, orbit: &Orbit) {
        let scene = self.scene.snapshot();
        let updated = scene
            .updated
            .map(|time| time.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| "waiting".to_owned());
        ui.label(format!(
            "{} [{}] {} points, last frame {}",
            scene.title,
            self.view.name,
            scene.axes.len(),
            updated
        ));

        let label = |i: usize| scene.axis_labels.get(i).cloned().unwrap_or_default();
        let plot = Plot::new(&self.view.name)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false);

        match self.view.projection {
            Projection::Scatter2d => {
                let points: Vec<[f64; 2]> = scene
                    .axes
                    .xy()
                    .map(|[x, y]| [x as f64, y as f64])
                    .collect();
                plot.x_axis_label(label(0))
                    .y_axis_label(label(1))
                    .show(ui, |plot_ui| {
                        let AreaLimit3D { x, y, .. } = scene.bounds;
                        plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                            [x.min as f64, y.min as f64],
                            [x.max as f64, y.max as f64],
                        ));
                        plot_ui.points(
                            Points::new(PlotPoints::new(points))
                                .name(&scene.legend)
                                .radius(3.0),
                        );
                    });
            }
            Projection::Scatter3d => {
                let corners = orbit.project_all(scene.bounds.corners().into_iter());
                let points = orbit.project_all(scene.axes.xyz());
                plot.show_axes(false).show(ui, |plot_ui| {
                    plot_ui.set_plot_bounds(enclosing(&corners));
                    draw_box(plot_ui, &corners);
                    for (axis, (from, to)) in [(0, (0, 1)), (1, (0, 3)), (2, (0, 4))] {
                        let [a, b] = [corners[from], corners[to]];
                        plot_ui.text(Text::new(
                            PlotPoint::new((a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0),
                            label(axis),
                        ));
                    }
                    plot_ui.points(
                        Points::new(PlotPoints::new(points))
                            .name(&scene.legend)
                            .radius(3.0),
                    );
                });
            }
        }
    }
}

/// Plot bounds around the projected detection box, so they never follow the data.
fn enclosing(corners: &[[f64; 2]]) -> PlotBounds {
    let (mut min, mut max) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
    for corner in corners {
        for i in 0..2 {
            min[i] = min[i].min(corner[i]);
            max[i] = max[i].max(corner[i]);
        }
    }
    PlotBounds::from_min_max(min, max)
}

fn draw_box(plot_ui: &mut PlotUi, corners: &[[f64; 2]]) {
    for (from, to) in EDGES {
        plot_ui.line(
            Line::new(PlotPoints::new(vec![corners[from], corners[to]]))
                .color(Color32::GRAY)
                .width(1.0),
        );
    }
}
