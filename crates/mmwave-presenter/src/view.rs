use crate::render::{Renderer, View};
use mmwave_awr::{MmWaveDriver, RadarError, RadarSystem};
use mmwave_core::{bounds::AreaLimit3D, point::Point, pointcloud::PointCloud};
use std::{sync::Arc, time::Duration};
use tokio::{
    select,
    sync::watch,
    task::{JoinError, JoinHandle},
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, instrument, warn};

/// Anything a view can poll for frames.
pub trait PointSource: Send + Sync + 'static {
    fn detected_points(&self, wait_new: bool) -> Result<Vec<Point>, RadarError>;

    /// How often a fresh logical frame becomes available.
    fn redraw_interval(&self) -> Duration;
}

impl<D: MmWaveDriver + 'static> PointSource for RadarSystem<D> {
    fn detected_points(&self, wait_new: bool) -> Result<Vec<Point>, RadarError> {
        RadarSystem::detected_points(self, wait_new)
    }

    fn redraw_interval(&self) -> Duration {
        redraw_interval(
            self.configuration().frame_periodicity_ms,
            self.parse_time_interval(),
        )
    }
}

/// `frame_periodicity_ms × parse_time_interval`, never below one millisecond.
///
/// A product that is not a positive number, or too large for a [`Duration`],
/// falls back to the frame periodicity alone.
pub fn redraw_interval(frame_periodicity_ms: u32, parse_time_interval: f64) -> Duration {
    let millis = frame_periodicity_ms as f64 * parse_time_interval;
    Some(millis)
        .filter(|millis| millis.is_finite() && *millis > 0.0)
        .and_then(|millis| Duration::try_from_secs_f64(millis.max(1.0) / 1000.0).ok())
        .unwrap_or_else(|| Duration::from_millis(frame_periodicity_ms.max(1) as u64))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewReport {
    pub frames: u64,
    pub failures: u64,
}

/// One plot fed from a shared point source.
pub struct LiveView<S: PointSource, R: Renderer> {
    source: Arc<S>,
    view: View,
    bounds: AreaLimit3D,
    renderer: R,
    last: Option<PointCloud>,
    report: ViewReport,
}

impl<S: PointSource, R: Renderer> LiveView<S, R> {
    pub fn new(source: Arc<S>, view: View, bounds: AreaLimit3D, renderer: R) -> Self {
        Self {
            source,
            view,
            bounds,
            renderer,
            last: None,
            report: ViewReport::default(),
        }
    }

    pub fn last_frame(&self) -> Option<&PointCloud> {
        self.last.as_ref()
    }

    pub fn report(&self) -> ViewReport {
        self.report
    }

    /// Draw one frame. Empty frames are drawn too.
    pub fn render(&mut self, points: Vec<Point>) {
        let cloud = PointCloud::from(points);
        let axes = cloud.axes();
        self.renderer.render(&self.view, &axes, &self.bounds);
        self.report.frames += 1;
        debug!(view=%self.view.name, points = cloud.len(), "redrawn");
        self.last = Some(cloud);
    }

    /// Block for the next frame and draw it.
    pub fn tick(&mut self) -> Result<usize, RadarError> {
        let points = self.source.detected_points(true).inspect_err(|_| {
            self.report.failures += 1;
        })?;
        let count = points.len();
        self.render(points);
        Ok(count)
    }

    /// Run the view on the tokio runtime until stopped.
    pub fn spawn(self) -> ViewHandle<S, R> {
        let (shutdown, stopped) = watch::channel(false);
        let name = self.view.name.clone();
        ViewHandle {
            name,
            shutdown,
            task: tokio::spawn(self.run(stopped)),
        }
    }

    #[instrument(skip_all, fields(view=%self.view))]
    async fn run(mut self, mut stopped: watch::Receiver<bool>) -> Self {
        let period = self.source.redraw_interval();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_ms = period.as_millis() as u64, "view running");

        loop {
            select! {
                biased;
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                    continue;
                }
                _ = interval.tick() => {}
            }

            // A blocking read cannot be interrupted, so stop requests are
            // honoured once it returns
            let source = self.source.clone();
            match tokio::task::spawn_blocking(move || source.detected_points(true)).await {
                Ok(Ok(points)) => self.render(points),
                Ok(Err(e)) => {
                    self.report.failures += 1;
                    warn!(error=%e, "unable to poll radar, skipping redraw");
                }
                Err(e) => {
                    error!(error=%e, "poll task failed");
                    break;
                }
            }

            if *stopped.borrow() {
                break;
            }
        }

        info!(
            frames = self.report.frames,
            failures = self.report.failures,
            "view stopped"
        );
        self
    }
}

/// Control for a spawned view. Dropping it also stops the view.
pub struct ViewHandle<S: PointSource, R: Renderer> {
    name: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<LiveView<S, R>>,
}

impl<S: PointSource, R: Renderer> ViewHandle<S, R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the view to stop at its next tick boundary.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the view to stop and hand it back.
    pub async fn join(self) -> Result<LiveView<S, R>, JoinError> {
        self.task.await
    }
}
