//! A stand-in AWR device that speaks the driver interface without hardware.
//!
//! Frames are synthetic: a handful of targets drifting through the field of
//! view, each detected only when its signal clears the CFAR threshold, plus
//! fixed reflectors that appear while static clutter removal is off.

use crate::{
    driver::{DeviceSettings, DeviceState, Field, MmWaveDriver},
    error::{RadarInitError, RadarReadError, RadarWriteError},
    profile::Profile,
};
use mmwave_core::{config::ConnectionParams, point::Point};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    path::Path,
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::{debug, info, instrument, warn};

const STATIC_CLUTTER: [[f32; 3]; 3] = [[-2.0, 4.5, 0.0], [2.0, 4.5, 0.0], [0.0, 4.8, 0.5]];

#[derive(Debug)]
pub struct SimulatedDevice {
    params: ConnectionParams,
    seed: u64,
    control: Mutex<Control>,
    frames: Arc<FrameSlot>,
}

#[derive(Debug, Default)]
struct Control {
    profile: Profile,
    pending: DeviceSettings,
    active: Option<DeviceSettings>,
    generator: Option<Generator>,
}

#[derive(Debug)]
struct Generator {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct FrameSlot {
    latest: Mutex<Latest>,
    fresh: Condvar,
}

#[derive(Debug, Default)]
struct Latest {
    sequence: u64,
    delivered: u64,
    points: Vec<Point>,
}

impl SimulatedDevice {
    /// Use a fixed seed so frame contents are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Settings from the last successful commit.
    pub fn active_settings(&self) -> Option<DeviceSettings> {
        self.control().active.clone()
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn frame_period(&self, settings: &DeviceSettings) -> Duration {
        let millis = settings.frame_periodicity_ms as f64 * self.params.timing.parse_time_interval;
        Some(millis)
            .filter(|millis| millis.is_finite() && *millis >= 1.0)
            .and_then(|millis| Duration::try_from_secs_f64(millis / 1000.0).ok())
            .unwrap_or_else(|| Duration::from_millis(settings.frame_periodicity_ms.max(1) as u64))
    }
}

impl MmWaveDriver for SimulatedDevice {
    #[instrument(skip_all, fields(platform=%params.platform))]
    fn connect(params: &ConnectionParams) -> Result<Self, RadarInitError> {
        for (name, port, baud) in [
            ("CLI Port", &params.command_port, params.command_baud),
            ("Data Port", &params.data_port, params.data_baud),
        ] {
            if port.is_empty() || baud == 0 {
                return Err(RadarInitError::PortUnavailable(format!(
                    "{name}, {port} @ {baud}"
                )));
            }
        }
        if params.command_port == params.data_port {
            return Err(RadarInitError::PortConflict(params.command_port.clone()));
        }

        info!(cli_port=%params.command_port, data_port=%params.data_port, "opened simulated device");
        Ok(Self {
            params: params.clone(),
            seed: 0x6d6d_7761_7665,
            control: Mutex::new(Control::default()),
            frames: Arc::new(FrameSlot::default()),
        })
    }

    fn load_config_file(&self, path: &Path) -> Result<(), RadarInitError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RadarInitError::InaccessibleConfig(format!("{}, {}", path.display(), e))
        })?;
        let profile = Profile::parse(&text)?;
        let settings = profile.settings()?;
        debug!(commands = profile.len(), "loaded profile");

        let mut control = self.control();
        control.profile = profile;
        control.pending = settings;
        Ok(())
    }

    fn set_field(&self, field: Field) -> Result<(), RadarWriteError> {
        if let Field::FramePeriodicityMs(0) = field {
            return Err(RadarWriteError::Rejected(format!(
                "{} must be positive",
                field.name()
            )));
        }
        self.control().pending.apply(field);
        Ok(())
    }

    fn commit(&self) -> Result<(), RadarWriteError> {
        let mut control = self.control();
        if control.generator.is_some() {
            return Err(RadarWriteError::Rejected(
                "configuration while sensing".to_owned(),
            ));
        }
        // One line per profile command goes over the control port
        for _ in control.profile.commands() {
            thread::sleep(self.params.timing.control());
        }
        control.active = Some(control.pending.clone());
        Ok(())
    }

    fn sensor_start(&self) -> Result<(), RadarWriteError> {
        let mut control = self.control();
        if control.generator.is_some() {
            return Ok(());
        }
        let Some(settings) = control.active.clone() else {
            return Err(RadarWriteError::Rejected(
                "no configuration committed".to_owned(),
            ));
        };

        let period = self.frame_period(&settings);
        let frames = self.frames.clone();
        let mut scene = Scene::new(settings, self.seed);
        let (stop, stopped) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("mmwave-sim".to_owned())
            .spawn(move || loop {
                match stopped.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => frames.publish(scene.next_frame()),
                    _ => break,
                }
            })
            .map_err(|e| RadarWriteError::Rejected(e.to_string()))?;

        debug!(period_ms = period.as_millis() as u64, "frame generator running");
        control.generator = Some(Generator { stop, handle });
        Ok(())
    }

    fn sensor_stop(&self) -> Result<(), RadarWriteError> {
        let generator = self.control().generator.take();
        if let Some(generator) = generator {
            let _ = generator.stop.send(());
            if generator.handle.join().is_err() {
                warn!("frame generator panicked");
            }
        }
        Ok(())
    }

    fn current_state(&self) -> Result<DeviceState, RadarReadError> {
        Ok(match self.control().generator {
            Some(_) => DeviceState::Started,
            None => DeviceState::Stopped,
        })
    }

    fn detected_points(&self, wait_new: bool) -> Result<Vec<Point>, RadarReadError> {
        let latest = self
            .frames
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut latest = if wait_new {
            let (latest, _) = self
                .frames
                .fresh
                .wait_timeout_while(latest, self.params.timing.data(), |latest| {
                    latest.sequence == latest.delivered
                })
                .unwrap_or_else(PoisonError::into_inner);
            if latest.sequence == latest.delivered {
                return Err(RadarReadError::Timeout);
            }
            latest
        } else {
            latest
        };
        latest.delivered = latest.sequence;
        Ok(latest.points.clone())
    }

    fn parse_time_interval(&self) -> f64 {
        self.params.timing.parse_time_interval
    }
}

impl Drop for SimulatedDevice {
    fn drop(&mut self) {
        let _ = self.sensor_stop();
    }
}

impl FrameSlot {
    fn publish(&self, points: Vec<Point>) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.sequence += 1;
        latest.points = points;
        self.fresh.notify_all();
    }
}

#[derive(Debug, Clone, Copy)]
struct Target {
    radius: f32,
    phase: f32,
    speed: f32,
    height: f32,
    snr_db: f32,
}

struct Scene {
    settings: DeviceSettings,
    rng: StdRng,
    targets: Vec<Target>,
    frame: u64,
}

impl Scene {
    fn new(settings: DeviceSettings, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let targets = (0..6)
            .map(|_| Target {
                radius: rng.random_range(0.5..2.5),
                phase: rng.random_range(0.0..std::f32::consts::TAU),
                speed: rng.random_range(-0.2..0.2),
                height: rng.random_range(-1.0..1.5),
                snr_db: rng.random_range(8.0..30.0),
            })
            .collect();
        Self {
            settings,
            rng,
            targets,
            frame: 0,
        }
    }

    fn next_frame(&mut self) -> Vec<Point> {
        self.frame += 1;
        if !self.settings.detected_objects {
            return Vec::new();
        }

        let t = self.frame as f32;
        let mut points = Vec::new();
        for target in self.targets.clone() {
            let snr = target.snr_db + self.rng.random_range(-3.0..3.0);
            if snr < self.settings.cfar_threshold_db {
                continue;
            }
            let angle = target.phase + target.speed * t;
            points.push(Point::new(
                target.radius * angle.cos() + self.rng.random_range(-0.05..0.05),
                2.5 + target.radius * angle.sin() + self.rng.random_range(-0.05..0.05),
                target.height + self.rng.random_range(-0.05..0.05),
            ));
        }
        if !self.settings.remove_static_clutter {
            points.extend(STATIC_CLUTTER.map(Point::from));
        }
        points
    }
}
