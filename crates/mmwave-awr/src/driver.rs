use crate::error::{RadarInitError, RadarReadError, RadarWriteError};
use mmwave_core::{config::ConnectionParams, point::Point};
use std::{fmt::Display, path::Path};

#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub enum DeviceState {
    #[default]
    Stopped,
    Started,
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceState::Stopped => f.write_str("Sensor_Stop"),
            DeviceState::Started => f.write_str("Sensor_Start"),
        }
    }
}

/// A single typed device setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    DetectedObjects(bool),
    LogMagnitudeRange(bool),
    NoiseProfile(bool),
    RangeAzimuthHeatMap(bool),
    RangeDopplerHeatMap(bool),
    StatsInfo(bool),
    CfarThresholdDb(f32),
    RemoveStaticClutter(bool),
    FramePeriodicityMs(u32),
}

impl Field {
    /// Telemetry reduced to the point stream, in the order it is applied.
    pub const MONITOR: [Field; 6] = [
        Field::DetectedObjects(true),
        Field::LogMagnitudeRange(false),
        Field::NoiseProfile(false),
        Field::RangeAzimuthHeatMap(false),
        Field::RangeDopplerHeatMap(false),
        Field::StatsInfo(false),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::DetectedObjects(_) => "guiMonitor.detectedObjects",
            Field::LogMagnitudeRange(_) => "guiMonitor.logMagnitudeRange",
            Field::NoiseProfile(_) => "guiMonitor.noiseProfile",
            Field::RangeAzimuthHeatMap(_) => "guiMonitor.rangeAzimuthHeatMap",
            Field::RangeDopplerHeatMap(_) => "guiMonitor.rangeDopplerHeatMap",
            Field::StatsInfo(_) => "guiMonitor.statsInfo",
            Field::CfarThresholdDb(_) => "cfarCfg.threshold_dB",
            Field::RemoveStaticClutter(_) => "clutterRemoval.enabled",
            Field::FramePeriodicityMs(_) => "frameCfg.framePeriodicity_ms",
        }
    }
}

/// The device-side view of the settings that [`Field`]s write to.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSettings {
    pub detected_objects: bool,
    pub log_magnitude_range: bool,
    pub noise_profile: bool,
    pub range_azimuth_heat_map: bool,
    pub range_doppler_heat_map: bool,
    pub stats_info: bool,
    pub cfar_threshold_db: f32,
    pub remove_static_clutter: bool,
    pub frame_periodicity_ms: u32,
}

impl DeviceSettings {
    pub fn apply(&mut self, field: Field) {
        match field {
            Field::DetectedObjects(v) => self.detected_objects = v,
            Field::LogMagnitudeRange(v) => self.log_magnitude_range = v,
            Field::NoiseProfile(v) => self.noise_profile = v,
            Field::RangeAzimuthHeatMap(v) => self.range_azimuth_heat_map = v,
            Field::RangeDopplerHeatMap(v) => self.range_doppler_heat_map = v,
            Field::StatsInfo(v) => self.stats_info = v,
            Field::CfarThresholdDb(v) => self.cfar_threshold_db = v,
            Field::RemoveStaticClutter(v) => self.remove_static_clutter = v,
            Field::FramePeriodicityMs(v) => self.frame_periodicity_ms = v,
        }
    }

    /// True when nothing but detected points crosses the data channel.
    pub fn is_point_only(&self) -> bool {
        self.detected_objects
            && !self.log_magnitude_range
            && !self.noise_profile
            && !self.range_azimuth_heat_map
            && !self.range_doppler_heat_map
            && !self.stats_info
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            detected_objects: true,
            log_magnitude_range: true,
            noise_profile: false,
            range_azimuth_heat_map: false,
            range_doppler_heat_map: false,
            stats_info: true,
            cfar_threshold_db: 15.0,
            remove_static_clutter: false,
            frame_periodicity_ms: 100,
        }
    }
}

/// Command and query surface of an mmWave demo firmware driver.
///
/// Every method takes `&self`: implementations synchronise internally, so
/// several readers may call [`MmWaveDriver::detected_points`] concurrently.
pub trait MmWaveDriver: Send + Sync {
    fn connect(params: &ConnectionParams) -> Result<Self, RadarInitError>
    where
        Self: Sized;

    /// Load a profile into the pending configuration.
    fn load_config_file(&self, path: &Path) -> Result<(), RadarInitError>;

    fn set_field(&self, field: Field) -> Result<(), RadarWriteError>;

    /// Send the pending configuration to the device.
    fn commit(&self) -> Result<(), RadarWriteError>;

    fn sensor_start(&self) -> Result<(), RadarWriteError>;

    fn sensor_stop(&self) -> Result<(), RadarWriteError>;

    fn current_state(&self) -> Result<DeviceState, RadarReadError>;

    /// With `wait_new`, block until a frame newer than the last retrieval
    /// arrives. Otherwise return the latest frame straight away.
    fn detected_points(&self, wait_new: bool) -> Result<Vec<Point>, RadarReadError>;

    fn parse_time_interval(&self) -> f64;
}
