use crate::bounds::AreaLimit3D;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything the dashboard needs: the radar session and the fixed view bounds.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Configuration {
    pub radar: RadarConfiguration,
    pub detection_limit: AreaLimit3D,
}

impl Configuration {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

#[derive(PartialEq, Hash, Eq, Debug, Copy, Clone, Serialize, Deserialize, Default)]
pub enum Platform {
    #[default]
    #[serde(rename = "xWR14xx")]
    Xwr14xx,
    #[serde(rename = "xWR16xx")]
    Xwr16xx,
    #[serde(rename = "xWR18xx")]
    Xwr18xx,
    #[serde(rename = "xWR68xx")]
    Xwr68xx,
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Xwr14xx => f.write_str("xWR14xx"),
            Platform::Xwr16xx => f.write_str("xWR16xx"),
            Platform::Xwr18xx => f.write_str("xWR18xx"),
            Platform::Xwr68xx => f.write_str("xWR68xx"),
        }
    }
}

/// Pacing used by the driver.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingIntervals {
    /// Pause after each command line written to the control port
    pub control_ms: u64,
    /// Longest a blocking frame read waits before giving up
    pub data_ms: u64,
    /// Raw device frames per logical output frame
    pub parse_time_interval: f64,
}

impl TimingIntervals {
    pub fn control(&self) -> Duration {
        Duration::from_millis(self.control_ms)
    }

    pub fn data(&self) -> Duration {
        Duration::from_millis(self.data_ms)
    }
}

impl Default for TimingIntervals {
    fn default() -> Self {
        Self {
            control_ms: 20,
            data_ms: 5000,
            parse_time_interval: 1.0,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    pub platform: Platform,
    pub command_port: String,
    pub data_port: String,
    pub command_baud: u32,
    pub data_baud: u32,
    pub timing: TimingIntervals,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            command_port: "/dev/ttyACM0".to_owned(),
            data_port: "/dev/ttyACM1".to_owned(),
            command_baud: 115200,
            data_baud: 921600,
            timing: TimingIntervals::default(),
        }
    }
}

/// Parameters applied once while bringing up a radar session.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfiguration {
    pub profile: PathBuf,
    pub threshold_db: f32,
    pub remove_static_clutter: bool,
    pub frame_periodicity_ms: u32,
    pub connection: ConnectionParams,
}

impl Default for RadarConfiguration {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("profiles/profile-xwr14xx.cfg"),
            threshold_db: 14.0,
            remove_static_clutter: true,
            frame_periodicity_ms: 1000,
            connection: ConnectionParams::default(),
        }
    }
}
