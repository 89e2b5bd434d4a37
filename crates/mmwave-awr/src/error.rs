use crate::driver::Field;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadarInitError {
    #[error("Port unavailable: {0}")]
    PortUnavailable(String),
    #[error("Port conflict: {0}")]
    PortConflict(String),
    #[error("Inaccessible config: {0}")]
    InaccessibleConfig(String),
    #[error("Malformed config: {0}")]
    MalformedConfig(String),
}

#[derive(Debug, Error)]
pub enum RadarReadError {
    #[error("Disconnected")]
    Disconnected,
    #[error("Timeout")]
    Timeout,
    #[error("Not Connected")]
    NotConnected,
}

#[derive(Debug, Error)]
pub enum RadarWriteError {
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Disconnected")]
    Disconnected,
}

/// The step of bringing up a session that failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigStep {
    Stop,
    LoadProfile,
    SetField(Field),
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCommand {
    Start,
    Stop,
}

#[derive(Debug, Error)]
pub enum ConfigSource {
    #[error(transparent)]
    Init(#[from] RadarInitError),
    #[error(transparent)]
    Write(#[from] RadarWriteError),
}

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("Unable to connect to radar: {0}")]
    Connection(#[source] RadarInitError),
    #[error("Radar rejected configuration at {step}: {source}")]
    Configuration {
        step: ConfigStep,
        #[source]
        source: ConfigSource,
    },
    #[error("Radar rejected {command}: {source}")]
    Command {
        command: SensorCommand,
        #[source]
        source: RadarWriteError,
    },
    #[error("Unable to read radar state: {0}")]
    StateQuery(#[source] RadarReadError),
    #[error("Unable to read detected points: {0}")]
    Read(#[source] RadarReadError),
}

impl RadarError {
    pub(crate) fn configuration(step: ConfigStep, source: impl Into<ConfigSource>) -> Self {
        RadarError::Configuration {
            step,
            source: source.into(),
        }
    }
}

impl Display for ConfigStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigStep::Stop => f.write_str("stop"),
            ConfigStep::LoadProfile => f.write_str("profile load"),
            ConfigStep::SetField(field) => write!(f, "field {}", field.name()),
            ConfigStep::Commit => f.write_str("commit"),
        }
    }
}

impl Display for SensorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorCommand::Start => f.write_str("sensorStart"),
            SensorCommand::Stop => f.write_str("sensorStop"),
        }
    }
}
