use crate::{
    driver::{DeviceSettings, DeviceState, Field, MmWaveDriver},
    error::{RadarInitError, RadarReadError, RadarWriteError},
};
use mmwave_core::{config::ConnectionParams, point::Point};
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    thread,
    time::Duration,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Stop,
    Start,
    State,
    LoadConfig(PathBuf),
    SetField(Field),
    Commit(DeviceSettings),
    Points(bool),
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fail {
    Stop,
    Start,
    State,
    Load,
    Field(usize),
    Commit,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Vec<Call>,
    state: DeviceState,
    pending: DeviceSettings,
    fields_set: usize,
    fail: Option<Fail>,
    frames: VecDeque<Vec<Point>>,
}

/// Driver double that records every call it receives.
#[derive(Debug)]
pub struct RecordingDriver {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Debug, Clone)]
pub struct CallLog {
    shared: Arc<Mutex<Shared>>,
}

impl RecordingDriver {
    pub fn new(state: DeviceState) -> (Self, CallLog) {
        let shared = Arc::new(Mutex::new(Shared {
            state,
            ..Default::default()
        }));
        (
            Self {
                shared: shared.clone(),
            },
            CallLog { shared },
        )
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap()
    }

    fn record(&self, call: Call, fail: Fail) -> Result<MutexGuard<'_, Shared>, ()> {
        let mut shared = self.shared();
        shared.calls.push(call);
        if shared.fail == Some(fail) {
            return Err(());
        }
        Ok(shared)
    }
}

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.shared.lock().unwrap().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn state(&self) -> DeviceState {
        self.shared.lock().unwrap().state
    }

    pub fn fail(&self, fail: Fail) {
        self.shared.lock().unwrap().fail = Some(fail);
    }

    pub fn push_frame(&self, points: Vec<Point>) {
        self.shared.lock().unwrap().frames.push_back(points);
    }
}

impl MmWaveDriver for RecordingDriver {
    fn connect(params: &ConnectionParams) -> Result<Self, RadarInitError> {
        if params.command_port.is_empty() {
            return Err(RadarInitError::PortUnavailable("CLI Port".to_owned()));
        }
        Ok(Self::new(DeviceState::Stopped).0)
    }

    fn load_config_file(&self, path: &Path) -> Result<(), RadarInitError> {
        self.record(Call::LoadConfig(path.to_owned()), Fail::Load)
            .map(|_| ())
            .map_err(|_| RadarInitError::InaccessibleConfig(path.display().to_string()))
    }

    fn set_field(&self, field: Field) -> Result<(), RadarWriteError> {
        let mut shared = self.shared();
        shared.calls.push(Call::SetField(field));
        let index = shared.fields_set;
        shared.fields_set += 1;
        if shared.fail == Some(Fail::Field(index)) {
            return Err(RadarWriteError::Rejected(field.name().to_owned()));
        }
        shared.pending.apply(field);
        Ok(())
    }

    fn commit(&self) -> Result<(), RadarWriteError> {
        let pending = self.shared().pending.clone();
        self.record(Call::Commit(pending), Fail::Commit)
            .map(|_| ())
            .map_err(|_| RadarWriteError::Rejected("commit".to_owned()))
    }

    fn sensor_start(&self) -> Result<(), RadarWriteError> {
        let shared = self
            .record(Call::Start, Fail::Start)
            .map_err(|_| RadarWriteError::Disconnected)?;
        drop(shared);
        // Widen the window between state check and command for race tests
        thread::sleep(Duration::from_millis(2));
        self.shared().state = DeviceState::Started;
        Ok(())
    }

    fn sensor_stop(&self) -> Result<(), RadarWriteError> {
        let mut shared = self
            .record(Call::Stop, Fail::Stop)
            .map_err(|_| RadarWriteError::Disconnected)?;
        shared.state = DeviceState::Stopped;
        Ok(())
    }

    fn current_state(&self) -> Result<DeviceState, RadarReadError> {
        self.record(Call::State, Fail::State)
            .map(|shared| shared.state)
            .map_err(|_| RadarReadError::Disconnected)
    }

    fn detected_points(&self, wait_new: bool) -> Result<Vec<Point>, RadarReadError> {
        let mut shared = self.shared();
        shared.calls.push(Call::Points(wait_new));
        Ok(shared.frames.pop_front().unwrap_or_default())
    }

    fn parse_time_interval(&self) -> f64 {
        0.5
    }
}

impl Drop for RecordingDriver {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.calls.push(Call::Release);
        }
    }
}
