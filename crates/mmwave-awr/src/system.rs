use crate::{
    driver::{DeviceState, Field, MmWaveDriver},
    error::{ConfigStep, RadarError, SensorCommand},
};
use mmwave_core::{config::RadarConfiguration, point::Point};
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use tracing::{debug, error, info, instrument, warn};

/// Owns one configured radar for the length of a sensing session.
///
/// The device is stopped and released when the system is dropped, whichever
/// way the owning scope is left. A system that failed to configure is never
/// handed out, but is still stopped and released before the error returns.
#[derive(Debug)]
pub struct RadarSystem<D: MmWaveDriver> {
    device: D,
    configuration: RadarConfiguration,
    lifecycle: Mutex<()>,
}

impl<D: MmWaveDriver> RadarSystem<D> {
    #[instrument(skip_all, fields(platform=%configuration.connection.platform))]
    pub fn connect(configuration: &RadarConfiguration) -> Result<Self, RadarError> {
        let timer = Instant::now();
        let device = D::connect(&configuration.connection).map_err(RadarError::Connection)?;
        info!(
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "millimeter wave device connection completed"
        );
        Self::with_device(device, configuration)
    }

    /// Configure an already connected device.
    #[instrument(skip_all, fields(profile=%configuration.profile.display()))]
    pub fn with_device(device: D, configuration: &RadarConfiguration) -> Result<Self, RadarError> {
        let system = Self {
            device,
            configuration: configuration.clone(),
            lifecycle: Mutex::new(()),
        };
        system.configure()?;
        Ok(system)
    }

    fn configure(&self) -> Result<(), RadarError> {
        let timer = Instant::now();
        let configuration = &self.configuration;

        // The device may still be sensing from an earlier session
        self.device
            .sensor_stop()
            .map_err(|e| RadarError::configuration(ConfigStep::Stop, e))?;

        self.device
            .load_config_file(&configuration.profile)
            .map_err(|e| RadarError::configuration(ConfigStep::LoadProfile, e))?;

        let fields = Field::MONITOR.into_iter().chain([
            Field::CfarThresholdDb(configuration.threshold_db),
            Field::RemoveStaticClutter(configuration.remove_static_clutter),
            Field::FramePeriodicityMs(configuration.frame_periodicity_ms),
        ]);
        for field in fields {
            debug!(field = field.name(), value = ?field, "setting field");
            self.device
                .set_field(field)
                .map_err(|e| RadarError::configuration(ConfigStep::SetField(field), e))?;
        }

        self.device
            .commit()
            .map_err(|e| RadarError::configuration(ConfigStep::Commit, e))?;

        info!(
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "millimeter wave device configuration completed"
        );
        Ok(())
    }

    /// Start sensing. Does nothing if the device already reports started.
    #[instrument(skip_all)]
    pub fn start(&self) -> Result<(), RadarError> {
        let _guard = self.lock();
        if self.state()? != DeviceState::Started {
            info!("start millimeter wave device");
            self.device
                .sensor_start()
                .map_err(|source| RadarError::Command {
                    command: SensorCommand::Start,
                    source,
                })?;
        }
        Ok(())
    }

    /// Stop sensing. Does nothing if the device already reports stopped.
    #[instrument(skip_all)]
    pub fn stop(&self) -> Result<(), RadarError> {
        let _guard = self.lock();
        if self.state()? != DeviceState::Stopped {
            info!("turn off millimeter wave device");
            self.device
                .sensor_stop()
                .map_err(|source| RadarError::Command {
                    command: SensorCommand::Stop,
                    source,
                })?;
        }
        Ok(())
    }

    /// Live device state, never cached.
    pub fn state(&self) -> Result<DeviceState, RadarError> {
        self.device.current_state().map_err(RadarError::StateQuery)
    }

    pub fn detected_points(&self, wait_new: bool) -> Result<Vec<Point>, RadarError> {
        self.device
            .detected_points(wait_new)
            .map_err(RadarError::Read)
    }

    pub fn configuration(&self) -> &RadarConfiguration {
        &self.configuration
    }

    pub fn parse_time_interval(&self) -> f64 {
        self.device.parse_time_interval()
    }

    /// Stop the device and release it.
    pub fn teardown(self) {
        drop(self)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: MmWaveDriver> Drop for RadarSystem<D> {
    fn drop(&mut self) {
        match self.stop() {
            Ok(()) => {}
            Err(RadarError::StateQuery(e)) => {
                warn!(error=%e, "radar state unreadable during teardown, forcing stop");
                if let Err(e) = self.device.sensor_stop() {
                    error!(error=%e, "unable to stop radar during teardown");
                }
            }
            Err(e) => error!(error=%e, "unable to stop radar during teardown"),
        }
        info!("release millimeter wave device");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::DeviceSettings,
        error::ConfigSource,
        testing::{Call, Fail, RecordingDriver},
    };
    use std::{sync::Arc, thread};

    fn configuration() -> RadarConfiguration {
        RadarConfiguration {
            profile: "Profile-4.cfg".into(),
            threshold_db: 14.0,
            remove_static_clutter: true,
            frame_periodicity_ms: 1000,
            ..Default::default()
        }
    }

    fn commands(calls: &[Call]) -> Vec<Call> {
        calls
            .iter()
            .filter(|call| !matches!(call, Call::State))
            .cloned()
            .collect()
    }

    #[test]
    pub fn test_construction_order() {
        let (driver, log) = RecordingDriver::new(DeviceState::Started);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();

        let calls = commands(&log.calls());
        assert_eq!(calls.first(), Some(&Call::Stop));
        assert_eq!(calls.get(1), Some(&Call::LoadConfig("Profile-4.cfg".into())));
        assert!(matches!(calls.last(), Some(Call::Commit(_))));
        assert_eq!(log.count(|c| matches!(c, Call::Stop)), 1);
        assert_eq!(log.count(|c| matches!(c, Call::Commit(_))), 1);
        assert_eq!(log.count(|c| matches!(c, Call::Start)), 0);
        assert_eq!(system.state().unwrap(), DeviceState::Stopped);
    }

    #[test]
    pub fn test_fields_applied_in_order() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let _system = RadarSystem::with_device(driver, &configuration()).unwrap();

        let fields: Vec<Field> = log
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetField(field) => Some(field),
                _ => None,
            })
            .collect();

        let mut expected = Field::MONITOR.to_vec();
        expected.extend([
            Field::CfarThresholdDb(14.0),
            Field::RemoveStaticClutter(true),
            Field::FramePeriodicityMs(1000),
        ]);
        assert_eq!(fields, expected);
    }

    #[test]
    pub fn test_commit_payload() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let _system = RadarSystem::with_device(driver, &configuration()).unwrap();

        let committed = log
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::Commit(settings) => Some(settings),
                _ => None,
            })
            .unwrap();

        assert_eq!(committed.cfar_threshold_db, 14.0);
        assert!(committed.remove_static_clutter);
        assert_eq!(committed.frame_periodicity_ms, 1000);
        assert!(committed.detected_objects);
        assert!(!committed.log_magnitude_range);
        assert!(!committed.noise_profile);
        assert!(!committed.range_azimuth_heat_map);
        assert!(!committed.range_doppler_heat_map);
        assert!(!committed.stats_info);
        assert_ne!(committed, DeviceSettings::default());
    }

    #[test]
    pub fn test_start_is_idempotent() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();

        system.start().unwrap();
        system.start().unwrap();

        assert_eq!(log.count(|c| matches!(c, Call::Start)), 1);
        assert_eq!(system.state().unwrap(), DeviceState::Started);
    }

    #[test]
    pub fn test_stop_is_idempotent() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();
        system.start().unwrap();
        let before = log.count(|c| matches!(c, Call::Stop));

        system.stop().unwrap();
        system.stop().unwrap();

        assert_eq!(log.count(|c| matches!(c, Call::Stop)) - before, 1);
    }

    #[test]
    pub fn test_concurrent_start_issues_one_command() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let system = Arc::new(RadarSystem::with_device(driver, &configuration()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let system = system.clone();
                thread::spawn(move || system.start())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(log.count(|c| matches!(c, Call::Start)), 1);
    }

    #[test]
    pub fn test_teardown_stops_started_device() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();
        system.start().unwrap();

        system.teardown();

        assert_eq!(log.state(), DeviceState::Stopped);
        assert_eq!(log.calls().last(), Some(&Call::Release));
        assert_eq!(log.count(|c| matches!(c, Call::Release)), 1);
    }

    #[test]
    pub fn test_drop_on_early_return_stops_device() {
        fn session(driver: RecordingDriver) -> Result<(), RadarError> {
            let system = RadarSystem::with_device(driver, &configuration())?;
            system.start()?;
            Err(RadarError::Read(crate::error::RadarReadError::Timeout))
        }

        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        assert!(session(driver).is_err());
        assert_eq!(log.state(), DeviceState::Stopped);
        assert_eq!(log.count(|c| matches!(c, Call::Release)), 1);
    }

    #[test]
    pub fn test_failed_commit_aborts_construction() {
        let (driver, log) = RecordingDriver::new(DeviceState::Started);
        log.fail(Fail::Commit);

        let result = RadarSystem::with_device(driver, &configuration());

        assert!(matches!(
            result,
            Err(RadarError::Configuration {
                step: ConfigStep::Commit,
                source: ConfigSource::Write(_),
            })
        ));
        assert_eq!(log.state(), DeviceState::Stopped);
        assert_eq!(log.count(|c| matches!(c, Call::Start)), 0);
        assert_eq!(log.count(|c| matches!(c, Call::Release)), 1);
    }

    #[test]
    pub fn test_failed_profile_load_aborts_construction() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        log.fail(Fail::Load);

        let result = RadarSystem::with_device(driver, &configuration());

        assert!(matches!(
            result,
            Err(RadarError::Configuration {
                step: ConfigStep::LoadProfile,
                source: ConfigSource::Init(_),
            })
        ));
        assert_eq!(log.count(|c| matches!(c, Call::SetField(_))), 0);
        assert_eq!(log.count(|c| matches!(c, Call::Commit(_))), 0);
    }

    #[test]
    pub fn test_failed_initial_stop_aborts_construction() {
        let (driver, log) = RecordingDriver::new(DeviceState::Started);
        log.fail(Fail::Stop);

        let result = RadarSystem::with_device(driver, &configuration());

        assert!(matches!(
            result,
            Err(RadarError::Configuration {
                step: ConfigStep::Stop,
                ..
            })
        ));
        assert_eq!(log.count(|c| matches!(c, Call::LoadConfig(_))), 0);
        assert_eq!(log.count(|c| matches!(c, Call::Release)), 1);
    }

    #[test]
    pub fn test_failed_field_names_the_field() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        log.fail(Fail::Field(6));

        let result = RadarSystem::with_device(driver, &configuration());

        match result {
            Err(RadarError::Configuration {
                step: ConfigStep::SetField(field),
                ..
            }) => assert_eq!(field, Field::CfarThresholdDb(14.0)),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    pub fn test_start_failure_propagates() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();
        log.fail(Fail::Start);

        let result = system.start();

        assert!(matches!(
            result,
            Err(RadarError::Command {
                command: SensorCommand::Start,
                ..
            })
        ));
        assert_eq!(log.count(|c| matches!(c, Call::Start)), 1);
    }

    #[test]
    pub fn test_teardown_forces_stop_when_state_unreadable() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();
        system.start().unwrap();
        log.fail(Fail::State);

        system.teardown();

        assert_eq!(log.state(), DeviceState::Stopped);
        assert_eq!(log.count(|c| matches!(c, Call::Release)), 1);
    }

    #[test]
    pub fn test_detected_points_forwards_wait_flag() {
        let (driver, log) = RecordingDriver::new(DeviceState::Stopped);
        log.push_frame(vec![Point::new(1.0, 2.0, 0.5), Point::new(-1.0, 0.5, 0.2)]);
        let system = RadarSystem::with_device(driver, &configuration()).unwrap();

        let points = system.detected_points(false).unwrap();
        let empty = system.detected_points(true).unwrap();

        assert_eq!(points.len(), 2);
        assert!(empty.is_empty());
        assert_eq!(log.count(|c| matches!(c, Call::Points(false))), 1);
        assert_eq!(log.count(|c| matches!(c, Call::Points(true))), 1);
    }

    #[test]
    pub fn test_connection_failure() {
        let mut configuration = configuration();
        configuration.connection.command_port = String::new();

        let result = RadarSystem::<RecordingDriver>::connect(&configuration);

        assert!(matches!(result, Err(RadarError::Connection(_))));
    }
}
