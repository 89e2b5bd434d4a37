use crate::{driver::DeviceSettings, error::RadarInitError};

/// Lifecycle commands that a profile may carry but that are never replayed
/// as configuration.
const LIFECYCLE: [&str; 3] = ["sensorStart", "sensorStop", "flushCfg"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// A device profile: the ordered configuration commands of a `.cfg` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    commands: Vec<ProfileCommand>,
}

impl Profile {
    pub fn parse(text: &str) -> Result<Self, RadarInitError> {
        let commands = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('%'))
            .filter_map(|line| {
                let mut words = line.split_whitespace();
                let name = words.next()?;
                if LIFECYCLE.contains(&name) {
                    return None;
                }
                Some(ProfileCommand {
                    name: name.to_owned(),
                    args: words.map(str::to_owned).collect(),
                })
            })
            .collect::<Vec<_>>();

        let profile = Self { commands };
        // Reject early if the commands we rely on are malformed
        profile.settings()?;
        Ok(profile)
    }

    pub fn commands(&self) -> &[ProfileCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn find(&self, name: &str) -> Option<&ProfileCommand> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Settings the profile establishes before any field is overridden.
    pub fn settings(&self) -> Result<DeviceSettings, RadarInitError> {
        let mut settings = DeviceSettings::default();

        if let Some(command) = self.find("guiMonitor") {
            // Newer firmware prefixes a sub-frame index, so read from the end
            let flags = command
                .args
                .iter()
                .rev()
                .take(6)
                .rev()
                .map(|arg| parse_flag(command, arg))
                .collect::<Result<Vec<bool>, _>>()?;
            let [detected, log_magnitude, noise, azimuth, doppler, stats] = flags[..] else {
                return Err(malformed(command, "expected six monitor flags"));
            };
            settings.detected_objects = detected;
            settings.log_magnitude_range = log_magnitude;
            settings.noise_profile = noise;
            settings.range_azimuth_heat_map = azimuth;
            settings.range_doppler_heat_map = doppler;
            settings.stats_info = stats;
        }

        if let Some(command) = self.find("clutterRemoval") {
            let flag = command
                .args
                .last()
                .ok_or_else(|| malformed(command, "missing enable flag"))?;
            settings.remove_static_clutter = parse_flag(command, flag)?;
        }

        if let Some(command) = self.find("frameCfg") {
            let periodicity = command
                .args
                .get(4)
                .ok_or_else(|| malformed(command, "missing frame periodicity"))?
                .parse::<f32>()
                .map_err(|e| malformed(command, &e.to_string()))?;
            settings.frame_periodicity_ms = periodicity.round().max(1.0) as u32;
        }

        Ok(settings)
    }
}

fn parse_flag(command: &ProfileCommand, arg: &str) -> Result<bool, RadarInitError> {
    arg.parse::<i32>()
        .map(|value| value != 0)
        .map_err(|e| malformed(command, &e.to_string()))
}

fn malformed(command: &ProfileCommand, reason: &str) -> RadarInitError {
    RadarInitError::MalformedConfig(format!("{}: {}", command.name, reason))
}
