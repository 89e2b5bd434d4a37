pub mod driver;
pub mod error;
pub mod profile;
pub mod simulated;
pub mod system;

#[cfg(test)]
mod testing;

pub use driver::{DeviceSettings, DeviceState, Field, MmWaveDriver};
pub use error::RadarError;
pub use simulated::SimulatedDevice;
pub use system::RadarSystem;
