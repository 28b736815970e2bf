//! Hardware backends
//!
//! Bundles the sensor drivers and persistent store selected by
//! `[device] type`.

use crate::config::AppConfig;
use crate::drivers::{
    BatteryDriver, ByteStore, DriveBase, FileStore, MagnetometerDriver, RangeDriver, SharedClock,
    SharedImu, SystemClock, TemperatureDriver,
};
use crate::error::{Error, Result};
use crate::sim::{self, SimClock};
use std::sync::Arc;

/// Sensor drivers consumed by the calibrators
///
/// The IMU is shared so the drift monitor can sample it between runs.
pub struct SensorSuite {
    pub clock: SharedClock,
    pub imu: SharedImu,
    pub magnetometer: Box<dyn MagnetometerDriver>,
    pub drive: Box<dyn DriveBase>,
    pub range: Box<dyn RangeDriver>,
    pub battery: Box<dyn BatteryDriver>,
    pub temperature: Box<dyn TemperatureDriver>,
}

/// Sensors plus the store holding the calibration record
pub struct Hardware {
    pub sensors: SensorSuite,
    pub store: Box<dyn ByteStore>,
}

/// Create the hardware backend based on configuration
pub fn create_hardware(config: &AppConfig) -> Result<Hardware> {
    match config.device.device_type.as_str() {
        "sim" => {
            let sim_config = &config.device.sim;
            let clock: SharedClock = if sim_config.realtime {
                Arc::new(SystemClock::new())
            } else {
                Arc::new(SimClock::new())
            };

            let store = FileStore::open(&config.storage.path, config.storage.size)?;
            log::info!(
                "Calibration storage: {} ({} bytes)",
                store.path().display(),
                store.capacity()
            );

            Ok(Hardware {
                sensors: sim::sensor_suite(sim_config, clock),
                store: Box::new(store),
            })
        }
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}
