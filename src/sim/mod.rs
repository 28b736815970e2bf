//! Simulated robot hardware
//!
//! Hardware-free stand-ins for every sensor the calibration core talks to,
//! driven by a [`SimClock`] so that blocking waits cost no wall time.
//!
//! | Sensor | Simulation |
//! |--------|------------|
//! | IMU | Gravity on +Z, constant bias, optional bias drift |
//! | Magnetometer | Ellipsoid traced by in-place rotation, hard iron offset |
//! | Drive base | Per-wheel resolution with slip, move advances the clock |
//! | Range finder | Biased reading of a fixed target, -1 on failure |
//! | Battery / thermometer | Constant values with noise |
//!
//! Example configuration:
//!
//! ```toml
//! [device]
//! type = "sim"
//!
//! [device.sim]
//! random_seed = 42      # 0 = random each run
//!
//! [device.sim.drive]
//! pulses_per_meter_left = 1012.0
//! pulses_per_meter_right = 988.0
//! ```

pub mod clock;
pub mod config;
pub mod drive_sim;
pub mod imu_sim;
pub mod noise;
pub mod sensor_sim;

pub use clock::SimClock;
pub use config::SimConfig;
pub use drive_sim::SimDrive;
pub use imu_sim::{SimImu, SimMagnetometer};
pub use noise::NoiseGenerator;
pub use sensor_sim::{SimBattery, SimRange, SimThermometer};

use crate::devices::SensorSuite;
use crate::drivers::SharedClock;
use parking_lot::Mutex;
use std::sync::Arc;

/// Build the full simulated sensor set on a shared clock
pub fn sensor_suite(config: &SimConfig, clock: SharedClock) -> SensorSuite {
    let mut noise = NoiseGenerator::new(config.random_seed);

    log::info!(
        "Simulated hardware (seed: {})",
        if config.random_seed == 0 {
            "random".to_string()
        } else {
            config.random_seed.to_string()
        }
    );

    SensorSuite {
        imu: Arc::new(Mutex::new(SimImu::new(
            &config.imu,
            clock.clone(),
            noise.fork(),
        ))),
        magnetometer: Box::new(SimMagnetometer::new(
            &config.magnetometer,
            clock.clone(),
            noise.fork(),
        )),
        drive: Box::new(SimDrive::new(&config.drive, clock.clone(), noise.fork())),
        range: Box::new(SimRange::new(&config.ranging, noise.fork())),
        battery: Box::new(SimBattery::new(
            &config.battery,
            clock.clone(),
            noise.fork(),
        )),
        temperature: Box::new(SimThermometer::new(
            &config.temperature,
            clock.clone(),
            noise.fork(),
        )),
        clock,
    }
}
