//! Per-sensor calibrators
//!
//! Each calibrator samples its sensor through a driver trait, derives the
//! correction coefficients, and on success writes only its own fields of the
//! [`CalibrationRecord`]. A failed stage leaves the record untouched.
//!
//! | Sensor | Sampling | Coefficients |
//! |--------|----------|--------------|
//! | Inertial | 100 × 10 ms, stationary | accel bias (gravity removed), unit scale |
//! | Magnetic | 30 s sweep at 50 ms | hard iron offset, soft iron scale |
//! | Odometry | 1 m straight move | pulses per meter per wheel |
//! | Ranging | 50 × 20 ms at 1 m target | distance offset |
//! | Camera | none | nominal intrinsics |
//! | Battery | 10 × 100 ms | voltage offset |
//! | Temperature | 10 × 100 ms | temperature offset |
//!
//! All sampling loops block on the shared [`Clock`](crate::drivers::Clock).

pub mod battery;
pub mod camera;
pub mod imu;
pub mod magnetometer;
pub mod odometry;
pub mod ranging;
pub mod stats;
pub mod temperature;

pub use battery::BatteryCalibrator;
pub use camera::CameraCalibrator;
pub use imu::ImuCalibrator;
pub use magnetometer::MagCalibrator;
pub use odometry::OdometryCalibrator;
pub use ranging::RangingCalibrator;
pub use temperature::TemperatureCalibrator;

use crate::config::CalibrationConfig;
use crate::devices::SensorSuite;
use crate::error::Result;
use crate::record::CalibrationRecord;
use std::fmt;

/// Calibrated sensors, in sequencing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    Inertial,
    Magnetic,
    Odometry,
    Ranging,
    Camera,
    Battery,
    Temperature,
}

impl Sensor {
    /// Every sensor in the order the sequencer visits them
    pub const ALL: [Sensor; 7] = [
        Sensor::Inertial,
        Sensor::Magnetic,
        Sensor::Odometry,
        Sensor::Ranging,
        Sensor::Camera,
        Sensor::Battery,
        Sensor::Temperature,
    ];

    /// First stage of a run
    pub const fn first() -> Self {
        Sensor::Inertial
    }

    /// Following stage, `None` after the last sensor
    pub const fn next(self) -> Option<Self> {
        match self {
            Sensor::Inertial => Some(Sensor::Magnetic),
            Sensor::Magnetic => Some(Sensor::Odometry),
            Sensor::Odometry => Some(Sensor::Ranging),
            Sensor::Ranging => Some(Sensor::Camera),
            Sensor::Camera => Some(Sensor::Battery),
            Sensor::Battery => Some(Sensor::Temperature),
            Sensor::Temperature => None,
        }
    }

    /// Human-readable name used in logs
    pub const fn name(self) -> &'static str {
        match self {
            Sensor::Inertial => "IMU",
            Sensor::Magnetic => "Magnetometer",
            Sensor::Odometry => "Odometer",
            Sensor::Ranging => "Ranging",
            Sensor::Camera => "Camera",
            Sensor::Battery => "Battery",
            Sensor::Temperature => "Temperature",
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One calibration stage
pub trait Calibrator: Send {
    /// Run the stage, blocking for its full sampling window
    ///
    /// On `Ok` the calibrator's own fields in `record` hold the new
    /// coefficients. On `Err` the record is unchanged.
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()>;
}

/// The seven calibrators, one per [`Sensor`]
pub struct CalibrationSuite {
    pub inertial: Box<dyn Calibrator>,
    pub magnetic: Box<dyn Calibrator>,
    pub odometry: Box<dyn Calibrator>,
    pub ranging: Box<dyn Calibrator>,
    pub camera: Box<dyn Calibrator>,
    pub battery: Box<dyn Calibrator>,
    pub temperature: Box<dyn Calibrator>,
}

impl CalibrationSuite {
    /// Build the standard calibrators over a set of sensor drivers
    pub fn standard(config: &CalibrationConfig, sensors: SensorSuite) -> Self {
        let SensorSuite {
            clock,
            imu,
            magnetometer,
            drive,
            range,
            battery,
            temperature,
        } = sensors;

        Self {
            inertial: Box::new(ImuCalibrator::new(
                imu,
                clock.clone(),
                config.imu.clone(),
            )),
            magnetic: Box::new(MagCalibrator::new(
                magnetometer,
                clock.clone(),
                config.magnetometer.clone(),
            )),
            odometry: Box::new(OdometryCalibrator::new(
                drive,
                clock.clone(),
                config.odometry.clone(),
            )),
            ranging: Box::new(RangingCalibrator::new(
                range,
                clock.clone(),
                config.ranging.clone(),
            )),
            camera: Box::new(CameraCalibrator),
            battery: Box::new(BatteryCalibrator::new(
                battery,
                clock.clone(),
                config.battery.clone(),
            )),
            temperature: Box::new(TemperatureCalibrator::new(
                temperature,
                clock,
                config.temperature.clone(),
            )),
        }
    }

    /// Calibrator responsible for `sensor`
    pub fn get_mut(&mut self, sensor: Sensor) -> &mut dyn Calibrator {
        match sensor {
            Sensor::Inertial => self.inertial.as_mut(),
            Sensor::Magnetic => self.magnetic.as_mut(),
            Sensor::Odometry => self.odometry.as_mut(),
            Sensor::Ranging => self.ranging.as_mut(),
            Sensor::Camera => self.camera.as_mut(),
            Sensor::Battery => self.battery.as_mut(),
            Sensor::Temperature => self.temperature.as_mut(),
        }
    }
}
