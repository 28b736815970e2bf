//! Accelerometer bias calibration
//!
//! The robot must be stationary on a level surface. The mean of each axis is
//! the bias; standard gravity is removed from the vertical axis so the bias
//! only holds the sensor's own offset.

use super::Calibrator;
use super::stats::AxisStats;
use crate::config::ImuCalibrationConfig;
use crate::drivers::{SharedClock, SharedImu};
use crate::error::{Error, Result};
use crate::record::{CalibrationRecord, STANDARD_GRAVITY};

/// Stationary inertial unit calibrator
pub struct ImuCalibrator {
    imu: SharedImu,
    clock: SharedClock,
    config: ImuCalibrationConfig,
}

impl ImuCalibrator {
    pub fn new(imu: SharedImu, clock: SharedClock, config: ImuCalibrationConfig) -> Self {
        Self { imu, clock, config }
    }
}

impl Calibrator for ImuCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        log::info!("Starting IMU calibration");

        let mut accel = AxisStats::new();
        for _ in 0..self.config.samples {
            let sample = self.imu.lock().read().map_err(|e| {
                log::error!("Failed to read IMU: {}", e);
                Error::SensorRead("IMU")
            })?;
            accel.push(sample.accel);
            self.clock.delay_ms(self.config.interval_ms);
        }

        if accel.count() == 0 {
            log::error!("IMU calibration collected no samples");
            return Err(Error::NoSamples("IMU"));
        }

        let mean = accel.mean();
        let stddev = accel.stddev();
        let bias = [mean[0], mean[1], mean[2] - STANDARD_GRAVITY];

        log::info!(
            "IMU Calibration: bias=({:.3}, {:.3}, {:.3}) m/s², stddev=({:.3}, {:.3}, {:.3}) m/s²",
            bias[0],
            bias[1],
            bias[2],
            stddev[0],
            stddev[1],
            stddev[2]
        );

        let worst = stddev.iter().copied().fold(0.0f32, f32::max);
        if worst > self.config.max_stddev {
            log::error!("IMU noise too high, robot may not be stationary");
            return Err(Error::NoiseTooHigh {
                sensor: "IMU",
                stddev: worst,
                limit: self.config.max_stddev,
            });
        }

        record.imu.bias = bias;
        record.imu.scale = [1.0; 3];

        log::info!("IMU calibration complete");
        Ok(())
    }
}
