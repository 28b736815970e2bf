//! Ranging sensor offset calibration
//!
//! A reference target is placed at a known distance in front of the sensor.
//! The offset is `reference - mean`. A large offset or noisy readings are
//! reported as warnings only.

use super::Calibrator;
use super::stats::RunningStats;
use crate::config::RangingCalibrationConfig;
use crate::drivers::{RangeDriver, SharedClock};
use crate::error::{Error, Result};
use crate::record::CalibrationRecord;

/// Known-target ranging calibrator
pub struct RangingCalibrator {
    range: Box<dyn RangeDriver>,
    clock: SharedClock,
    config: RangingCalibrationConfig,
}

impl RangingCalibrator {
    pub fn new(
        range: Box<dyn RangeDriver>,
        clock: SharedClock,
        config: RangingCalibrationConfig,
    ) -> Self {
        Self {
            range,
            clock,
            config,
        }
    }

    fn read(&mut self) -> Result<f32> {
        match self.range.read_distance() {
            Ok(d) if d >= 0.0 => Ok(d),
            Ok(d) => {
                log::error!("Failed to read ranging sensor (sentinel {:.3})", d);
                Err(Error::SensorRead("ranging sensor"))
            }
            Err(e) => {
                log::error!("Failed to read ranging sensor: {}", e);
                Err(Error::SensorRead("ranging sensor"))
            }
        }
    }
}

impl Calibrator for RangingCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        log::info!("Starting Ranging calibration");
        log::info!(
            "Place object at exactly {:.1} meter distance",
            self.config.reference_distance
        );

        let mut stats = RunningStats::new();
        for _ in 0..self.config.samples {
            stats.push(self.read()?);
            self.clock.delay_ms(self.config.interval_ms);
        }

        if stats.count() == 0 {
            log::error!("Ranging calibration collected no samples");
            return Err(Error::NoSamples("ranging sensor"));
        }

        let mean = stats.mean();
        let stddev = stats.stddev();
        let offset = self.config.reference_distance - mean;

        log::info!(
            "Ranging Calibration: average {:.3} m, stddev {:.3} m, offset {:.3} m",
            mean,
            stddev,
            offset
        );

        if offset.abs() > self.config.offset_warn {
            log::warn!("Ranging offset large: {:.3} m", offset);
        }
        if stddev > self.config.stddev_warn {
            log::warn!("Ranging noise high: {:.3} m", stddev);
        }

        record.ranging.distance_offset = offset;

        log::info!("Ranging calibration complete");
        Ok(())
    }
}
