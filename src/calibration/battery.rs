//! Battery voltage calibration against the pack's nominal voltage

use super::Calibrator;
use super::stats::RunningStats;
use crate::config::BatteryCalibrationConfig;
use crate::drivers::{BatteryDriver, SharedClock};
use crate::error::{Error, Result};
use crate::record::CalibrationRecord;

/// Averaging battery voltage calibrator
pub struct BatteryCalibrator {
    battery: Box<dyn BatteryDriver>,
    clock: SharedClock,
    config: BatteryCalibrationConfig,
}

impl BatteryCalibrator {
    pub fn new(
        battery: Box<dyn BatteryDriver>,
        clock: SharedClock,
        config: BatteryCalibrationConfig,
    ) -> Self {
        Self {
            battery,
            clock,
            config,
        }
    }
}

impl Calibrator for BatteryCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        log::info!("Starting Battery calibration");

        let mut voltage = RunningStats::new();
        for _ in 0..self.config.samples {
            let sample = self.battery.read().map_err(|e| {
                log::error!("Failed to read battery: {}", e);
                Error::SensorRead("battery")
            })?;
            voltage.push(sample.voltage);
            self.clock.delay_ms(self.config.interval_ms);
        }

        if voltage.count() == 0 {
            log::error!("Battery calibration collected no samples");
            return Err(Error::NoSamples("battery"));
        }

        let offset = self.config.nominal_voltage - voltage.mean();

        log::info!(
            "Battery Calibration: average {:.2} V, offset {:.2} V",
            voltage.mean(),
            offset
        );

        record.battery.voltage_offset = offset;
        record.battery.voltage_scale = 1.0;

        log::info!("Battery calibration complete");
        Ok(())
    }
}
