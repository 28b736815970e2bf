//! Temperature sensor calibration against an assumed ambient reference

use super::Calibrator;
use super::stats::RunningStats;
use crate::config::TemperatureCalibrationConfig;
use crate::drivers::{SharedClock, TemperatureDriver};
use crate::error::{Error, Result};
use crate::record::CalibrationRecord;

/// Averaging thermometer calibrator
pub struct TemperatureCalibrator {
    thermometer: Box<dyn TemperatureDriver>,
    clock: SharedClock,
    config: TemperatureCalibrationConfig,
}

impl TemperatureCalibrator {
    pub fn new(
        thermometer: Box<dyn TemperatureDriver>,
        clock: SharedClock,
        config: TemperatureCalibrationConfig,
    ) -> Self {
        Self {
            thermometer,
            clock,
            config,
        }
    }
}

impl Calibrator for TemperatureCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        log::info!("Starting Temperature calibration");

        let mut celsius = RunningStats::new();
        for _ in 0..self.config.samples {
            let sample = self.thermometer.read().map_err(|e| {
                log::error!("Failed to read temperature: {}", e);
                Error::SensorRead("temperature")
            })?;
            celsius.push(sample.celsius);
            self.clock.delay_ms(self.config.interval_ms);
        }

        if celsius.count() == 0 {
            log::error!("Temperature calibration collected no samples");
            return Err(Error::NoSamples("temperature"));
        }

        let offset = self.config.ambient_celsius - celsius.mean();

        log::info!(
            "Temperature Calibration: average {:.1} °C, offset {:.1} °C",
            celsius.mean(),
            offset
        );

        record.temperature_offset = offset;

        log::info!("Temperature calibration complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimClock;
    use crate::types::TemperatureSample;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    struct Readings(Vec<Option<f32>>, usize);

    impl TemperatureDriver for Readings {
        fn read(&mut self) -> Result<TemperatureSample> {
            let value = self.0[self.1 % self.0.len()];
            self.1 += 1;
            value
                .map(|c| TemperatureSample::new(c, 0))
                .ok_or(Error::SensorRead("temperature"))
        }
    }

    fn calibrator(values: Vec<Option<f32>>) -> TemperatureCalibrator {
        calibrator_with(values, TemperatureCalibrationConfig::default())
    }

    fn calibrator_with(
        values: Vec<Option<f32>>,
        config: TemperatureCalibrationConfig,
    ) -> TemperatureCalibrator {
        TemperatureCalibrator::new(
            Box::new(Readings(values, 0)),
            Arc::new(SimClock::new()),
            config,
        )
    }

    #[test]
    fn test_offset_to_ambient() {
        let mut cal = calibrator(vec![Some(26.0), Some(27.0)]);
        let mut record = CalibrationRecord::defaults();

        cal.calibrate(&mut record).unwrap();

        assert_relative_eq!(record.temperature_offset, -1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let mut cal = calibrator(vec![Some(25.0), None]);
        let mut record = CalibrationRecord::defaults();

        assert!(matches!(
            cal.calibrate(&mut record),
            Err(Error::SensorRead("temperature"))
        ));
        assert_eq!(record.temperature_offset, 0.0);
    }

    #[test]
    fn test_zero_samples_is_an_error() {
        let config = TemperatureCalibrationConfig {
            samples: 0,
            ..Default::default()
        };
        let mut cal = calibrator_with(vec![Some(26.0)], config);
        let mut record = CalibrationRecord::defaults();

        assert!(matches!(
            cal.calibrate(&mut record),
            Err(Error::NoSamples("temperature"))
        ));
        assert_eq!(record.temperature_offset, 0.0);
    }
}
