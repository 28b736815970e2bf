//! Range finder, battery and thermometer simulation

use super::config::{SimBatteryConfig, SimRangeConfig, SimTemperatureConfig};
use super::noise::NoiseGenerator;
use crate::drivers::{BatteryDriver, RangeDriver, SharedClock, TemperatureDriver};
use crate::error::{Error, Result};
use crate::types::{BatterySample, TemperatureSample};

/// Distance reported by the range finder on a failed measurement
const RANGE_FAILURE: f32 = -1.0;

/// Pack voltage at 0 % charge
const EMPTY_VOLTAGE: f32 = 10.0;

/// Pack voltage at 100 % charge
const FULL_VOLTAGE: f32 = 12.6;

/// Simulated range finder
pub struct SimRange {
    config: SimRangeConfig,
    noise: NoiseGenerator,
}

impl SimRange {
    pub fn new(config: &SimRangeConfig, noise: NoiseGenerator) -> Self {
        Self {
            config: config.clone(),
            noise,
        }
    }
}

impl RangeDriver for SimRange {
    fn read_distance(&mut self) -> Result<f32> {
        if self.config.fail {
            return Ok(RANGE_FAILURE);
        }
        let measured = self.config.target_distance + self.config.bias;
        Ok(self.noise.biased_gaussian(measured, self.config.stddev).max(0.0))
    }
}

/// Simulated battery monitor
pub struct SimBattery {
    config: SimBatteryConfig,
    clock: SharedClock,
    noise: NoiseGenerator,
}

impl SimBattery {
    pub fn new(config: &SimBatteryConfig, clock: SharedClock, noise: NoiseGenerator) -> Self {
        Self {
            config: config.clone(),
            clock,
            noise,
        }
    }
}

impl BatteryDriver for SimBattery {
    fn read(&mut self) -> Result<BatterySample> {
        if self.config.fail {
            return Err(Error::SensorRead("battery"));
        }

        let voltage = self
            .noise
            .biased_gaussian(self.config.voltage, self.config.voltage_stddev);
        let percentage =
            ((voltage - EMPTY_VOLTAGE) / (FULL_VOLTAGE - EMPTY_VOLTAGE) * 100.0).clamp(0.0, 100.0);

        Ok(BatterySample::new(
            voltage,
            self.config.current,
            percentage,
            self.clock.now_ms(),
        ))
    }
}

/// Simulated board thermometer
pub struct SimThermometer {
    config: SimTemperatureConfig,
    clock: SharedClock,
    noise: NoiseGenerator,
}

impl SimThermometer {
    pub fn new(config: &SimTemperatureConfig, clock: SharedClock, noise: NoiseGenerator) -> Self {
        Self {
            config: config.clone(),
            clock,
            noise,
        }
    }
}

impl TemperatureDriver for SimThermometer {
    fn read(&mut self) -> Result<TemperatureSample> {
        if self.config.fail {
            return Err(Error::SensorRead("temperature"));
        }
        let celsius = self
            .noise
            .biased_gaussian(self.config.celsius, self.config.stddev);
        Ok(TemperatureSample::new(celsius, self.clock.now_ms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimClock;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn test_range_reads_biased_distance() {
        let config = SimRangeConfig {
            stddev: 0.0,
            ..Default::default()
        };
        let mut range = SimRange::new(&config, NoiseGenerator::new(42));
        assert_relative_eq!(range.read_distance().unwrap(), 1.02);
    }

    #[test]
    fn test_range_failure_is_negative() {
        let config = SimRangeConfig {
            fail: true,
            ..Default::default()
        };
        let mut range = SimRange::new(&config, NoiseGenerator::new(42));
        assert!(range.read_distance().unwrap() < 0.0);
    }

    #[test]
    fn test_battery_percentage() {
        let config = SimBatteryConfig {
            voltage: 11.3,
            voltage_stddev: 0.0,
            ..Default::default()
        };
        let mut battery = SimBattery::new(&config, Arc::new(SimClock::new()), NoiseGenerator::new(42));

        let sample = battery.read().unwrap();
        assert_relative_eq!(sample.percentage, 50.0, epsilon = 1e-3);
        assert_eq!(sample.current, 0.6);
    }

    #[test]
    fn test_thermometer_timestamps_from_clock() {
        let clock = Arc::new(SimClock::starting_at(750));
        let mut thermometer = SimThermometer::new(
            &SimTemperatureConfig::default(),
            clock,
            NoiseGenerator::new(42),
        );

        let sample = thermometer.read().unwrap();
        assert_eq!(sample.timestamp_ms, 750);
        assert_relative_eq!(sample.celsius, 27.5, epsilon = 1.0);
    }
}
