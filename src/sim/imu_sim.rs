//! Inertial unit and compass simulation
//!
//! The accelerometer reports gravity on +Z plus a configurable bias that may
//! grow over simulated time. The compass traces a hard-iron-shifted ellipsoid
//! as if the robot were rotating in place at a fixed rate.

use super::config::{SimImuConfig, SimMagConfig};
use super::noise::NoiseGenerator;
use crate::drivers::{ImuDriver, MagnetometerDriver, SharedClock};
use crate::error::{Error, Result};
use crate::record::STANDARD_GRAVITY;
use crate::types::{ImuSample, MagSample};
use std::f32::consts::TAU;

const MS_PER_HOUR: f32 = 3_600_000.0;

/// Simulated accelerometer and gyroscope
pub struct SimImu {
    config: SimImuConfig,
    clock: SharedClock,
    noise: NoiseGenerator,
}

impl SimImu {
    pub fn new(config: &SimImuConfig, clock: SharedClock, noise: NoiseGenerator) -> Self {
        Self {
            config: config.clone(),
            clock,
            noise,
        }
    }
}

impl ImuDriver for SimImu {
    fn read(&mut self) -> Result<ImuSample> {
        if self.config.fail {
            return Err(Error::SensorRead("IMU"));
        }

        let now = self.clock.now_ms();
        let hours = now as f32 / MS_PER_HOUR;

        let mut accel = [0.0f32; 3];
        for (axis, value) in accel.iter_mut().enumerate() {
            let bias = self.config.accel_bias[axis] + self.config.bias_drift_per_hour[axis] * hours;
            *value = self.noise.biased_gaussian(bias, self.config.accel_stddev);
        }
        accel[2] += STANDARD_GRAVITY;

        let gyro = [
            self.noise.gaussian(self.config.gyro_stddev),
            self.noise.gaussian(self.config.gyro_stddev),
            self.noise.gaussian(self.config.gyro_stddev),
        ];

        Ok(ImuSample::new(accel, gyro, now))
    }
}

/// Simulated compass on a robot rotating in place
pub struct SimMagnetometer {
    config: SimMagConfig,
    clock: SharedClock,
    noise: NoiseGenerator,
    /// Heading at time zero (radians)
    phase: f32,
}

impl SimMagnetometer {
    pub fn new(config: &SimMagConfig, clock: SharedClock, mut noise: NoiseGenerator) -> Self {
        let phase = noise.uniform() * TAU;
        Self {
            config: config.clone(),
            clock,
            noise,
            phase,
        }
    }

    /// Heading at `now_ms` (radians)
    fn heading(&self, now_ms: u64) -> f32 {
        let period = self.config.rotation_period_ms;
        if period == 0 {
            return self.phase;
        }
        self.phase + TAU * (now_ms % period) as f32 / period as f32
    }
}

impl MagnetometerDriver for SimMagnetometer {
    fn read(&mut self) -> Result<MagSample> {
        if self.config.fail {
            return Err(Error::SensorRead("magnetometer"));
        }

        let now = self.clock.now_ms();
        let theta = self.heading(now);
        let [rx, ry, rz] = self.config.radii;
        let [hx, hy, hz] = self.config.hard_iron;
        let stddev = self.config.stddev;

        let field = [
            self.noise.biased_gaussian(hx + rx * theta.cos(), stddev),
            self.noise.biased_gaussian(hy + ry * theta.sin(), stddev),
            self.noise.biased_gaussian(hz + rz * (2.0 * theta).sin(), stddev),
        ];

        Ok(MagSample::new(field, now))
    }
}
