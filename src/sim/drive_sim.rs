//! Drive base simulation
//!
//! A move blocks on the shared clock for as long as the robot would take to
//! cover the distance, then credits each wheel's counter with its resolution
//! times the distance, perturbed by multiplicative slip.

use super::config::SimDriveConfig;
use super::noise::NoiseGenerator;
use crate::drivers::{DriveBase, SharedClock};
use crate::error::{Error, Result};

/// Simulated differential drive with encoders
pub struct SimDrive {
    config: SimDriveConfig,
    clock: SharedClock,
    noise: NoiseGenerator,
    left_pulses: u32,
    right_pulses: u32,
}

impl SimDrive {
    pub fn new(config: &SimDriveConfig, clock: SharedClock, noise: NoiseGenerator) -> Self {
        Self {
            config: config.clone(),
            clock,
            noise,
            left_pulses: 0,
            right_pulses: 0,
        }
    }

    fn pulses(&mut self, meters: f32, pulses_per_meter: f32) -> u32 {
        let slip = 1.0 + self.noise.gaussian(self.config.slip_stddev);
        (meters * pulses_per_meter * slip).round().max(0.0) as u32
    }
}

impl DriveBase for SimDrive {
    fn move_forward_mm(&mut self, distance_mm: u32) -> Result<()> {
        if self.config.fail {
            return Err(Error::MoveFailed("motor controller fault".to_string()));
        }

        let meters = distance_mm as f32 / 1000.0;
        if self.config.speed_mps > 0.0 {
            let travel_ms = (meters / self.config.speed_mps * 1000.0) as u64;
            self.clock.delay_ms(travel_ms);
        }

        let left = self.pulses(meters, self.config.pulses_per_meter_left);
        let right = self.pulses(meters, self.config.pulses_per_meter_right);
        self.left_pulses = self.left_pulses.saturating_add(left);
        self.right_pulses = self.right_pulses.saturating_add(right);

        log::debug!(
            "SimDrive: moved {} mm, encoders L={} R={}",
            distance_mm,
            self.left_pulses,
            self.right_pulses
        );
        Ok(())
    }

    fn reset_encoders(&mut self) {
        self.left_pulses = 0;
        self.right_pulses = 0;
    }

    fn encoder_counts(&mut self) -> (u32, u32) {
        (self.left_pulses, self.right_pulses)
    }
}
