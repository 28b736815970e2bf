//! Compass hard/soft iron calibration
//!
//! The robot rotates slowly through a full turn while the field is sampled for
//! a fixed window. Per axis, the midpoint of the observed extremes is the hard
//! iron offset and `avg_half_range / half_range` is the soft iron scale, which
//! pulls an ellipsoidal locus toward a sphere.
//!
//! An axis that barely moved during the sweep has a near-zero half-range and
//! yields a huge (or infinite) scale. That case is logged here and left to the
//! validator's scale bounds to reject.

use super::Calibrator;
use super::stats::AxisRange;
use crate::config::MagCalibrationConfig;
use crate::drivers::{MagnetometerDriver, SharedClock};
use crate::error::{Error, Result};
use crate::record::CalibrationRecord;

/// Rotating-sweep magnetometer calibrator
pub struct MagCalibrator {
    magnetometer: Box<dyn MagnetometerDriver>,
    clock: SharedClock,
    config: MagCalibrationConfig,
}

impl MagCalibrator {
    pub fn new(
        magnetometer: Box<dyn MagnetometerDriver>,
        clock: SharedClock,
        config: MagCalibrationConfig,
    ) -> Self {
        Self {
            magnetometer,
            clock,
            config,
        }
    }
}

/// Soft iron scale per axis from the sweep half-ranges
pub fn soft_iron_scale(half_range: [f32; 3]) -> [f32; 3] {
    let avg = (half_range[0] + half_range[1] + half_range[2]) / 3.0;
    std::array::from_fn(|i| avg / half_range[i])
}

impl Calibrator for MagCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        log::info!("Starting Magnetometer calibration");
        log::info!(
            "Please rotate robot 360 degrees slowly ({} seconds)",
            self.config.window_ms / 1000
        );

        let mut range = AxisRange::new();
        let start = self.clock.now_ms();

        while self.clock.now_ms().saturating_sub(start) < self.config.window_ms {
            let sample = self.magnetometer.read().map_err(|e| {
                log::error!("Failed to read magnetometer: {}", e);
                Error::SensorRead("magnetometer")
            })?;
            range.push(sample.field);
            self.clock.delay_ms(self.config.interval_ms);
        }

        if range.count() == 0 {
            log::error!("Magnetometer sweep window collected no samples");
            return Err(Error::NoSamples("magnetometer"));
        }

        let offset = range.midpoint();
        let half_range = range.half_range();

        for (axis, r) in ["X", "Y", "Z"].iter().zip(half_range) {
            if r.abs() < self.config.min_half_range {
                log::warn!(
                    "Magnetometer {} axis barely moved (half-range {:.6}), scale will be unstable",
                    axis,
                    r
                );
            }
        }

        let scale = soft_iron_scale(half_range);

        log::info!(
            "Magnetometer Calibration: offset=({:.1}, {:.1}, {:.1}), scale=({:.3}, {:.3}, {:.3}), samples={}",
            offset[0],
            offset[1],
            offset[2],
            scale[0],
            scale[1],
            scale[2],
            range.count()
        );

        record.mag.offset = offset;
        record.mag.scale = scale;

        log::info!("Magnetometer calibration complete");
        Ok(())
    }
}
