//! Wheel encoder calibration
//!
//! Drives a known straight distance and divides each wheel's pulse count by
//! it. The two wheels must agree within the configured tolerance, otherwise
//! one of them is slipping or the robot did not drive straight.

use super::Calibrator;
use crate::config::OdometryCalibrationConfig;
use crate::drivers::{DriveBase, SharedClock};
use crate::error::{Error, Result};
use crate::record::CalibrationRecord;

/// Straight-run odometry calibrator
pub struct OdometryCalibrator {
    drive: Box<dyn DriveBase>,
    clock: SharedClock,
    config: OdometryCalibrationConfig,
}

impl OdometryCalibrator {
    pub fn new(
        drive: Box<dyn DriveBase>,
        clock: SharedClock,
        config: OdometryCalibrationConfig,
    ) -> Self {
        Self {
            drive,
            clock,
            config,
        }
    }
}

/// Relative left/right disagreement: `|l - r| / avg(l, r)`
///
/// Zero pulses on both wheels gives NaN, which never passes a tolerance check.
pub fn encoder_mismatch(left: u32, right: u32) -> f32 {
    let (l, r) = (left as f32, right as f32);
    (l - r).abs() / ((l + r) / 2.0)
}

impl Calibrator for OdometryCalibrator {
    fn calibrate(&mut self, record: &mut CalibrationRecord) -> Result<()> {
        let distance_m = self.config.distance_mm as f32 / 1000.0;
        log::info!("Starting Odometer calibration");
        log::info!("Moving robot forward {:.1} meters", distance_m);

        self.drive.reset_encoders();
        self.clock.delay_ms(self.config.settle_ms);

        if let Err(e) = self.drive.move_forward_mm(self.config.distance_mm) {
            log::error!("Failed to move robot: {}", e);
            return Err(match e {
                Error::MoveFailed(_) => e,
                other => Error::MoveFailed(other.to_string()),
            });
        }

        let (left, right) = self.drive.encoder_counts();
        let ppm_left = left as f32 / distance_m;
        let ppm_right = right as f32 / distance_m;
        let mismatch = encoder_mismatch(left, right);

        log::info!(
            "Odometer Calibration: pulses L={} R={}, pulses/meter L={:.1} R={:.1}, encoder error {:.2}%",
            left,
            right,
            ppm_left,
            ppm_right,
            mismatch * 100.0
        );

        // NaN means neither wheel produced a pulse
        if mismatch.is_nan() || mismatch > self.config.max_mismatch {
            log::error!(
                "Odometer calibration error too high: {:.2}%",
                mismatch * 100.0
            );
            return Err(Error::EncoderMismatch {
                left,
                right,
                error_pct: mismatch * 100.0,
            });
        }

        record.odometry.pulses_per_meter_left = ppm_left;
        record.odometry.pulses_per_meter_right = ppm_right;

        log::info!("Odometer calibration complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimClock;
    use std::sync::Arc;

    /// Reports fixed counts after a move, optionally refusing to move
    struct FixedDrive {
        counts: (u32, u32),
        moved: bool,
        fail_move: bool,
    }

    impl DriveBase for FixedDrive {
        fn move_forward_mm(&mut self, _distance_mm: u32) -> Result<()> {
            if self.fail_move {
                return Err(Error::MoveFailed("wheel stalled".to_string()));
            }
            self.moved = true;
            Ok(())
        }

        fn reset_encoders(&mut self) {
            self.moved = false;
        }

        fn encoder_counts(&mut self) -> (u32, u32) {
            if self.moved {
                self.counts
            } else {
                (0, 0)
            }
        }
    }

    fn run(left: u32, right: u32, fail_move: bool) -> (Result<()>, CalibrationRecord) {
        let drive = FixedDrive {
            counts: (left, right),
            moved: false,
            fail_move,
        };
        let mut cal = OdometryCalibrator::new(
            Box::new(drive),
            Arc::new(SimClock::new()),
            OdometryCalibrationConfig::default(),
        );
        let mut record = CalibrationRecord::defaults();
        let result = cal.calibrate(&mut record);
        (result, record)
    }

    #[test]
    fn test_pulses_per_meter_from_counts() {
        let (result, record) = run(1040, 980, false);
        result.unwrap();
        assert_eq!(record.odometry.pulses_per_meter_left, 1040.0);
        assert_eq!(record.odometry.pulses_per_meter_right, 980.0);
    }

    #[test]
    fn test_mismatch_just_within_tolerance() {
        // |1150 - 1000| / 1075 = 0.1395
        let (result, record) = run(1150, 1000, false);
        result.unwrap();
        assert_eq!(record.odometry.pulses_per_meter_left, 1150.0);
    }

    #[test]
    fn test_mismatch_over_tolerance_fails() {
        // |1200 - 1000| / 1100 = 0.1818
        let (result, record) = run(1200, 1000, false);
        assert!(matches!(
            result,
            Err(Error::EncoderMismatch {
                left: 1200,
                right: 1000,
                ..
            })
        ));
        assert_eq!(record.odometry.pulses_per_meter_left, 1000.0);
    }

    #[test]
    fn test_move_failure_is_fatal() {
        let (result, record) = run(1000, 1000, true);
        assert!(matches!(result, Err(Error::MoveFailed(_))));
        assert_eq!(record, CalibrationRecord::defaults());
    }

    #[test]
    fn test_no_pulses_fails() {
        let (result, _) = run(0, 0, false);
        assert!(matches!(result, Err(Error::EncoderMismatch { .. })));
    }

    #[test]
    fn test_encoder_mismatch() {
        assert_eq!(encoder_mismatch(1000, 1000), 0.0);
        assert!((encoder_mismatch(1150, 1000) - 0.139_534_9).abs() < 1e-6);
        assert!(encoder_mismatch(0, 0).is_nan());
    }
}
