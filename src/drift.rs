//! Periodic accelerometer drift detection
//!
//! Between calibration runs, one fresh IMU reading per interval is compared
//! against the stored bias. A deviation beyond the threshold on any axis
//! degrades the record to `NeedsRecalibration`. The monitor never starts a
//! calibration run and never clears the flag.

use crate::config::DriftConfig;
use crate::drivers::{SharedClock, SharedImu};
use crate::record::STANDARD_GRAVITY;
use crate::sequencer::CalibrationSequencer;

/// Result of one [`DriftMonitor::check`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftCheck {
    /// Interval since the last check has not elapsed
    NotDue,
    /// IMU read failed; the check is skipped until the next interval
    ReadFailed,
    /// Per-axis deviation from the stored bias, all within threshold
    Stable([f32; 3]),
    /// Per-axis deviation, at least one axis over threshold
    Drifted([f32; 3]),
}

/// Compares live accelerometer readings with the calibrated bias
pub struct DriftMonitor {
    imu: SharedImu,
    clock: SharedClock,
    config: DriftConfig,
    last_check_ms: u64,
}

impl DriftMonitor {
    pub fn new(imu: SharedImu, clock: SharedClock, config: DriftConfig) -> Self {
        Self {
            imu,
            clock,
            config,
            last_check_ms: 0,
        }
    }

    /// Run a drift check if the interval has elapsed
    pub fn check(&mut self, sequencer: &mut CalibrationSequencer) -> DriftCheck {
        let now = self.clock.now_ms();
        if now.saturating_sub(self.last_check_ms) < self.config.interval_ms {
            return DriftCheck::NotDue;
        }
        self.last_check_ms = now;

        log::info!("Monitoring sensor drift");

        let sample = match self.imu.lock().read() {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("Drift check skipped, IMU read failed: {}", e);
                return DriftCheck::ReadFailed;
            }
        };

        // Stored bias has gravity removed from the vertical axis
        let level = [
            sample.accel[0],
            sample.accel[1],
            sample.accel[2] - STANDARD_GRAVITY,
        ];
        let bias = sequencer.record().imu.bias;
        let drift = [
            (level[0] - bias[0]).abs(),
            (level[1] - bias[1]).abs(),
            (level[2] - bias[2]).abs(),
        ];

        log::info!(
            "IMU drift: ({:.3}, {:.3}, {:.3}) m/s²",
            drift[0],
            drift[1],
            drift[2]
        );

        if drift.iter().any(|d| *d > self.config.threshold) {
            log::warn!("IMU drift detected, recalibration recommended");
            sequencer.mark_needs_recalibration();
            DriftCheck::Drifted(drift)
        } else {
            DriftCheck::Stable(drift)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationSuite, Calibrator};
    use crate::drivers::{ImuDriver, MemoryStore};
    use crate::error::{Error, Result};
    use crate::persistence::{DEFAULT_RECORD_ADDRESS, Persistence};
    use crate::record::{CalibrationRecord, CalibrationStatus};
    use crate::sequencer::CalibrationState;
    use crate::sim::SimClock;
    use crate::types::ImuSample;
    use parking_lot::Mutex;
    use std::sync::Arc;

    const HOUR_MS: u64 = 3_600_000;

    struct Pass;

    impl Calibrator for Pass {
        fn calibrate(&mut self, _record: &mut CalibrationRecord) -> Result<()> {
            Ok(())
        }
    }

    struct FixedImu(Option<[f32; 3]>);

    impl ImuDriver for FixedImu {
        fn read(&mut self) -> Result<ImuSample> {
            self.0
                .map(ImuSample::at_rest)
                .ok_or(Error::SensorRead("IMU"))
        }
    }

    fn calibrated_sequencer(clock: &Arc<SimClock>) -> CalibrationSequencer {
        let suite = CalibrationSuite {
            inertial: Box::new(Pass),
            magnetic: Box::new(Pass),
            odometry: Box::new(Pass),
            ranging: Box::new(Pass),
            camera: Box::new(Pass),
            battery: Box::new(Pass),
            temperature: Box::new(Pass),
        };
        let persistence =
            Persistence::new(Box::new(MemoryStore::new(0x2000)), DEFAULT_RECORD_ADDRESS);
        let mut sequencer = CalibrationSequencer::new(suite, persistence, clock.clone());
        sequencer.request();
        while sequencer.tick() != CalibrationState::Complete {
            assert_ne!(sequencer.state(), CalibrationState::Idle);
        }
        sequencer.tick();
        assert!(sequencer.is_valid());
        sequencer
    }

    fn monitor(clock: &Arc<SimClock>, accel: Option<[f32; 3]>) -> (DriftMonitor, Arc<Mutex<FixedImu>>) {
        let imu = Arc::new(Mutex::new(FixedImu(accel)));
        let monitor = DriftMonitor::new(imu.clone(), clock.clone(), DriftConfig::default());
        (monitor, imu)
    }

    #[test]
    fn test_not_due_before_interval() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, _) = monitor(&clock, Some([5.0, 0.0, STANDARD_GRAVITY]));

        clock.advance(HOUR_MS - 1);
        assert_eq!(monitor.check(&mut sequencer), DriftCheck::NotDue);
        assert!(sequencer.is_valid());
    }

    #[test]
    fn test_level_reading_is_stable() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, _) = monitor(&clock, Some([0.3, -0.2, STANDARD_GRAVITY + 0.1]));

        clock.advance(HOUR_MS);
        assert!(matches!(monitor.check(&mut sequencer), DriftCheck::Stable(_)));
        assert_eq!(sequencer.record().status, CalibrationStatus::Valid);
    }

    #[test]
    fn test_gravity_removed_before_comparing_bias() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, _) = monitor(&clock, Some([0.0, 0.0, STANDARD_GRAVITY]));

        // Zero stored bias and a level robot reading 1 g on z: no drift
        clock.advance(HOUR_MS);
        assert_eq!(
            monitor.check(&mut sequencer),
            DriftCheck::Stable([0.0, 0.0, 0.0])
        );
        assert!(sequencer.is_valid());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, imu) = monitor(&clock, Some([2.0, 0.0, STANDARD_GRAVITY]));

        clock.advance(HOUR_MS);
        assert_eq!(
            monitor.check(&mut sequencer),
            DriftCheck::Stable([2.0, 0.0, 0.0])
        );
        assert!(sequencer.is_valid());

        imu.lock().0 = Some([0.0, -2.001, STANDARD_GRAVITY]);
        clock.advance(HOUR_MS);
        assert!(matches!(monitor.check(&mut sequencer), DriftCheck::Drifted(_)));
        assert_eq!(
            sequencer.record().status,
            CalibrationStatus::NeedsRecalibration
        );
    }

    #[test]
    fn test_drift_flags_record_once_per_interval() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, _) = monitor(&clock, Some([0.0, 2.5, STANDARD_GRAVITY]));

        clock.advance(HOUR_MS);
        match monitor.check(&mut sequencer) {
            DriftCheck::Drifted(drift) => assert!(drift[1] > 2.0),
            other => panic!("expected drift, got {:?}", other),
        }
        assert_eq!(
            sequencer.record().status,
            CalibrationStatus::NeedsRecalibration
        );

        // Checked again only after another full interval
        clock.advance(HOUR_MS / 2);
        assert_eq!(monitor.check(&mut sequencer), DriftCheck::NotDue);
    }

    #[test]
    fn test_flag_is_never_cleared_by_monitor() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, imu) = monitor(&clock, Some([0.0, 0.0, STANDARD_GRAVITY + 3.0]));

        clock.advance(HOUR_MS);
        monitor.check(&mut sequencer);

        imu.lock().0 = Some([0.0, 0.0, STANDARD_GRAVITY]);
        clock.advance(HOUR_MS);
        assert!(matches!(monitor.check(&mut sequencer), DriftCheck::Stable(_)));
        assert_eq!(
            sequencer.record().status,
            CalibrationStatus::NeedsRecalibration
        );
    }

    #[test]
    fn test_read_failure_skips_check() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, _) = monitor(&clock, None);

        clock.advance(HOUR_MS);
        assert_eq!(monitor.check(&mut sequencer), DriftCheck::ReadFailed);
        assert!(sequencer.is_valid());
        assert_eq!(monitor.check(&mut sequencer), DriftCheck::NotDue);
    }

    #[test]
    fn test_drift_leaves_sequencer_idle() {
        let clock = Arc::new(SimClock::new());
        let mut sequencer = calibrated_sequencer(&clock);
        let (mut monitor, _) = monitor(&clock, Some([9.0, 9.0, 9.0]));
        clock.advance(HOUR_MS);
        monitor.check(&mut sequencer);
        assert_eq!(sequencer.state(), CalibrationState::Idle);
        assert!(!sequencer.is_requested());
    }
}
