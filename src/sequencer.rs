//! Calibration sequencer state machine
//!
//! Drives the seven calibrators in a fixed order, validates the result and
//! persists it. Each [`CalibrationSequencer::tick`] performs exactly one
//! transition:
//!
//! ```text
//! Idle --request--> Init(IMU) -> Running(IMU) --ok--> Init(Magnetometer) -> ...
//!                                    |
//!                                   err --> Error --> Idle
//!
//! ... Running(Temperature) --ok--> Validate --ok--> Complete --> Idle
//!                                     |
//!                                    err --> Error --> Idle
//! ```
//!
//! A `Running` tick executes the whole calibrator synchronously, so a tick
//! landing on the magnetometer or odometer stage blocks for tens of seconds.
//! A full successful run is 16 ticks from `Idle` to `Complete`, and the 17th
//! tick persists the record and returns to `Idle`.

use crate::calibration::{CalibrationSuite, Sensor};
use crate::drivers::SharedClock;
use crate::error::{Error, Result};
use crate::persistence::{LoadSource, Persistence};
use crate::record::{CalibrationRecord, CalibrationStatus};
use crate::validator;
use std::fmt;

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    /// About to run the sensor's calibrator
    Init(Sensor),
    /// Running the sensor's calibrator on this tick
    Running(Sensor),
    Validate,
    Complete,
    Error,
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationState::Idle => write!(f, "Idle"),
            CalibrationState::Init(s) => write!(f, "{}Init", s),
            CalibrationState::Running(s) => write!(f, "{}Running", s),
            CalibrationState::Validate => write!(f, "Validate"),
            CalibrationState::Complete => write!(f, "Complete"),
            CalibrationState::Error => write!(f, "Error"),
        }
    }
}

/// Owns the calibration record and sequences calibration runs
pub struct CalibrationSequencer {
    state: CalibrationState,
    requested: bool,
    record: CalibrationRecord,
    calibrators: CalibrationSuite,
    persistence: Persistence,
    clock: SharedClock,
    load_source: LoadSource,
    last_error: Option<Error>,
}

impl CalibrationSequencer {
    /// Load the stored record (or defaults) and start in `Idle`
    pub fn new(
        calibrators: CalibrationSuite,
        mut persistence: Persistence,
        clock: SharedClock,
    ) -> Self {
        log::info!("Initializing sensor calibration system");

        let (record, load_source) = persistence.load(clock.now_ms());
        if load_source == LoadSource::Defaults {
            log::warn!("Calibration data invalid, using defaults");
        }

        log::info!("Calibration system ready");

        Self {
            state: CalibrationState::Idle,
            requested: false,
            record,
            calibrators,
            persistence,
            clock,
            load_source,
            last_error: None,
        }
    }

    /// Ask for a calibration run, started by the next tick
    ///
    /// Ignored with a warning while a run is in progress.
    pub fn request(&mut self) {
        if self.state != CalibrationState::Idle {
            log::warn!("Calibration already in progress ({})", self.state);
            return;
        }

        self.requested = true;
        log::info!("Calibration requested");
    }

    /// Advance the state machine by exactly one transition
    ///
    /// Returns the new state.
    pub fn tick(&mut self) -> CalibrationState {
        let next = match self.state {
            CalibrationState::Idle => {
                if self.requested {
                    log::info!("Starting calibration sequence");
                    self.last_error = None;
                    CalibrationState::Init(Sensor::first())
                } else {
                    CalibrationState::Idle
                }
            }

            CalibrationState::Init(sensor) => {
                log::info!("Initializing {} calibration", sensor);
                CalibrationState::Running(sensor)
            }

            CalibrationState::Running(sensor) => {
                match self.calibrators.get_mut(sensor).calibrate(&mut self.record) {
                    Ok(()) => sensor
                        .next()
                        .map(CalibrationState::Init)
                        .unwrap_or(CalibrationState::Validate),
                    Err(e) => {
                        log::error!("{} calibration failed: {}", sensor, e);
                        self.last_error = Some(e);
                        CalibrationState::Error
                    }
                }
            }

            CalibrationState::Validate => match validator::validate(&self.record) {
                Ok(()) => CalibrationState::Complete,
                Err(e) => {
                    log::error!("Calibration validation failed: {}", e);
                    self.last_error = Some(e);
                    CalibrationState::Error
                }
            },

            CalibrationState::Complete => {
                self.complete();
                CalibrationState::Idle
            }

            CalibrationState::Error => {
                log::error!("Calibration error!");
                self.record.status = CalibrationStatus::Invalid;
                self.requested = false;
                CalibrationState::Idle
            }
        };

        if next != self.state {
            log::debug!("Calibration state: {} -> {}", self.state, next);
        }
        self.state = next;
        next
    }

    fn complete(&mut self) {
        log::info!("Calibration complete!");

        self.record.status = CalibrationStatus::Valid;
        self.record.timestamp_ms = self.clock.now_ms();
        self.record.calibration_count = self.record.calibration_count.wrapping_add(1);

        if let Err(e) = self.persistence.save(&self.record) {
            log::error!("Failed to persist calibration: {}", e);
            self.last_error = Some(e);
        }

        self.requested = false;
    }

    /// Current state
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// A request is waiting for (or being served by) a run
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Record status is `Valid`
    pub fn is_valid(&self) -> bool {
        self.record.status == CalibrationStatus::Valid
    }

    /// Seconds since the last successful run
    pub fn age_seconds(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.record.timestamp_ms) / 1000
    }

    /// Current calibration record
    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    /// Whether the startup record came from storage or defaults
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Failure that ended the most recent run, if any
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Degrade the record to `NeedsRecalibration`
    ///
    /// Only the status changes; coefficients and storage are untouched.
    pub fn mark_needs_recalibration(&mut self) {
        self.record.status = CalibrationStatus::NeedsRecalibration;
    }

    /// Replace the record with defaults and persist immediately
    ///
    /// Independent of the sequencer state.
    pub fn reset_to_default(&mut self) -> Result<()> {
        self.record = CalibrationRecord::defaults();
        self.persistence.save(&self.record)?;
        log::info!("Calibration reset to default");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibrator;
    use crate::drivers::MemoryStore;
    use crate::persistence::DEFAULT_RECORD_ADDRESS;
    use crate::record::RECORD_SIZE;
    use crate::sim::SimClock;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records invocation order and succeeds unless told otherwise
    struct Stage {
        sensor: Sensor,
        log: Arc<Mutex<Vec<Sensor>>>,
        fail: bool,
    }

    impl Calibrator for Stage {
        fn calibrate(&mut self, _record: &mut CalibrationRecord) -> Result<()> {
            self.log.lock().push(self.sensor);
            if self.fail {
                Err(Error::SensorRead("stage"))
            } else {
                Ok(())
            }
        }
    }

    fn suite(log: &Arc<Mutex<Vec<Sensor>>>, failing: Option<Sensor>) -> CalibrationSuite {
        let stage = |sensor: Sensor| -> Box<dyn Calibrator> {
            Box::new(Stage {
                sensor,
                log: log.clone(),
                fail: failing == Some(sensor),
            })
        };
        CalibrationSuite {
            inertial: stage(Sensor::Inertial),
            magnetic: stage(Sensor::Magnetic),
            odometry: stage(Sensor::Odometry),
            ranging: stage(Sensor::Ranging),
            camera: stage(Sensor::Camera),
            battery: stage(Sensor::Battery),
            temperature: stage(Sensor::Temperature),
        }
    }

    fn sequencer(failing: Option<Sensor>) -> (CalibrationSequencer, MemoryStore, Arc<Mutex<Vec<Sensor>>>) {
        sequencer_on(failing, MemoryStore::new(0x2000))
    }

    fn sequencer_on(
        failing: Option<Sensor>,
        store: MemoryStore,
    ) -> (CalibrationSequencer, MemoryStore, Arc<Mutex<Vec<Sensor>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let persistence = Persistence::new(Box::new(store.clone()), DEFAULT_RECORD_ADDRESS);
        let seq = CalibrationSequencer::new(
            suite(&log, failing),
            persistence,
            Arc::new(SimClock::new()),
        );
        (seq, store, log)
    }

    #[test]
    fn test_idle_without_request() {
        let (mut seq, store, log) = sequencer(None);
        for _ in 0..5 {
            assert_eq!(seq.tick(), CalibrationState::Idle);
        }
        assert!(log.lock().is_empty());
        assert_eq!(store.write_count(), 0);
        assert_eq!(seq.load_source(), LoadSource::Defaults);
    }

    #[test]
    fn test_full_state_walk() {
        let (mut seq, _, log) = sequencer(None);
        seq.request();

        let mut expected = Vec::new();
        for sensor in Sensor::ALL {
            expected.push(CalibrationState::Init(sensor));
            expected.push(CalibrationState::Running(sensor));
        }
        // Running(sensor) is left on the tick after it is entered
        let mut visited = Vec::new();
        loop {
            let state = seq.tick();
            visited.push(state);
            if state == CalibrationState::Validate {
                break;
            }
        }

        assert_eq!(visited.len(), 15);
        assert_eq!(&visited[..14], expected.as_slice());
        assert_eq!(*log.lock(), Sensor::ALL.to_vec());
    }

    #[test]
    fn test_persist_failure_keeps_record_valid() {
        let (mut seq, store, _) = sequencer_on(None, MemoryStore::new(16));
        seq.request();
        for _ in 0..16 {
            seq.tick();
        }
        assert_eq!(seq.state(), CalibrationState::Complete);

        assert_eq!(seq.tick(), CalibrationState::Idle);
        assert!(seq.is_valid());
        assert!(!seq.is_requested());
        assert_eq!(seq.record().calibration_count, 1);
        assert!(matches!(
            seq.last_error(),
            Some(Error::StoreRange { len: RECORD_SIZE, capacity: 16, .. })
        ));
        assert_eq!(store.write_count(), 0);

        // The next run starts with the stale error cleared
        seq.request();
        seq.tick();
        assert!(seq.last_error().is_none());
    }

    #[test]
    fn test_request_ignored_while_running() {
        let (mut seq, _, _) = sequencer(None);
        seq.request();
        seq.tick();
        assert_eq!(seq.state(), CalibrationState::Init(Sensor::Inertial));

        seq.request();
        assert!(seq.is_requested());

        for _ in 0..16 {
            seq.tick();
        }
        assert_eq!(seq.state(), CalibrationState::Idle);
        assert!(!seq.is_requested());

        // The ignored request did not queue a second run
        assert_eq!(seq.tick(), CalibrationState::Idle);
    }

    #[test]
    fn test_failure_aborts_remaining_stages() {
        let (mut seq, store, log) = sequencer(Some(Sensor::Odometry));
        seq.request();
        for _ in 0..7 {
            seq.tick();
        }
        assert_eq!(seq.state(), CalibrationState::Error);
        assert_eq!(seq.tick(), CalibrationState::Idle);

        assert_eq!(
            *log.lock(),
            vec![Sensor::Inertial, Sensor::Magnetic, Sensor::Odometry]
        );
        assert_eq!(seq.record().status, CalibrationStatus::Invalid);
        assert!(matches!(seq.last_error(), Some(Error::SensorRead("stage"))));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_reset_to_default_persists_immediately() {
        let (mut seq, store, _) = sequencer(None);
        seq.request();
        for _ in 0..17 {
            seq.tick();
        }
        assert!(seq.is_valid());
        assert_eq!(store.write_count(), 1);

        seq.reset_to_default().unwrap();

        assert_eq!(*seq.record(), CalibrationRecord::defaults());
        assert!(!seq.is_valid());
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_mark_needs_recalibration_keeps_coefficients() {
        let (mut seq, store, _) = sequencer(None);
        seq.request();
        for _ in 0..17 {
            seq.tick();
        }
        let before = *seq.record();

        seq.mark_needs_recalibration();

        assert_eq!(seq.record().status, CalibrationStatus::NeedsRecalibration);
        assert_eq!(seq.record().imu, before.imu);
        assert!(!seq.is_valid());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(
            CalibrationState::Running(Sensor::Magnetic).to_string(),
            "MagnetometerRunning"
        );
        assert_eq!(CalibrationState::Idle.to_string(), "Idle");
    }
}
