//! Application orchestration for the Tula calibration daemon
//!
//! Wires the configured hardware into a sequencer and drift monitor and drives
//! both from a single periodic loop.

use crate::calibration::CalibrationSuite;
use crate::config::AppConfig;
use crate::devices::{Hardware, create_hardware};
use crate::drift::DriftMonitor;
use crate::drivers::SharedClock;
use crate::error::{Error, Result};
use crate::persistence::Persistence;
use crate::sequencer::{CalibrationSequencer, CalibrationState};
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Sequencer, drift monitor and the loop that ticks them
pub struct CalibrationApp {
    config: AppConfig,
    sequencer: CalibrationSequencer,
    drift: DriftMonitor,
    clock: SharedClock,
    running: Arc<AtomicBool>,
}

impl CalibrationApp {
    /// Create the configured hardware and load the stored calibration
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing Tula application");
        let hardware = create_hardware(&config)?;
        Ok(Self::with_hardware(config, hardware))
    }

    /// Build on already-constructed hardware
    pub fn with_hardware(config: AppConfig, hardware: Hardware) -> Self {
        let Hardware { sensors, store } = hardware;

        let clock = sensors.clock.clone();
        let drift = DriftMonitor::new(sensors.imu.clone(), clock.clone(), config.drift.clone());
        let suite = CalibrationSuite::standard(&config.calibration, sensors);
        let persistence = Persistence::new(store, config.storage.address);
        let mut sequencer = CalibrationSequencer::new(suite, persistence, clock.clone());

        if config.runtime.auto_calibrate && !sequencer.is_valid() {
            info!("No valid calibration stored, requesting calibration");
            sequencer.request();
        }

        Self {
            config,
            sequencer,
            drift,
            clock,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that stops [`run`](Self::run) when cleared
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn sequencer(&self) -> &CalibrationSequencer {
        &self.sequencer
    }

    pub fn request_calibration(&mut self) {
        self.sequencer.request();
    }

    pub fn reset_to_default(&mut self) -> Result<()> {
        self.sequencer.reset_to_default()
    }

    /// One loop iteration: a sequencer tick followed by a drift check
    pub fn step(&mut self) -> CalibrationState {
        let state = self.sequencer.tick();
        self.drift.check(&mut self.sequencer);
        state
    }

    /// Request a calibration and tick until the run has finished
    ///
    /// Returns the failure that ended the run, if any. A run that completed
    /// but could not be saved is also a failure.
    pub fn calibrate_blocking(&mut self) -> Result<()> {
        self.sequencer.request();

        loop {
            if !self.running.load(Ordering::Relaxed) {
                return Err(Error::Other("Calibration interrupted".to_string()));
            }
            if self.sequencer.tick() == CalibrationState::Idle {
                break;
            }
        }

        match (self.sequencer.is_valid(), self.sequencer.last_error()) {
            (true, None) => Ok(()),
            (true, Some(e)) => Err(Error::Other(format!("Calibration not saved: {}", e))),
            (false, reason) => {
                let reason = reason
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown failure".to_string());
                Err(Error::Other(format!("Calibration failed: {}", reason)))
            }
        }
    }

    /// Log a one-line summary of the current calibration
    pub fn log_status(&self) {
        let record = self.sequencer.record();
        info!(
            "Calibration status: {:?} (runs: {}, age: {} s, state: {})",
            record.status,
            record.calibration_count,
            self.sequencer.age_seconds(),
            self.sequencer.state()
        );
    }

    /// Tick until the running flag is cleared
    pub fn run(&mut self) -> Result<()> {
        info!(
            "Calibration loop running (tick every {} ms)",
            self.config.runtime.tick_interval_ms
        );
        info!("Press Ctrl+C to stop");

        let mut was_idle = true;
        while self.running.load(Ordering::Relaxed) {
            let state = self.step();

            let idle = state == CalibrationState::Idle;
            if idle && !was_idle {
                self.log_status();
            }
            was_idle = idle;

            if idle {
                self.clock.delay_ms(self.config.runtime.tick_interval_ms);
            }
        }

        if !was_idle {
            warn!("Stopped with calibration in progress ({})", self.sequencer.state());
        }
        info!("Calibration loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::SensorSuite;
    use crate::drivers::MemoryStore;
    use crate::sim::{self, SimClock, SimConfig};

    fn app(sim_config: SimConfig, auto_calibrate: bool) -> (CalibrationApp, MemoryStore) {
        let store = MemoryStore::new(AppConfig::default().storage.size);
        app_with_store(sim_config, auto_calibrate, store)
    }

    fn app_with_store(
        sim_config: SimConfig,
        auto_calibrate: bool,
        store: MemoryStore,
    ) -> (CalibrationApp, MemoryStore) {
        let mut config = AppConfig::default();
        config.runtime.auto_calibrate = auto_calibrate;
        config.device.sim = SimConfig {
            random_seed: 42,
            realtime: false,
            ..sim_config
        };

        let sensors: SensorSuite =
            sim::sensor_suite(&config.device.sim, Arc::new(SimClock::new()));
        let hardware = Hardware {
            sensors,
            store: Box::new(store.clone()),
        };
        (CalibrationApp::with_hardware(config, hardware), store)
    }

    #[test]
    fn test_blocking_calibration_on_sim() {
        let (mut app, store) = app(SimConfig::default(), false);

        app.calibrate_blocking().unwrap();

        let record = app.sequencer().record();
        assert!(app.sequencer().is_valid());
        assert_eq!(record.calibration_count, 1);
        assert!((record.odometry.pulses_per_meter_left - 1012.0).abs() < 20.0);
        assert!((record.ranging.distance_offset + 0.02).abs() < 0.01);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_blocking_calibration_reports_failure() {
        let mut sim_config = SimConfig::default();
        sim_config.drive.fail = true;
        let (mut app, store) = app(sim_config, false);

        let err = app.calibrate_blocking().unwrap_err();

        assert!(err.to_string().contains("Motion command failed"));
        assert!(!app.sequencer().is_valid());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_blocking_calibration_fails_when_store_too_small() {
        let (mut app, store) = app_with_store(SimConfig::default(), false, MemoryStore::new(16));

        let err = app.calibrate_blocking().unwrap_err();

        assert!(err.to_string().contains("Calibration not saved"));
        assert!(matches!(
            app.sequencer().last_error(),
            Some(Error::StoreRange { capacity: 16, .. })
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_auto_calibrate_requests_when_invalid() {
        let (mut app, _) = app(SimConfig::default(), true);
        assert!(app.sequencer().is_requested());
        assert_ne!(app.step(), CalibrationState::Idle);
    }

    #[test]
    fn test_run_stops_when_flag_cleared() {
        let (mut app, _) = app(SimConfig::default(), false);
        app.running_flag().store(false, Ordering::Relaxed);
        app.run().unwrap();
        assert_eq!(app.sequencer().state(), CalibrationState::Idle);
    }
}
