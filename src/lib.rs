//! Tula - On-device sensor calibration for a mobile robot
//!
//! Sequences calibration of the inertial unit, compass, wheel encoders, range
//! finder, camera, battery monitor and thermometer, validates the derived
//! coefficients against physical bounds, and persists them in a fixed-size
//! record. A drift monitor flags the record when the accelerometer wanders
//! away from its calibrated bias.
//!
//! ## Layout
//!
//! - [`record`]: the persisted calibration record and its binary image
//! - [`calibration`]: one calibrator per sensor
//! - [`validator`]: physical-range checks over a finished record
//! - [`persistence`]: record load/save on a byte store
//! - [`sequencer`]: the calibration state machine
//! - [`drift`]: periodic drift detection
//! - [`sim`]: simulated hardware for running without a robot

pub mod app;
pub mod calibration;
pub mod config;
pub mod devices;
pub mod drift;
pub mod drivers;
pub mod error;
pub mod persistence;
pub mod record;
pub mod sequencer;
pub mod sim;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use record::{CalibrationRecord, CalibrationStatus};
pub use sequencer::{CalibrationSequencer, CalibrationState};
