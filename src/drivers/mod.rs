//! Collaborator traits consumed by the calibration core

pub mod battery;
pub mod clock;
pub mod drive;
pub mod imu;
pub mod ranging;
pub mod store;

pub use battery::{BatteryDriver, TemperatureDriver};
pub use clock::{Clock, SystemClock};
pub use drive::DriveBase;
pub use imu::{ImuDriver, MagnetometerDriver};
pub use ranging::RangeDriver;
pub use store::{ByteStore, FileStore, MemoryStore};

use parking_lot::Mutex;
use std::sync::Arc;

/// Inertial unit shared by the inertial calibrator and the drift monitor
pub type SharedImu = Arc<Mutex<dyn ImuDriver>>;

/// Clock shared by every timed component
pub type SharedClock = Arc<dyn Clock>;
