//! Inertial unit and magnetometer driver traits

use crate::error::Result;
use crate::types::{ImuSample, MagSample};

/// Inertial unit driver trait
pub trait ImuDriver: Send {
    /// Single-shot read of accelerometer and gyroscope
    fn read(&mut self) -> Result<ImuSample>;
}

/// Magnetic compass driver trait
pub trait MagnetometerDriver: Send {
    /// Single-shot read of the magnetic field
    fn read(&mut self) -> Result<MagSample>;
}
