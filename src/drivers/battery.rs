//! Battery monitor and thermometer driver traits

use crate::error::Result;
use crate::types::{BatterySample, TemperatureSample};

/// Battery monitor driver trait
pub trait BatteryDriver: Send {
    /// Read battery status
    fn read(&mut self) -> Result<BatterySample>;
}

/// Temperature sensor driver trait
pub trait TemperatureDriver: Send {
    /// Read board temperature
    fn read(&mut self) -> Result<TemperatureSample>;
}
