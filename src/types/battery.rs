//! Battery and temperature sample types

/// Battery monitor sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatterySample {
    /// Voltage in volts
    pub voltage: f32,
    /// Current in amps (negative when charging)
    pub current: f32,
    /// Charge level (0-100%)
    pub percentage: f32,
    /// Acquisition time (ms)
    pub timestamp_ms: u64,
}

impl BatterySample {
    /// Create new battery sample
    pub fn new(voltage: f32, current: f32, percentage: f32, timestamp_ms: u64) -> Self {
        Self {
            voltage,
            current,
            percentage,
            timestamp_ms,
        }
    }
}

/// Temperature sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureSample {
    /// Temperature (°C)
    pub celsius: f32,
    /// Acquisition time (ms)
    pub timestamp_ms: u64,
}

impl TemperatureSample {
    /// Create new temperature sample
    pub fn new(celsius: f32, timestamp_ms: u64) -> Self {
        Self {
            celsius,
            timestamp_ms,
        }
    }
}
