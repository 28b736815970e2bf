//! Inertial and magnetic sample types

/// Raw inertial unit sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Accelerometer data (m/s²)
    pub accel: [f32; 3], // x, y, z
    /// Gyroscope data (rad/s)
    pub gyro: [f32; 3], // x, y, z
    /// Acquisition time (ms)
    pub timestamp_ms: u64,
}

impl ImuSample {
    /// Create new inertial sample
    pub fn new(accel: [f32; 3], gyro: [f32; 3], timestamp_ms: u64) -> Self {
        Self {
            accel,
            gyro,
            timestamp_ms,
        }
    }

    /// Stationary sample with only the given acceleration
    pub fn at_rest(accel: [f32; 3]) -> Self {
        Self::new(accel, [0.0; 3], 0)
    }
}

impl Default for ImuSample {
    fn default() -> Self {
        Self::new([0.0; 3], [0.0; 3], 0)
    }
}

/// Raw magnetometer sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagSample {
    /// Magnetic field (Gauss)
    pub field: [f32; 3],
    /// Acquisition time (ms)
    pub timestamp_ms: u64,
}

impl MagSample {
    /// Create new magnetometer sample
    pub fn new(field: [f32; 3], timestamp_ms: u64) -> Self {
        Self {
            field,
            timestamp_ms,
        }
    }
}
