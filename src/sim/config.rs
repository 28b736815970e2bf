//! Simulated hardware configuration
//!
//! Every parameter has a default describing a healthy, slightly miscalibrated
//! robot, so a bare `[device] type = "sim"` runs a successful calibration.
//!
//! ```text
//! SimConfig
//! ├── random_seed                 # 0 = entropy
//! ├── realtime                    # wall clock vs simulated clock
//! ├── SimImuConfig                # accel bias, noise, bias drift
//! ├── SimMagConfig                # hard iron, ellipsoid radii, rotation
//! ├── SimDriveConfig              # per-wheel resolution, slip, speed
//! ├── SimRangeConfig              # target distance, bias, noise
//! ├── SimBatteryConfig            # voltage, current, noise
//! └── SimTemperatureConfig        # reading, noise
//! ```
//!
//! Each sensor section carries a `fail` flag that makes the sensor report a
//! failure on every access.

use serde::{Deserialize, Serialize};

/// Root of the `[device.sim]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Noise seed (0 = random each run)
    pub random_seed: u64,
    /// Block on the wall clock; when false a simulated clock skips every wait
    pub realtime: bool,
    pub imu: SimImuConfig,
    pub magnetometer: SimMagConfig,
    pub drive: SimDriveConfig,
    pub ranging: SimRangeConfig,
    pub battery: SimBatteryConfig,
    pub temperature: SimTemperatureConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            realtime: true,
            imu: SimImuConfig::default(),
            magnetometer: SimMagConfig::default(),
            drive: SimDriveConfig::default(),
            ranging: SimRangeConfig::default(),
            battery: SimBatteryConfig::default(),
            temperature: SimTemperatureConfig::default(),
        }
    }
}

/// Accelerometer and gyroscope
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimImuConfig {
    /// Constant accelerometer bias (m/s²)
    pub accel_bias: [f32; 3],
    pub accel_stddev: f32,
    pub gyro_stddev: f32,
    /// Bias growth per simulated hour (m/s² per hour)
    pub bias_drift_per_hour: [f32; 3],
    pub fail: bool,
}

impl Default for SimImuConfig {
    fn default() -> Self {
        Self {
            accel_bias: [0.05, -0.03, 0.08],
            accel_stddev: 0.02,
            gyro_stddev: 0.001,
            bias_drift_per_hour: [0.0; 3],
            fail: false,
        }
    }
}

/// Compass on a robot rotating in place
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimMagConfig {
    /// Hard iron offset (µT)
    pub hard_iron: [f32; 3],
    /// Field ellipsoid half-axes (µT)
    pub radii: [f32; 3],
    /// Time for one full rotation (ms)
    pub rotation_period_ms: u64,
    pub stddev: f32,
    pub fail: bool,
}

impl Default for SimMagConfig {
    fn default() -> Self {
        Self {
            hard_iron: [20.0, -15.0, 5.0],
            radii: [45.0, 40.0, 30.0],
            rotation_period_ms: 10_000,
            stddev: 0.3,
            fail: false,
        }
    }
}

/// Differential drive with wheel encoders
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimDriveConfig {
    pub pulses_per_meter_left: f32,
    pub pulses_per_meter_right: f32,
    /// Multiplicative wheel slip noise
    pub slip_stddev: f32,
    /// Travel speed used to advance the clock during a move (m/s)
    pub speed_mps: f32,
    pub fail: bool,
}

impl Default for SimDriveConfig {
    fn default() -> Self {
        Self {
            pulses_per_meter_left: 1012.0,
            pulses_per_meter_right: 988.0,
            slip_stddev: 0.002,
            speed_mps: 0.2,
            fail: false,
        }
    }
}

/// Single-beam range finder facing a calibration target
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimRangeConfig {
    /// True distance to the target (m)
    pub target_distance: f32,
    /// Systematic measurement bias (m)
    pub bias: f32,
    pub stddev: f32,
    /// Report a negative distance on every read
    pub fail: bool,
}

impl Default for SimRangeConfig {
    fn default() -> Self {
        Self {
            target_distance: 1.0,
            bias: 0.02,
            stddev: 0.005,
            fail: false,
        }
    }
}

/// Battery monitor
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimBatteryConfig {
    pub voltage: f32,
    pub current: f32,
    pub voltage_stddev: f32,
    pub fail: bool,
}

impl Default for SimBatteryConfig {
    fn default() -> Self {
        Self {
            voltage: 11.8,
            current: 0.6,
            voltage_stddev: 0.01,
            fail: false,
        }
    }
}

/// Board thermometer
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimTemperatureConfig {
    pub celsius: f32,
    pub stddev: f32,
    pub fail: bool,
}

impl Default for SimTemperatureConfig {
    fn default() -> Self {
        Self {
            celsius: 27.5,
            stddev: 0.1,
            fail: false,
        }
    }
}
