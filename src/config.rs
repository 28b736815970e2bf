//! Configuration for the Tula calibration daemon
//!
//! Loads configuration from a TOML file. Every section and field is optional;
//! omitted values fall back to the factory calibration procedure (100 IMU
//! samples at 10 ms, a 30 s compass sweep, a 1 m odometry run, and so on).

use crate::error::Result;
use crate::sim::SimConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub calibration: CalibrationConfig,
    pub drift: DriftConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub runtime: RuntimeConfig,
}

/// Hardware backend selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Backend type (`"sim"`)
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// Simulated hardware parameters
    #[serde(default)]
    pub sim: SimConfig,
}

fn default_device_type() -> String {
    "sim".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            sim: SimConfig::default(),
        }
    }
}

/// Per-calibrator parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub imu: ImuCalibrationConfig,
    pub magnetometer: MagCalibrationConfig,
    pub odometry: OdometryCalibrationConfig,
    pub ranging: RangingCalibrationConfig,
    pub battery: BatteryCalibrationConfig,
    pub temperature: TemperatureCalibrationConfig,
}

/// Stationary accelerometer bias estimation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImuCalibrationConfig {
    pub samples: usize,
    pub interval_ms: u64,
    /// Per-axis standard deviation above which the stage fails (m/s²)
    pub max_stddev: f32,
}

impl Default for ImuCalibrationConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            interval_ms: 10,
            max_stddev: 0.5,
        }
    }
}

/// Compass min/max sweep while the robot rotates
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MagCalibrationConfig {
    /// Sweep duration (ms)
    pub window_ms: u64,
    pub interval_ms: u64,
    /// Half-range below which a numeric-stability warning is logged
    pub min_half_range: f32,
}

impl Default for MagCalibrationConfig {
    fn default() -> Self {
        Self {
            window_ms: 30_000,
            interval_ms: 50,
            min_half_range: 1e-3,
        }
    }
}

/// Straight-line encoder run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OdometryCalibrationConfig {
    /// Commanded travel (mm)
    pub distance_mm: u32,
    /// Pause after resetting counters (ms)
    pub settle_ms: u64,
    /// Allowed relative left/right pulse difference
    pub max_mismatch: f32,
}

impl Default for OdometryCalibrationConfig {
    fn default() -> Self {
        Self {
            distance_mm: 1000,
            settle_ms: 100,
            max_mismatch: 0.15,
        }
    }
}

/// Ranging against a target at a known distance
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RangingCalibrationConfig {
    pub samples: usize,
    pub interval_ms: u64,
    /// Known target distance (m)
    pub reference_distance: f32,
    /// Offset magnitude that triggers a warning (m)
    pub offset_warn: f32,
    /// Standard deviation that triggers a warning (m)
    pub stddev_warn: f32,
}

impl Default for RangingCalibrationConfig {
    fn default() -> Self {
        Self {
            samples: 50,
            interval_ms: 20,
            reference_distance: 1.0,
            offset_warn: 0.1,
            stddev_warn: 0.05,
        }
    }
}

/// Battery voltage against the pack's nominal voltage
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatteryCalibrationConfig {
    pub samples: usize,
    pub interval_ms: u64,
    /// Reference voltage (V)
    pub nominal_voltage: f32,
}

impl Default for BatteryCalibrationConfig {
    fn default() -> Self {
        Self {
            samples: 10,
            interval_ms: 100,
            nominal_voltage: 12.0,
        }
    }
}

/// Temperature against an assumed ambient reference
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemperatureCalibrationConfig {
    pub samples: usize,
    pub interval_ms: u64,
    /// Reference temperature (°C)
    pub ambient_celsius: f32,
}

impl Default for TemperatureCalibrationConfig {
    fn default() -> Self {
        Self {
            samples: 10,
            interval_ms: 100,
            ambient_celsius: 25.0,
        }
    }
}

/// Periodic accelerometer drift check
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Minimum time between checks (ms)
    pub interval_ms: u64,
    /// Per-axis deviation from stored bias that flags recalibration (m/s²)
    pub threshold: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3_600_000,
            threshold: 2.0,
        }
    }
}

/// Persistent storage image
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// EEPROM image file
    pub path: PathBuf,
    /// Record address inside the image
    pub address: usize,
    /// Image size in bytes
    pub size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/tula/eeprom.bin"),
            address: 0x1000,
            size: 0x2000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Period between sequencer ticks (ms)
    pub tick_interval_ms: u64,
    /// Request a run at startup when no valid record was loaded
    pub auto_calibrate: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            auto_calibrate: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use tula::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("tula.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
