//! Calibration record: the single persisted entity
//!
//! Holds every derived coefficient plus run metadata. The binary image is a
//! fixed-size little-endian layout written by [`CalibrationRecord::encode`]:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 4    | magic (`0xCAFEBABE`) |
//! | 4      | 24   | inertial bias[3], scale[3] |
//! | 28     | 24   | magnetic offset[3], scale[3] |
//! | 52     | 8    | pulses-per-meter left, right |
//! | 60     | 8    | ranging distance offset, angle offset |
//! | 68     | 20   | camera focal, principal x/y, k1, k2 |
//! | 88     | 8    | battery voltage offset, scale |
//! | 96     | 4    | temperature offset |
//! | 100    | 8    | last calibration timestamp (ms) |
//! | 108    | 2    | run counter |
//! | 110    | 1    | status |
//!
//! There is no version field: a layout change invalidates stored images.

use crate::error::{Error, Result};

/// Sentinel identifying a record image
pub const CALIBRATION_MAGIC: u32 = 0xCAFE_BABE;

/// Serialized record length in bytes
pub const RECORD_SIZE: usize = 111;

/// Standard gravity removed from the vertical accelerometer axis (m/s²)
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Nominal VGA camera focal length (pixels)
pub const NOMINAL_FOCAL_LENGTH: f32 = 500.0;

/// Nominal VGA principal point (pixels)
pub const NOMINAL_PRINCIPAL_POINT: [f32; 2] = [320.0, 240.0];

/// Default encoder resolution (pulses per meter)
pub const DEFAULT_PULSES_PER_METER: f32 = 1000.0;

/// Calibration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CalibrationStatus {
    /// No usable calibration
    #[default]
    Invalid = 0,
    /// Produced by a full successful run
    Valid = 1,
    /// Drift detected since the last run
    NeedsRecalibration = 2,
}

impl CalibrationStatus {
    /// Decode a stored status byte; unknown values read as `Invalid`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Valid,
            2 => Self::NeedsRecalibration,
            _ => Self::Invalid,
        }
    }
}

/// Accelerometer correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialCoefficients {
    /// Subtracted from raw acceleration (m/s²)
    pub bias: [f32; 3],
    /// Applied after bias removal
    pub scale: [f32; 3],
}

/// Hard/soft iron correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticCoefficients {
    /// Hard iron offset, subtracted from raw field
    pub offset: [f32; 3],
    /// Per-axis soft iron scale
    pub scale: [f32; 3],
}

/// Wheel encoder resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometryCoefficients {
    pub pulses_per_meter_left: f32,
    pub pulses_per_meter_right: f32,
}

/// Ranging sensor correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangingCoefficients {
    /// Added to raw distance (m)
    pub distance_offset: f32,
    /// Mounting angle offset (rad)
    pub angle_offset: f32,
}

/// Pinhole camera intrinsics with two radial distortion terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length (pixels)
    pub focal_length: f32,
    /// Principal point (x, y) in pixels
    pub principal_point: [f32; 2],
    /// Radial distortion k1, k2
    pub distortion: [f32; 2],
}

impl CameraIntrinsics {
    /// Nominal VGA intrinsics with no distortion
    pub fn nominal() -> Self {
        Self {
            focal_length: NOMINAL_FOCAL_LENGTH,
            principal_point: NOMINAL_PRINCIPAL_POINT,
            distortion: [0.0, 0.0],
        }
    }
}

/// Battery voltage correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryCoefficients {
    /// Added to scaled voltage (V)
    pub voltage_offset: f32,
    pub voltage_scale: f32,
}

/// Every coefficient the calibration run derives, plus metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    pub magic: u32,
    pub imu: InertialCoefficients,
    pub mag: MagneticCoefficients,
    pub odometry: OdometryCoefficients,
    pub ranging: RangingCoefficients,
    pub camera: CameraIntrinsics,
    pub battery: BatteryCoefficients,
    /// Added to raw temperature (°C)
    pub temperature_offset: f32,
    /// Clock time of the last successful run (ms)
    pub timestamp_ms: u64,
    /// Number of successful runs
    pub calibration_count: u16,
    pub status: CalibrationStatus,
}

impl CalibrationRecord {
    /// Uncalibrated record: unit scales, zero offsets, nominal intrinsics
    pub fn defaults() -> Self {
        Self {
            magic: CALIBRATION_MAGIC,
            imu: InertialCoefficients {
                bias: [0.0; 3],
                scale: [1.0; 3],
            },
            mag: MagneticCoefficients {
                offset: [0.0; 3],
                scale: [1.0; 3],
            },
            odometry: OdometryCoefficients {
                pulses_per_meter_left: DEFAULT_PULSES_PER_METER,
                pulses_per_meter_right: DEFAULT_PULSES_PER_METER,
            },
            ranging: RangingCoefficients {
                distance_offset: 0.0,
                angle_offset: 0.0,
            },
            camera: CameraIntrinsics::nominal(),
            battery: BatteryCoefficients {
                voltage_offset: 0.0,
                voltage_scale: 1.0,
            },
            temperature_offset: 0.0,
            timestamp_ms: 0,
            calibration_count: 0,
            status: CalibrationStatus::Invalid,
        }
    }

    /// Magic matches and status is `Valid`
    pub fn is_loadable(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.status == CalibrationStatus::Valid
    }

    /// Serialize to the fixed binary image
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut w = ImageWriter::new();
        w.put_u32(self.magic);
        w.put_f32s(&self.imu.bias);
        w.put_f32s(&self.imu.scale);
        w.put_f32s(&self.mag.offset);
        w.put_f32s(&self.mag.scale);
        w.put_f32(self.odometry.pulses_per_meter_left);
        w.put_f32(self.odometry.pulses_per_meter_right);
        w.put_f32(self.ranging.distance_offset);
        w.put_f32(self.ranging.angle_offset);
        w.put_f32(self.camera.focal_length);
        w.put_f32s(&self.camera.principal_point);
        w.put_f32s(&self.camera.distortion);
        w.put_f32(self.battery.voltage_offset);
        w.put_f32(self.battery.voltage_scale);
        w.put_f32(self.temperature_offset);
        w.put_u64(self.timestamp_ms);
        w.put_u16(self.calibration_count);
        w.put_u8(self.status as u8);
        w.finish()
    }

    /// Parse a binary image; does not check magic or status
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_SIZE {
            return Err(Error::InvalidImage(format!(
                "expected {} bytes, got {}",
                RECORD_SIZE,
                bytes.len()
            )));
        }

        let mut r = ImageReader::new(bytes);
        Ok(Self {
            magic: r.u32(),
            imu: InertialCoefficients {
                bias: r.f32x3(),
                scale: r.f32x3(),
            },
            mag: MagneticCoefficients {
                offset: r.f32x3(),
                scale: r.f32x3(),
            },
            odometry: OdometryCoefficients {
                pulses_per_meter_left: r.f32(),
                pulses_per_meter_right: r.f32(),
            },
            ranging: RangingCoefficients {
                distance_offset: r.f32(),
                angle_offset: r.f32(),
            },
            camera: CameraIntrinsics {
                focal_length: r.f32(),
                principal_point: [r.f32(), r.f32()],
                distortion: [r.f32(), r.f32()],
            },
            battery: BatteryCoefficients {
                voltage_offset: r.f32(),
                voltage_scale: r.f32(),
            },
            temperature_offset: r.f32(),
            timestamp_ms: r.u64(),
            calibration_count: r.u16(),
            status: CalibrationStatus::from_u8(r.u8()),
        })
    }

    // ========================================================================
    // Corrections
    // ========================================================================

    /// Bias-removed, scaled acceleration (gravity stays on the vertical axis)
    pub fn correct_accel(&self, raw: [f32; 3]) -> [f32; 3] {
        std::array::from_fn(|i| (raw[i] - self.imu.bias[i]) * self.imu.scale[i])
    }

    /// Hard/soft iron corrected magnetic field
    pub fn correct_mag(&self, raw: [f32; 3]) -> [f32; 3] {
        std::array::from_fn(|i| (raw[i] - self.mag.offset[i]) * self.mag.scale[i])
    }

    /// Convert (left, right) encoder pulses to meters
    pub fn pulses_to_meters(&self, left: u32, right: u32) -> (f32, f32) {
        (
            left as f32 / self.odometry.pulses_per_meter_left,
            right as f32 / self.odometry.pulses_per_meter_right,
        )
    }

    /// Corrected range (m)
    pub fn correct_range(&self, raw: f32) -> f32 {
        raw + self.ranging.distance_offset
    }

    /// Corrected battery voltage (V)
    pub fn correct_voltage(&self, raw: f32) -> f32 {
        raw * self.battery.voltage_scale + self.battery.voltage_offset
    }

    /// Corrected temperature (°C)
    pub fn correct_temperature(&self, raw: f32) -> f32 {
        raw + self.temperature_offset
    }
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self::defaults()
    }
}

struct ImageWriter {
    buf: [u8; RECORD_SIZE],
    pos: usize,
}

impl ImageWriter {
    fn new() -> Self {
        Self {
            buf: [0; RECORD_SIZE],
            pos: 0,
        }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    fn put_u16(&mut self, v: u16) {
        self.put(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    fn put_u64(&mut self, v: u64) {
        self.put(&v.to_le_bytes());
    }

    fn put_f32(&mut self, v: f32) {
        self.put(&v.to_le_bytes());
    }

    fn put_f32s(&mut self, vs: &[f32]) {
        for v in vs {
            self.put_f32(*v);
        }
    }

    fn finish(self) -> [u8; RECORD_SIZE] {
        debug_assert_eq!(self.pos, RECORD_SIZE);
        self.buf
    }
}

/// Cursor over an image already checked to be `RECORD_SIZE` long
struct ImageReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ImageReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    fn f32x3(&mut self) -> [f32; 3] {
        [self.f32(), self.f32(), self.f32()]
    }
}
