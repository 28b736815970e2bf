//! Physical-range validation of a completed calibration record
//!
//! | Check | Bound | On violation |
//! |-------|-------|--------------|
//! | magic | `0xCAFEBABE` | fail |
//! | inertial bias | `|b| <= 5.0` per axis | fail |
//! | inertial scale | `[0.5, 2.0]` per axis | fail |
//! | magnetic scale | `[0.5, 2.0]` per axis | fail |
//! | pulses per meter | `[500, 2000]` per wheel | fail |
//! | camera focal length | `[100, 1000]` | fail |
//! | ranging offset | `|o| <= 0.2` | warn |
//!
//! Range checks use `RangeInclusive::contains`, so NaN and infinities fail.

use crate::error::{Error, Result};
use crate::record::{CALIBRATION_MAGIC, CalibrationRecord};
use std::ops::RangeInclusive;

/// Largest accepted accelerometer bias magnitude (m/s²)
pub const MAX_IMU_BIAS: f32 = 5.0;

/// Accepted inertial and magnetic scale factors
pub const SCALE_RANGE: RangeInclusive<f32> = 0.5..=2.0;

/// Accepted encoder resolution (pulses per meter)
pub const PULSES_PER_METER_RANGE: RangeInclusive<f32> = 500.0..=2000.0;

/// Accepted camera focal length (pixels)
pub const FOCAL_LENGTH_RANGE: RangeInclusive<f32> = 100.0..=1000.0;

/// Ranging offset magnitude above which a warning is logged (m)
pub const RANGE_OFFSET_WARN: f32 = 0.2;

fn check(field: &'static str, value: f32, range: &RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        log::error!("{} out of range: {}", field, value);
        Err(Error::OutOfRange { field, value })
    }
}

fn check_axes(field: &'static str, values: &[f32; 3], range: &RangeInclusive<f32>) -> Result<()> {
    values.iter().try_for_each(|v| check(field, *v, range))
}

/// Validate a record; never mutates it
///
/// Returns the first violation found.
pub fn validate(record: &CalibrationRecord) -> Result<()> {
    log::info!("Validating calibration data");

    if record.magic != CALIBRATION_MAGIC {
        log::error!("Invalid magic number: {:#010x}", record.magic);
        return Err(Error::BadMagic(record.magic));
    }

    let bias_range = -MAX_IMU_BIAS..=MAX_IMU_BIAS;
    check_axes("IMU bias", &record.imu.bias, &bias_range)?;
    check_axes("IMU scale", &record.imu.scale, &SCALE_RANGE)?;
    check_axes("Magnetometer scale", &record.mag.scale, &SCALE_RANGE)?;

    check(
        "Odometer pulses/meter (left)",
        record.odometry.pulses_per_meter_left,
        &PULSES_PER_METER_RANGE,
    )?;
    check(
        "Odometer pulses/meter (right)",
        record.odometry.pulses_per_meter_right,
        &PULSES_PER_METER_RANGE,
    )?;

    if record.ranging.distance_offset.abs() > RANGE_OFFSET_WARN {
        log::warn!(
            "Ranging offset large: {:.3} m",
            record.ranging.distance_offset
        );
    }

    check(
        "Camera focal length",
        record.camera.focal_length,
        &FOCAL_LENGTH_RANGE,
    )?;

    log::info!("Calibration validation passed");
    Ok(())
}
