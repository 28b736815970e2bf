//! Ranging sensor driver trait

use crate::error::Result;

/// Single-beam ranging sensor driver trait
pub trait RangeDriver: Send {
    /// Read distance to the target in meters
    ///
    /// Hardware that reports failure as a negative distance may pass the raw
    /// value through; callers treat any negative reading as a failed read.
    fn read_distance(&mut self) -> Result<f32>;
}
