//! Drive base driver trait

use crate::error::Result;

/// Differential drive base with wheel encoders
pub trait DriveBase: Send {
    /// Move straight forward, blocking until the move has completed
    ///
    /// # Arguments
    /// * `distance_mm` - Commanded travel in millimeters
    fn move_forward_mm(&mut self, distance_mm: u32) -> Result<()>;

    /// Zero both encoder counters
    fn reset_encoders(&mut self);

    /// Current (left, right) encoder pulse counts since the last reset
    fn encoder_counts(&mut self) -> (u32, u32);
}
