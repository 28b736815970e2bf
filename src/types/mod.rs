//! Common data types

pub mod battery;
pub mod imu;

pub use battery::*;
pub use imu::*;
