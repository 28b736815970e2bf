//! Error types for Tula

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Tula error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration serialization error
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Raw sensor read failed
    #[error("Failed to read {0}")]
    SensorRead(&'static str),

    /// Commanded motion did not complete
    #[error("Motion command failed: {0}")]
    MoveFailed(String),

    /// Sample spread exceeded the stage limit
    #[error("{sensor} noise too high: stddev {stddev:.3} > {limit:.3}")]
    NoiseTooHigh {
        /// Sensor name
        sensor: &'static str,
        /// Worst observed standard deviation
        stddev: f32,
        /// Allowed standard deviation
        limit: f32,
    },

    /// Left and right encoder counts disagree
    #[error("Encoder mismatch: left={left} right={right} ({error_pct:.2}% error)")]
    EncoderMismatch {
        /// Left wheel pulses
        left: u32,
        /// Right wheel pulses
        right: u32,
        /// Relative difference in percent
        error_pct: f32,
    },

    /// Sampling window produced no readings
    #[error("No samples collected for {0}")]
    NoSamples(&'static str),

    /// Record magic does not match
    #[error("Invalid magic number: {0:#010x}")]
    BadMagic(u32),

    /// Coefficient outside its physical range
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// Record field name
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// Access outside the persistent store
    #[error("Store access out of range: address {address:#06x} + {len} > {capacity}")]
    StoreRange {
        /// Start address
        address: usize,
        /// Access length
        len: usize,
        /// Store capacity
        capacity: usize,
    },

    /// Stored image is too short or malformed
    #[error("Invalid record image: {0}")]
    InvalidImage(String),

    /// Unknown device backend in config
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
