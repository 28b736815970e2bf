//! Calibration record persistence
//!
//! Stores the fixed-size record image at a fixed address of a [`ByteStore`].
//! Saves always overwrite the whole image. Loads fall back to defaults in memory
//! when the stored image is foreign or not `Valid`, leaving storage untouched
//! until the next explicit save.

use crate::drivers::ByteStore;
use crate::error::Result;
use crate::record::{CALIBRATION_MAGIC, CalibrationRecord, CalibrationStatus, RECORD_SIZE};

/// Default record address in the store
pub const DEFAULT_RECORD_ADDRESS: usize = 0x1000;

/// Where a loaded record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Valid image read from storage
    Stored,
    /// Storage held no usable record; defaults substituted
    Defaults,
}

/// Reads and writes the calibration record image
pub struct Persistence {
    store: Box<dyn ByteStore>,
    address: usize,
}

impl Persistence {
    pub fn new(store: Box<dyn ByteStore>, address: usize) -> Self {
        Self { store, address }
    }

    /// Overwrite the stored image with `record`
    pub fn save(&mut self, record: &CalibrationRecord) -> Result<()> {
        self.store.write(self.address, &record.encode())?;
        log::info!(
            "Calibration saved to storage at {:#06x} ({} bytes)",
            self.address,
            RECORD_SIZE
        );
        Ok(())
    }

    /// Read the raw stored image without any validity check
    pub fn read_raw(&mut self) -> Result<CalibrationRecord> {
        let mut buf = [0u8; RECORD_SIZE];
        self.store.read(self.address, &mut buf)?;
        CalibrationRecord::decode(&buf)
    }

    /// Load the stored record, substituting defaults when it is unusable
    ///
    /// `now_ms` is only used to report the record's age. A storage read error
    /// is logged and treated like an unusable image.
    pub fn load(&mut self, now_ms: u64) -> (CalibrationRecord, LoadSource) {
        match self.read_raw() {
            Ok(record) if record.is_loadable() => {
                log::info!(
                    "Calibration loaded from storage (count: {}, age: {} seconds)",
                    record.calibration_count,
                    now_ms.saturating_sub(record.timestamp_ms) / 1000
                );
                (record, LoadSource::Stored)
            }
            Ok(record) => {
                if record.magic != CALIBRATION_MAGIC {
                    log::warn!(
                        "Stored calibration has foreign magic {:#010x}, using defaults",
                        record.magic
                    );
                } else if record.status != CalibrationStatus::Valid {
                    log::warn!(
                        "Stored calibration status is {:?}, using defaults",
                        record.status
                    );
                }
                (CalibrationRecord::defaults(), LoadSource::Defaults)
            }
            Err(e) => {
                log::warn!("Failed to read stored calibration ({}), using defaults", e);
                (CalibrationRecord::defaults(), LoadSource::Defaults)
            }
        }
    }
}
