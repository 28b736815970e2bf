//! Fixed-size persistent byte-range store
//!
//! Models the EEPROM-style storage the calibration record lives in. Reads and
//! writes are whole-range and synchronous.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Byte-addressable persistent store
pub trait ByteStore: Send {
    /// Total addressable bytes
    fn capacity(&self) -> usize;

    /// Fill `buf` from `address`
    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `address`
    fn write(&mut self, address: usize, data: &[u8]) -> Result<()>;
}

fn check_range(address: usize, len: usize, capacity: usize) -> Result<()> {
    match address.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(Error::StoreRange {
            address,
            len,
            capacity,
        }),
    }
}

/// Store backed by a fixed-size image file on disk
pub struct FileStore {
    path: PathBuf,
    file: File,
    capacity: usize,
}

impl FileStore {
    /// Open (or create) an image file of `capacity` bytes
    ///
    /// New or short files are zero-extended to `capacity`.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len < capacity as u64 {
            file.set_len(capacity as u64)?;
            log::debug!(
                "FileStore: extended {} from {} to {} bytes",
                path.display(),
                len,
                capacity
            );
        }

        Ok(Self {
            path,
            file,
            capacity,
        })
    }

    /// Path of the backing image
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for FileStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<()> {
        check_range(address, buf.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(address as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<()> {
        check_range(address, data.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(address as u64))?;
        self.file.write_all(data)?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// In-memory store that records how often it was written
///
/// Clones share the same bytes, so a test can keep a handle after moving the
/// store into a sequencer.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

struct MemoryStoreInner {
    bytes: Vec<u8>,
    writes: usize,
}

impl MemoryStore {
    /// Create a zero-filled store
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner {
                bytes: vec![0; capacity],
                writes: 0,
            })),
        }
    }

    /// Number of successful write calls
    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.lock().bytes.clone()
    }

    /// Overwrite bytes directly, bypassing the write counter
    pub fn poke(&self, address: usize, data: &[u8]) {
        let mut inner = self.inner.lock();
        let end = (address + data.len()).min(inner.bytes.len());
        if address < end {
            let n = end - address;
            inner.bytes[address..end].copy_from_slice(&data[..n]);
        }
    }
}

impl ByteStore for MemoryStore {
    fn capacity(&self) -> usize {
        self.inner.lock().bytes.len()
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<()> {
        let inner = self.inner.lock();
        check_range(address, buf.len(), inner.bytes.len())?;
        buf.copy_from_slice(&inner.bytes[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        check_range(address, data.len(), inner.bytes.len())?;
        inner.bytes[address..address + data.len()].copy_from_slice(data);
        inner.writes += 1;
        Ok(())
    }
}
