//! Fallback implementation for platforms without block-device queries
//!
//! Sources are opened through `std::fs` and sized from their metadata. Raw
//! drive handles that report no length yield an unknown capacity.

use crate::{open_error, DeviceInfo, PlatformOps, Result, SourceDevice, SECTOR_SIZE};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Generic platform implementation
pub struct GenericPlatform;

impl PlatformOps for GenericPlatform {
    fn open_source(path: &str) -> Result<Box<dyn SourceDevice>> {
        GenericDevice::open(path).map(|d| Box::new(d) as Box<dyn SourceDevice>)
    }
}

/// Read-only drive or image
pub struct GenericDevice {
    file: File,
    info: DeviceInfo,
}

impl GenericDevice {
    /// Open a drive or image for reading
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        tracing::debug!(path, size, "Opened source");

        Ok(Self {
            file,
            info: DeviceInfo {
                path: path.to_string(),
                size,
                sector_size: SECTOR_SIZE as u32,
            },
        })
    }
}

impl SourceDevice for GenericDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl Read for GenericDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for GenericDevice {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}
