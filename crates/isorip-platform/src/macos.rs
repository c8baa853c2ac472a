//! macOS platform implementation
//!
//! Optical drives appear as `/dev/diskN`; capacity comes from the
//! `DKIOCGETBLOCKCOUNT` and `DKIOCGETBLOCKSIZE` ioctls.

use crate::{open_error, DeviceInfo, PlatformError, PlatformOps, Result, SourceDevice, SECTOR_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::io::AsRawFd;
use std::path::Path;

const DKIOCGETBLOCKSIZE: libc::c_ulong = 0x40046418;
const DKIOCGETBLOCKCOUNT: libc::c_ulong = 0x40086419;

/// macOS platform implementation
pub struct MacOSPlatform;

impl PlatformOps for MacOSPlatform {
    fn open_source(path: &str) -> Result<Box<dyn SourceDevice>> {
        MacOSDevice::open(path).map(|d| Box::new(d) as Box<dyn SourceDevice>)
    }
}

/// Read-only drive or image
pub struct MacOSDevice {
    file: File,
    info: DeviceInfo,
}

impl MacOSDevice {
    /// Open a drive or image for reading
    pub fn open(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(PlatformError::DeviceNotFound(path.to_string()));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| match e.raw_os_error() {
                Some(libc::EBUSY) => PlatformError::DeviceBusy(path.to_string()),
                _ => open_error(path, e),
            })?;

        let size = device_size(&mut file)?;
        let sector_size = device_sector_size(&file).unwrap_or(SECTOR_SIZE as u32);

        tracing::debug!(path, size, sector_size, "Opened source");

        Ok(Self {
            file,
            info: DeviceInfo {
                path: path.to_string(),
                size,
                sector_size,
            },
        })
    }
}

impl SourceDevice for MacOSDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl Read for MacOSDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for MacOSDevice {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Get device size using ioctl, falling back to the stream length
fn device_size(file: &mut File) -> Result<u64> {
    let mut block_count: u64 = 0;
    // SAFETY: ioctl with DKIOCGETBLOCKCOUNT writes a u64 to the provided pointer.
    // We pass a valid mutable reference to a u64, and fd is valid.
    #[allow(unsafe_code)]
    let result = unsafe { libc::ioctl(file.as_raw_fd(), DKIOCGETBLOCKCOUNT, &mut block_count) };

    if let Some(block_size) = device_sector_size(file) {
        if result == 0 && block_count > 0 {
            return Ok(block_count * block_size as u64);
        }
    }

    let size = file.seek(SeekFrom::End(0))?;
    file.rewind()?;
    Ok(size)
}

/// Get logical sector size via ioctl
fn device_sector_size(file: &File) -> Option<u32> {
    let mut block_size: u32 = 0;
    // SAFETY: ioctl with DKIOCGETBLOCKSIZE writes a u32 to the provided pointer.
    // We pass a valid mutable reference to a u32, and fd is valid.
    #[allow(unsafe_code)]
    let result = unsafe { libc::ioctl(file.as_raw_fd(), DKIOCGETBLOCKSIZE, &mut block_size) };

    (result == 0 && block_size > 0).then_some(block_size)
}

// ============================================================================
// UNIT TESTS
// ============================================================================
