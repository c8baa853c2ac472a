//! Linux platform implementation
//!
//! Optical drives are block devices (`/dev/sr0`); their capacity comes from
//! `BLKGETSIZE64`. Regular image files fall back to their stream length.

use crate::{open_error, DeviceInfo, PlatformError, PlatformOps, Result, SourceDevice, SECTOR_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Linux platform implementation
pub struct LinuxPlatform;

impl PlatformOps for LinuxPlatform {
    fn open_source(path: &str) -> Result<Box<dyn SourceDevice>> {
        LinuxDevice::open(path).map(|d| Box::new(d) as Box<dyn SourceDevice>)
    }
}

/// Read-only drive or image
pub struct LinuxDevice {
    file: File,
    info: DeviceInfo,
}

impl LinuxDevice {
    /// Open a drive or image for reading
    pub fn open(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(PlatformError::DeviceNotFound(path.to_string()));
        }

        let mut file = OpenOptions::new().read(true).open(path).map_err(|e| {
            match e.raw_os_error() {
                Some(libc::ENOMEDIUM) => PlatformError::NoMedium(path.to_string()),
                Some(libc::EBUSY) => PlatformError::DeviceBusy(path.to_string()),
                _ => open_error(path, e),
            }
        })?;

        let size = device_size(&mut file)?;
        let sector_size = device_sector_size(&file);

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

impl SourceDevice for LinuxDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl Read for LinuxDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for LinuxDevice {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Get device size using ioctl, falling back to the stream length
fn device_size(file: &mut File) -> Result<u64> {
    // Cast via u32 to handle the sign bit on platforms where Ioctl is i32
    const BLKGETSIZE64: libc::Ioctl = 0x80081272u32 as libc::Ioctl;

    let mut size: u64 = 0;
    // SAFETY: ioctl with BLKGETSIZE64 writes a u64 to the provided pointer.
    // We pass a valid mutable reference to a u64, and fd is valid.
    #[allow(unsafe_code)]
    let result = unsafe { libc::ioctl(file.as_raw_fd(), BLKGETSIZE64, &mut size) };

    if result == 0 && size > 0 {
        return Ok(size);
    }

    let size = file.seek(SeekFrom::End(0))?;
    file.rewind()?;
    Ok(size)
}

/// Get logical sector size, defaulting to the optical sector size
fn device_sector_size(file: &File) -> u32 {
    const BLKSSZGET: libc::Ioctl = 0x1268u32 as libc::Ioctl;

    let mut sector_size: i32 = 0;
    // SAFETY: ioctl with BLKSSZGET writes an i32 to the provided pointer.
    // We pass a valid mutable reference to an i32, and fd is valid.
    #[allow(unsafe_code)]
    let result = unsafe { libc::ioctl(file.as_raw_fd(), BLKSSZGET, &mut sector_size) };

    if result == 0 && sector_size > 0 {
        sector_size as u32
    } else {
        SECTOR_SIZE as u32
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_nonexistent_device() {
        let result = LinuxDevice::open("/dev/nonexistent_drive_xyz");
        assert!(matches!(result, Err(PlatformError::DeviceNotFound(_))));
    }

    #[test]
    fn test_open_image_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[0u8; 8192]).unwrap();

        let device = LinuxDevice::open(temp.path().to_str().unwrap()).unwrap();

        let info = device.info();
        assert_eq!(info.path, temp.path().to_str().unwrap());
        assert_eq!(info.size, 8192);
        assert_eq!(info.sector_size, 2048);
        assert_eq!(device.block_count(), Some(4));
    }

    #[test]
    fn test_size_query_rewinds() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"ISO9660").unwrap();

        let mut device = LinuxDevice::open(temp.path().to_str().unwrap()).unwrap();

        let mut buf = [0u8; 7];
        device.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ISO9660");
    }

    #[test]
    fn test_empty_image_has_unknown_capacity() {
        let temp = NamedTempFile::new().unwrap();

        let device = LinuxDevice::open(temp.path().to_str().unwrap()).unwrap();

        assert_eq!(device.size(), 0);
        assert_eq!(device.block_count(), None);
    }

    #[test]
    fn test_seek_and_read() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[0xAAu8; 2048]).unwrap();
        temp.write_all(&[0xBBu8; 2048]).unwrap();

        let mut device = LinuxDevice::open(temp.path().to_str().unwrap()).unwrap();
        device.seek(SeekFrom::Start(2048)).unwrap();

        let mut buf = [0u8; 16];
        device.read_exact(&mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0xBB));
    }
}
