//! # isorip Platform
//!
//! Platform-specific access to optical drives and disc images.
//!
//! Sources are always opened read-only. Each platform reports the capacity of
//! the medium through its own block-device queries, falling back to the
//! stream length for regular image files.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::io::{Read, Seek};
use thiserror::Error;

/// Optical-media sector size in bytes
pub const SECTOR_SIZE: u64 = 2048;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Device access denied (need elevated privileges)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Drive has no disc loaded
    #[error("No medium found: {0}")]
    NoMedium(String),

    /// Device is busy or locked
    #[error("Device busy: {0}")]
    DeviceBusy(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Information about an open source
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Device path
    pub path: String,

    /// Total size in bytes, 0 when unknown
    pub size: u64,

    /// Logical sector size reported by the device
    pub sector_size: u32,
}

/// Read-only source opened by the platform layer
pub trait SourceDevice: Read + Seek + Send {
    /// Get information about the source
    fn info(&self) -> &DeviceInfo;

    /// Get the source size in bytes
    fn size(&self) -> u64 {
        self.info().size
    }

    /// Capacity in 2048-byte sectors, if the platform could determine it
    fn block_count(&self) -> Option<u64> {
        blocks_for_size(self.size())
    }
}

/// Platform operations interface
pub trait PlatformOps {
    /// Open a drive or image for reading
    fn open_source(path: &str) -> Result<Box<dyn SourceDevice>>;
}

/// Whole sectors in `size` bytes, `None` when the size is unknown
///
/// A trailing partial sector counts as a whole one.
pub fn blocks_for_size(size: u64) -> Option<u64> {
    if size == 0 {
        None
    } else {
        Some(size.div_ceil(SECTOR_SIZE))
    }
}

/// Translate an open failure into a platform error
pub(crate) fn open_error(path: &str, e: std::io::Error) -> PlatformError {
    match e.kind() {
        std::io::ErrorKind::NotFound => PlatformError::DeviceNotFound(path.to_string()),
        std::io::ErrorKind::PermissionDenied => PlatformError::PermissionDenied(format!(
            "Cannot open {}: {}. Try running with sudo.",
            path, e
        )),
        _ => PlatformError::Io(e),
    }
}

// Platform-specific implementations
cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod linux;
        pub use linux::LinuxPlatform as Platform;
    } else if #[cfg(target_os = "macos")] {
        mod macos;
        pub use macos::MacOSPlatform as Platform;
    } else {
        mod generic;
        pub use generic::GenericPlatform as Platform;
    }
}

/// Open a drive or image for reading using the current platform
pub fn open_source(path: &str) -> Result<Box<dyn SourceDevice>> {
    Platform::open_source(path)
}

/// Capacity of the medium at `path` in 2048-byte sectors
///
/// Returns `Ok(None)` when the source opens but reports no size.
pub fn source_block_count(path: &str) -> Result<Option<u64>> {
    Ok(open_source(path)?.block_count())
}

// ============================================================================
// UNIT TESTS
// ============================================================================
