//! Error types for the isorip core library
//!
//! Only session-aborting failures are represented here. Unreadable blocks are
//! absorbed by the copy engine and never surface as an `Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for isorip operations
#[derive(Error, Debug)]
pub enum Error {
    /// The source reader could not be positioned
    #[error("Failed to seek to block {block}: {source}")]
    SeekFailed {
        /// Block the engine tried to seek to
        block: u64,
        /// Underlying reader error
        source: std::io::Error,
    },

    /// Writing or flushing the destination failed
    #[error("Failed to write block {block}: {source}")]
    WriteFailed {
        /// First block of the chunk being written
        block: u64,
        /// Underlying sink error
        source: std::io::Error,
    },

    /// Output file exists and will not be overwritten
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// IO error outside the copy loop
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the isorip error type
pub type Result<T> = std::result::Result<T, Error>;
