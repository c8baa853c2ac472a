//! Runtime configuration for copy operations

use crate::reader::{ReadMode, SeekMode};
use std::time::Duration;

/// Default nominal chunk size in blocks (512 blocks = 1 MiB)
pub const DEFAULT_CHUNK_BLOCKS: usize = 512;

/// Minimum chunk size in blocks
pub const MIN_CHUNK_BLOCKS: usize = 1;

/// Maximum chunk size in blocks (16 MiB)
pub const MAX_CHUNK_BLOCKS: usize = 8192;

/// Default interval between progress samples
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the copy engine
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Nominal number of blocks requested per read
    pub chunk_blocks: usize,

    /// Whether to flush the sink after every write
    pub flush_each_write: bool,

    /// Whether to ask the reader to decrypt scrambled sectors
    pub decrypt: bool,

    /// Minimum time between two progress samples
    pub progress_interval: Duration,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            chunk_blocks: DEFAULT_CHUNK_BLOCKS,
            flush_each_write: true,
            decrypt: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl CopyConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nominal chunk size (clamped to valid range)
    pub fn chunk_blocks(mut self, blocks: usize) -> Self {
        self.chunk_blocks = blocks.clamp(MIN_CHUNK_BLOCKS, MAX_CHUNK_BLOCKS);
        self
    }

    /// Set flush after each write
    pub fn flush_each_write(mut self, flush: bool) -> Self {
        self.flush_each_write = flush;
        self
    }

    /// Set decrypt mode
    pub fn decrypt(mut self, decrypt: bool) -> Self {
        self.decrypt = decrypt;
        self
    }

    /// Set the progress sampling interval
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Read mode passed to the source reader
    pub fn read_mode(&self) -> ReadMode {
        if self.decrypt {
            ReadMode::Decrypt
        } else {
            ReadMode::Plain
        }
    }

    /// Seek mode passed to the source reader
    ///
    /// Decrypting readers need a key seek so the title key covering the new
    /// position is in place before the next read.
    pub fn seek_mode(&self) -> SeekMode {
        if self.decrypt {
            SeekMode::Key
        } else {
            SeekMode::Plain
        }
    }
}
