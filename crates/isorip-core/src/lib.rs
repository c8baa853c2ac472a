//! # isorip Core
//!
//! Copy engine for the isorip disc imaging tool.
//!
//! ## Modules
//!
//! - `engine`: The synchronous copy loop driving reader and sink
//! - `session`: Transfer state and the read/retry state machine
//! - `progress`: Rate, ETA and completion accounting
//! - `buffer`: The fixed-capacity chunk buffer reused by every read
//! - `reader`: Source reader capability and a stream-backed implementation
//! - `sink`: Destination sink capability and the image file sink
//! - `units`: Block count formatting for display
//! - `error`: Error types and result aliases
//! - `config`: Runtime configuration
//! - `settings`: Persistent user settings from configuration file
//!
//! ## Example
//!
//! ```ignore
//! use isorip_core::{CopyConfig, CopyEngine, FileSink, StreamReader};
//! use std::fs::File;
//!
//! let mut reader = StreamReader::new(File::open("/dev/sr0")?);
//! let mut sink = FileSink::create("disc.iso")?;
//!
//! let config = CopyConfig::new().chunk_blocks(512);
//! let mut engine = CopyEngine::with_config(config)
//!     .on_progress(|p| eprint!("\r{} ({})", p.copied_display(), p.rate_display()));
//!
//! let summary = engine.copy(&mut reader, &mut sink, Some(2_295_104))?;
//! println!("{} bad blocks", summary.error_blocks);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod reader;
pub mod session;
pub mod settings;
pub mod sink;
pub mod units;

pub use buffer::ChunkBuffer;
pub use config::{CopyConfig, DEFAULT_CHUNK_BLOCKS, MAX_CHUNK_BLOCKS, MIN_CHUNK_BLOCKS};
pub use engine::{CopyEngine, CopySummary, ProgressCallback};
pub use error::{Error, Result};
pub use progress::{format_clock, ProgressSnapshot, RateTracker};
pub use reader::{BlockReader, ReadMode, SeekMode, StreamReader};
pub use session::{ReadOutcome, ReadState, Step, TransferSession};
pub use settings::{BehaviorSettings, CopySettings, Settings, SettingsError};
pub use sink::{BlockSink, FileSink};
pub use units::{format_blocks, UnitCeiling};

/// Size of one block in bytes (one optical-media sector)
pub const BLOCK_SIZE: usize = 2048;
