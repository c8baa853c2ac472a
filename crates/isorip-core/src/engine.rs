//! Copy engine
//!
//! Drives a [`BlockReader`] and a [`BlockSink`] through one synchronous loop:
//! seek, read, write, flush, strictly in that order. Unreadable blocks are
//! absorbed by the [`TransferSession`] state machine; seek and write failures
//! abort the session. The reader and the sink are each closed exactly once
//! whatever the outcome.

use crate::buffer::ChunkBuffer;
use crate::config::CopyConfig;
use crate::error::{Error, Result};
use crate::progress::{format_clock, ProgressSnapshot, RateTracker};
use crate::reader::BlockReader;
use crate::session::{ReadOutcome, Step, TransferSession};
use crate::sink::BlockSink;
use crate::units::{format_blocks, UnitCeiling};
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Outcome of a completed copy
#[derive(Debug, Clone)]
pub struct CopySummary {
    /// Blocks written to the destination
    pub copied_blocks: u64,

    /// Blocks substituted with zeros
    pub error_blocks: u64,

    /// Expected size of the source in blocks, if it was known
    pub total_blocks: Option<u64>,

    /// Total time elapsed
    pub elapsed: Duration,

    /// Average rate in blocks per second
    pub average_rate: u64,

    /// Wall-clock time the copy completed
    pub completed_at: DateTime<Local>,
}

impl CopySummary {
    /// Copied size for display
    pub fn copied_display(&self) -> String {
        format_blocks(self.copied_blocks, UnitCeiling::Mib, false)
    }

    /// Average rate for display
    pub fn average_display(&self) -> String {
        format_blocks(self.average_rate, UnitCeiling::Mib, true)
    }

    /// Elapsed time as HH:MM:SS
    pub fn elapsed_display(&self) -> String {
        format_clock(self.elapsed.as_secs())
    }

    /// Completion timestamp as dd/mm/yy HH:MM:SS
    pub fn completed_display(&self) -> String {
        self.completed_at.format("%d/%m/%y %T").to_string()
    }
}

/// Copy engine for block sources
pub struct CopyEngine {
    config: CopyConfig,
    progress_callback: Option<ProgressCallback>,
}

impl CopyEngine {
    /// Create a new engine with default configuration
    pub fn new() -> Self {
        Self {
            config: CopyConfig::default(),
            progress_callback: None,
        }
    }

    /// Create a new engine with custom configuration
    pub fn with_config(config: CopyConfig) -> Self {
        Self {
            config,
            progress_callback: None,
        }
    }

    /// Set a progress callback
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressSnapshot) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &CopyConfig {
        &self.config
    }

    /// Copy the whole source into `sink`
    ///
    /// # Arguments
    /// * `reader` - Opened source reader; closed before this returns
    /// * `sink` - Destination, written at block offsets; closed before this returns
    /// * `total_blocks` - Expected source size, used only for display
    ///
    /// # Returns
    /// * `Ok(CopySummary)` - End of source was reached
    /// * `Err(Error)` - A seek, write or flush failed; data already written
    ///   stays in the sink
    pub fn copy<R, S>(
        &mut self,
        reader: &mut R,
        sink: &mut S,
        total_blocks: Option<u64>,
    ) -> Result<CopySummary>
    where
        R: BlockReader + ?Sized,
        S: BlockSink + ?Sized,
    {
        let result = self.run(reader, sink, total_blocks);

        if let Err(e) = reader.close() {
            tracing::warn!("Failed to close source reader: {}", e);
        }

        if let Err(e) = sink.close() {
            tracing::warn!("Failed to close destination: {}", e);
        }

        result
    }

    fn run<R, S>(
        &mut self,
        reader: &mut R,
        sink: &mut S,
        total_blocks: Option<u64>,
    ) -> Result<CopySummary>
    where
        R: BlockReader + ?Sized,
        S: BlockSink + ?Sized,
    {
        let mut tracker = RateTracker::new(self.config.progress_interval);
        let mut session = TransferSession::new(self.config.chunk_blocks, total_blocks);
        let mut buffer = ChunkBuffer::new(session.nominal_chunk());

        let read_mode = self.config.read_mode();
        let seek_mode = self.config.seek_mode();

        tracing::info!(
            chunk_blocks = session.nominal_chunk(),
            total_blocks = ?total_blocks,
            "Starting copy"
        );

        loop {
            let position = session.current_block();
            reader
                .seek(position, seek_mode)
                .map_err(|source| Error::SeekFailed {
                    block: position,
                    source,
                })?;

            let requested = session.read_chunk_size();
            let outcome = match reader.read(buffer.region_mut(requested), requested, read_mode) {
                Ok(0) => ReadOutcome::EndOfSource,
                Ok(blocks) => ReadOutcome::Data(blocks),
                Err(e) => {
                    tracing::debug!(block = position, blocks = requested, "Read failed: {}", e);
                    ReadOutcome::Failed
                }
            };

            match session.apply(outcome) {
                Step::Write {
                    position,
                    real_blocks,
                    chunk_blocks,
                } => {
                    buffer.zero_tail(real_blocks, chunk_blocks);
                    self.write_chunk(sink, position, buffer.chunk(chunk_blocks))?;
                }
                Step::ZeroFill { position } => {
                    tracing::debug!(block = position, "Unreadable block replaced with zeros");
                    buffer.zero_fill(1);
                    self.write_chunk(sink, position, buffer.chunk(1))?;
                }
                Step::Retry { .. } => {}
                Step::Finished => break,
            }

            let now = Instant::now();
            if tracker.due(now) {
                let snapshot = tracker.sample(now, &session, false);
                self.report(&snapshot);
            }
        }

        let copied_blocks = session.current_block();
        sink.finish(copied_blocks).map_err(|source| Error::WriteFailed {
            block: copied_blocks,
            source,
        })?;

        let snapshot = tracker.sample(Instant::now(), &session, true);
        self.report(&snapshot);

        tracing::info!(
            copied_blocks,
            error_blocks = session.error_block_count(),
            "Copy complete"
        );

        Ok(CopySummary {
            copied_blocks,
            error_blocks: session.error_block_count(),
            total_blocks,
            elapsed: snapshot.elapsed,
            average_rate: snapshot.average_rate,
            completed_at: Local::now(),
        })
    }

    /// Write one chunk, flushing afterwards when configured
    fn write_chunk<S: BlockSink + ?Sized>(
        &self,
        sink: &mut S,
        position: u64,
        data: &[u8],
    ) -> Result<()> {
        sink.write_chunk(position, data)
            .map_err(|source| Error::WriteFailed {
                block: position,
                source,
            })?;

        if self.config.flush_each_write {
            sink.flush().map_err(|source| Error::WriteFailed {
                block: position,
                source,
            })?;
        }

        Ok(())
    }

    fn report(&self, snapshot: &ProgressSnapshot) {
        if let Some(ref callback) = self.progress_callback {
            callback(snapshot);
        }
    }
}

impl Default for CopyEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
