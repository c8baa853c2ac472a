//! Transfer session and the read/retry state machine
//!
//! A reader reports a failure for the whole chunk it was asked for, even when a
//! single block inside it is bad. To isolate that block the session drops to
//! one-block reads after the first failure and stays there until it has
//! re-covered a full nominal chunk, substituting zeros for every block that
//! still fails.
//!
//! ```text
//!            read error
//!   Normal ─────────────► Recovery ──┐ read ok   → write block
//!     ▲                      │  ▲    │ read error → zero-fill block
//!     │  nominal blocks      │  └────┘
//!     └──────────────────────┘
//!        re-covered
//! ```
//!
//! The session never touches the reader or the sink; the engine performs the
//! I/O described by each [`Step`].

/// Read granularity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Reading nominal-size chunks
    Normal,
    /// Reading one block at a time after a failure
    Recovery,
}

/// What the reader returned for the last request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n > 0` blocks were read
    Data(usize),
    /// The reader returned zero blocks
    EndOfSource,
    /// The reader reported an error for the requested chunk
    Failed,
}

/// I/O the engine must perform after applying a [`ReadOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Write `chunk_blocks` blocks at `position`: `real_blocks` of read data
    /// followed by zero padding
    Write {
        /// First block of the chunk
        position: u64,
        /// Blocks of real data at the front of the buffer
        real_blocks: usize,
        /// Blocks requested by the read, and written
        chunk_blocks: usize,
    },
    /// Write one zero block in place of the unreadable block at `position`
    ZeroFill {
        /// The unreadable block
        position: u64,
    },
    /// Nothing to write; re-read the same position one block at a time
    Retry {
        /// First block of the failed chunk
        position: u64,
    },
    /// End of source
    Finished,
}

/// Mutable state of one copy from source to destination
#[derive(Debug, Clone)]
pub struct TransferSession {
    current_block: u64,
    nominal_chunk: usize,
    read_chunk_size: usize,
    state: ReadState,
    recovery_blocks_consumed: usize,
    error_block_count: u64,
    total_blocks: Option<u64>,
    finished: bool,
}

impl TransferSession {
    /// Start a session at block 0
    ///
    /// `nominal_chunk` is raised to 1 if zero. `total_blocks` is only used for
    /// display.
    pub fn new(nominal_chunk: usize, total_blocks: Option<u64>) -> Self {
        let nominal_chunk = nominal_chunk.max(1);
        Self {
            current_block: 0,
            nominal_chunk,
            read_chunk_size: nominal_chunk,
            state: ReadState::Normal,
            recovery_blocks_consumed: 0,
            error_block_count: 0,
            total_blocks,
            finished: false,
        }
    }

    /// Next block to read
    pub fn current_block(&self) -> u64 {
        self.current_block
    }

    /// Blocks to request in the next read
    pub fn read_chunk_size(&self) -> usize {
        self.read_chunk_size
    }

    /// Nominal chunk size
    pub fn nominal_chunk(&self) -> usize {
        self.nominal_chunk
    }

    /// Current read state
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Whether the session is reading one block at a time
    pub fn is_recovering(&self) -> bool {
        self.state == ReadState::Recovery
    }

    /// Single-block reads since recovery began
    pub fn recovery_blocks_consumed(&self) -> usize {
        self.recovery_blocks_consumed
    }

    /// Blocks substituted with zeros so far
    pub fn error_block_count(&self) -> u64 {
        self.error_block_count
    }

    /// Expected size of the source in blocks, if known
    pub fn total_blocks(&self) -> Option<u64> {
        self.total_blocks
    }

    /// Whether end of source has been reached
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance the state machine with the result of the last read
    pub fn apply(&mut self, outcome: ReadOutcome) -> Step {
        let position = self.current_block;

        match outcome {
            ReadOutcome::EndOfSource | ReadOutcome::Data(0) => {
                self.finished = true;
                Step::Finished
            }
            ReadOutcome::Failed => match self.state {
                ReadState::Normal => {
                    self.enter_recovery();
                    Step::Retry { position }
                }
                ReadState::Recovery => {
                    self.error_block_count += 1;
                    self.current_block += 1;
                    self.consume_recovery_block();
                    Step::ZeroFill { position }
                }
            },
            ReadOutcome::Data(blocks) => {
                let chunk_blocks = self.read_chunk_size;
                let real_blocks = blocks.min(chunk_blocks);
                self.current_block += real_blocks as u64;
                if self.state == ReadState::Recovery {
                    self.consume_recovery_block();
                }
                Step::Write {
                    position,
                    real_blocks,
                    chunk_blocks,
                }
            }
        }
    }

    fn enter_recovery(&mut self) {
        tracing::debug!(
            block = self.current_block,
            "Read error, retrying one block at a time"
        );
        self.state = ReadState::Recovery;
        self.read_chunk_size = 1;
        self.recovery_blocks_consumed = 0;
    }

    fn consume_recovery_block(&mut self) {
        self.recovery_blocks_consumed += 1;
        if self.recovery_blocks_consumed >= self.nominal_chunk {
            tracing::debug!(
                block = self.current_block,
                "Recovery span covered, resuming {}-block reads",
                self.nominal_chunk
            );
            self.state = ReadState::Normal;
            self.read_chunk_size = self.nominal_chunk;
            self.recovery_blocks_consumed = 0;
        }
    }
}
