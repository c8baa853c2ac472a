//! Fixed-capacity chunk buffer
//!
//! One buffer is allocated per session, sized for the nominal chunk, and reused
//! for every read. Single-block reads use its first block.

use crate::BLOCK_SIZE;

/// Owned read buffer holding up to `capacity_blocks` blocks
#[derive(Debug)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    capacity_blocks: usize,
}

impl ChunkBuffer {
    /// Allocate a zeroed buffer for `capacity_blocks` blocks
    pub fn new(capacity_blocks: usize) -> Self {
        Self {
            data: vec![0u8; capacity_blocks * BLOCK_SIZE],
            capacity_blocks,
        }
    }

    /// Number of blocks the buffer can hold
    pub fn capacity_blocks(&self) -> usize {
        self.capacity_blocks
    }

    /// Writable region covering the first `blocks` blocks
    ///
    /// `blocks` is capped at the buffer capacity.
    pub fn region_mut(&mut self, blocks: usize) -> &mut [u8] {
        let len = self.byte_len(blocks);
        &mut self.data[..len]
    }

    /// Read-only view of the first `blocks` blocks
    pub fn chunk(&self, blocks: usize) -> &[u8] {
        let len = self.byte_len(blocks);
        &self.data[..len]
    }

    /// Zero blocks `filled..chunk`, padding a short read up to a full chunk
    pub fn zero_tail(&mut self, filled: usize, chunk: usize) {
        let start = self.byte_len(filled);
        let end = self.byte_len(chunk);
        if start < end {
            self.data[start..end].fill(0);
        }
    }

    /// Zero the first `blocks` blocks
    pub fn zero_fill(&mut self, blocks: usize) {
        let len = self.byte_len(blocks);
        self.data[..len].fill(0);
    }

    fn byte_len(&self, blocks: usize) -> usize {
        blocks.min(self.capacity_blocks) * BLOCK_SIZE
    }
}
