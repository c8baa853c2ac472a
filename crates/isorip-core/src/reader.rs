//! Source reader capability
//!
//! The copy engine never talks to a device directly. It is handed a
//! [`BlockReader`] that was opened (and, for protected media, authenticated)
//! beforehand, and drives it through seek/read calls measured in blocks.

use crate::BLOCK_SIZE;
use std::io::{self, Read, Seek, SeekFrom};

/// How a read should treat scrambled sectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Return sectors exactly as stored
    Plain,
    /// Descramble sectors when the reader supports it
    Decrypt,
}

/// How a seek should be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Plain repositioning
    Plain,
    /// Reposition and make sure the key for the new position is loaded
    Key,
}

/// Block-granular source of data
///
/// Read errors are reported for the whole requested chunk: a reader cannot tell
/// the engine which block inside the chunk was bad.
pub trait BlockReader {
    /// Position the reader at `block`, returning the new position
    ///
    /// An error here is fatal for the session.
    fn seek(&mut self, block: u64, mode: SeekMode) -> io::Result<u64>;

    /// Read up to `blocks` blocks into the front of `buffer`
    ///
    /// Returns the number of blocks read. `Ok(0)` means end of source and a
    /// value below `blocks` is a short read near the end. `buffer` holds at
    /// least `blocks * BLOCK_SIZE` bytes.
    fn read(&mut self, buffer: &mut [u8], blocks: usize, mode: ReadMode) -> io::Result<usize>;

    /// Release reader resources
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: BlockReader + ?Sized> BlockReader for Box<T> {
    fn seek(&mut self, block: u64, mode: SeekMode) -> io::Result<u64> {
        (**self).seek(block, mode)
    }

    fn read(&mut self, buffer: &mut [u8], blocks: usize, mode: ReadMode) -> io::Result<usize> {
        (**self).read(buffer, blocks, mode)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// [`BlockReader`] over any seekable byte stream: image files, raw devices
/// opened by the platform layer, or in-memory cursors.
///
/// Streams carry no descrambler, so [`ReadMode::Decrypt`] reads are identical
/// to plain reads. A trailing partial block is zero-padded and counted as a
/// whole block.
pub struct StreamReader<R> {
    inner: R,
}

impl<R: Read + Seek> StreamReader<R> {
    /// Wrap a seekable stream
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read + Seek> BlockReader for StreamReader<R> {
    fn seek(&mut self, block: u64, _mode: SeekMode) -> io::Result<u64> {
        self.inner.seek(SeekFrom::Start(block * BLOCK_SIZE as u64))?;
        Ok(block)
    }

    fn read(&mut self, buffer: &mut [u8], blocks: usize, _mode: ReadMode) -> io::Result<usize> {
        let len = (blocks * BLOCK_SIZE).min(buffer.len());
        let region = &mut buffer[..len];

        let bytes_read = read_exact_or_eof(&mut self.inner, region)?;

        let whole = bytes_read / BLOCK_SIZE;
        if bytes_read % BLOCK_SIZE == 0 {
            return Ok(whole);
        }

        region[bytes_read..(whole + 1) * BLOCK_SIZE].fill(0);
        Ok(whole + 1)
    }
}

/// Read exactly the buffer size or until EOF
fn read_exact_or_eof<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut total_read = 0;

    while total_read < buffer.len() {
        match reader.read(&mut buffer[total_read..]) {
            Ok(0) => break, // EOF
            Ok(n) => total_read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(total_read)
}
