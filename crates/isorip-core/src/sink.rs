//! Destination sink capability and the image file sink

use crate::error::{Error, Result};
use crate::BLOCK_SIZE;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Block-addressed destination for copied data
pub trait BlockSink {
    /// Write `data` starting at block `position`
    ///
    /// `data` is always a whole number of blocks.
    fn write_chunk(&mut self, position: u64, data: &[u8]) -> io::Result<()>;

    /// Push written data towards stable storage
    fn flush(&mut self) -> io::Result<()>;

    /// Finalise the destination so it holds exactly `total_blocks` blocks
    fn finish(&mut self, total_blocks: u64) -> io::Result<()>;

    /// Release the destination at the end of a session, successful or not
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: BlockSink + ?Sized> BlockSink for Box<T> {
    fn write_chunk(&mut self, position: u64, data: &[u8]) -> io::Result<()> {
        (**self).write_chunk(position, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn finish(&mut self, total_blocks: u64) -> io::Result<()> {
        (**self).finish(total_blocks)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Image file opened exclusively for one session
///
/// The file is created with `create_new`, so an existing image is never
/// overwritten. `close` syncs whatever was written; the handle itself is
/// released when the sink is dropped.
#[derive(Debug)]
pub struct FileSink {
    file: File,
    path: PathBuf,
}

impl FileSink {
    /// Create a new image file at `path`
    ///
    /// # Errors
    /// * [`Error::OutputExists`] - something already exists at `path`
    /// * [`Error::Io`] - the file could not be created
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            return Err(Error::OutputExists(path.to_path_buf()));
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    Error::OutputExists(path.to_path_buf())
                } else {
                    Error::Io(e)
                }
            })?;

        tracing::debug!("Created output image {:?}", path);

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockSink for FileSink {
    fn write_chunk(&mut self, position: u64, data: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(position * BLOCK_SIZE as u64))?;
        self.file.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn finish(&mut self, total_blocks: u64) -> io::Result<()> {
        self.file.set_len(total_blocks * BLOCK_SIZE as u64)?;
        self.file.sync_all()
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }
}
