//! Integration tests for isorip-core
//!
//! These tests drive the copy engine end to end into real image files.

use isorip_core::{
    BlockReader, CopyConfig, CopyEngine, Error, FileSink, ProgressSnapshot, ReadMode, SeekMode,
    StreamReader, BLOCK_SIZE,
};
use std::collections::HashSet;
use std::io::{self, Cursor};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Source image where block `n` is filled with `n as u8`
fn disc_image(blocks: usize) -> Vec<u8> {
    (0..blocks)
        .flat_map(|b| std::iter::repeat_n(b as u8, BLOCK_SIZE))
        .collect()
}

/// Stream reader with injected medium faults
///
/// A read covering any bad block fails as a whole, the way an optical drive
/// reports a failed multi-sector read.
struct FaultyDisc {
    inner: StreamReader<Cursor<Vec<u8>>>,
    bad: HashSet<u64>,
    seek_fails_at: Option<u64>,
    position: u64,
}

impl FaultyDisc {
    fn new(blocks: usize) -> Self {
        Self {
            inner: StreamReader::new(Cursor::new(disc_image(blocks))),
            bad: HashSet::new(),
            seek_fails_at: None,
            position: 0,
        }
    }

    fn bad_block(mut self, block: u64) -> Self {
        self.bad.insert(block);
        self
    }

    fn seek_failure(mut self, block: u64) -> Self {
        self.seek_fails_at = Some(block);
        self
    }
}

impl BlockReader for FaultyDisc {
    fn seek(&mut self, block: u64, mode: SeekMode) -> io::Result<u64> {
        if self.seek_fails_at == Some(block) {
            return Err(io::Error::other("drive not ready"));
        }
        self.position = block;
        self.inner.seek(block, mode)
    }

    fn read(&mut self, buffer: &mut [u8], blocks: usize, mode: ReadMode) -> io::Result<usize> {
        let span = self.position..self.position + blocks as u64;
        if span.clone().any(|b| self.bad.contains(&b)) {
            return Err(io::Error::other("medium error"));
        }
        let read = self.inner.read(buffer, blocks, mode)?;
        self.position += read as u64;
        Ok(read)
    }
}

fn block_of(image: &[u8], block: usize) -> &[u8] {
    &image[block * BLOCK_SIZE..(block + 1) * BLOCK_SIZE]
}

fn output_len(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

// ============================================================================
// Clean copies
// ============================================================================

#[test]
fn test_clean_copy_is_identical() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");
    let source = disc_image(100);

    let mut reader = StreamReader::new(Cursor::new(source.clone()));
    let mut sink = FileSink::create(&output).unwrap();
    let mut engine = CopyEngine::with_config(CopyConfig::new().chunk_blocks(16));

    let summary = engine.copy(&mut reader, &mut sink, Some(100)).unwrap();
    drop(sink);

    assert_eq!(summary.copied_blocks, 100);
    assert_eq!(summary.error_blocks, 0);
    assert_eq!(std::fs::read(&output).unwrap(), source);
}

#[test]
fn test_partial_trailing_block_is_padded() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");
    let mut source = disc_image(10);
    source.extend_from_slice(&[0xEE; 100]);

    let mut reader = StreamReader::new(Cursor::new(source));
    let mut sink = FileSink::create(&output).unwrap();
    let mut engine = CopyEngine::with_config(CopyConfig::new().chunk_blocks(4));

    let summary = engine.copy(&mut reader, &mut sink, None).unwrap();
    drop(sink);

    assert_eq!(summary.copied_blocks, 11);
    let image = std::fs::read(&output).unwrap();
    assert_eq!(image.len(), 11 * BLOCK_SIZE);
    let last = block_of(&image, 10);
    assert!(last[..100].iter().all(|&b| b == 0xEE));
    assert!(last[100..].iter().all(|&b| b == 0));
}

#[test]
fn test_empty_source_produces_empty_image() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");

    let mut reader = StreamReader::new(Cursor::new(Vec::new()));
    let mut sink = FileSink::create(&output).unwrap();

    let summary = CopyEngine::new()
        .copy(&mut reader, &mut sink, Some(0))
        .unwrap();

    assert_eq!(summary.copied_blocks, 0);
    assert_eq!(output_len(&output), 0);
}

// ============================================================================
// Fault handling
// ============================================================================

#[test]
fn test_single_bad_block_is_zero_filled() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");
    let source = disc_image(600);

    let mut reader = FaultyDisc::new(600).bad_block(37);
    let mut sink = FileSink::create(&output).unwrap();
    let mut engine = CopyEngine::with_config(CopyConfig::new().chunk_blocks(512));

    let summary = engine.copy(&mut reader, &mut sink, Some(600)).unwrap();
    drop(sink);

    assert_eq!(summary.copied_blocks, 600);
    assert_eq!(summary.error_blocks, 1);

    let image = std::fs::read(&output).unwrap();
    assert_eq!(image.len(), 600 * BLOCK_SIZE);
    assert!(block_of(&image, 37).iter().all(|&b| b == 0));
    for block in (0..600).filter(|&b| b != 37) {
        assert_eq!(
            block_of(&image, block),
            block_of(&source, block),
            "block {} differs",
            block
        );
    }
}

#[test]
fn test_adjacent_bad_blocks_are_counted() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");

    let mut reader = FaultyDisc::new(64)
        .bad_block(10)
        .bad_block(11)
        .bad_block(40);
    let mut sink = FileSink::create(&output).unwrap();
    let mut engine = CopyEngine::with_config(CopyConfig::new().chunk_blocks(8));

    let summary = engine.copy(&mut reader, &mut sink, Some(64)).unwrap();
    drop(sink);

    assert_eq!(summary.copied_blocks, 64);
    assert_eq!(summary.error_blocks, 3);

    let image = std::fs::read(&output).unwrap();
    for block in [10, 11, 40] {
        assert!(block_of(&image, block).iter().all(|&b| b == 0));
    }
    assert!(block_of(&image, 12).iter().all(|&b| b == 12));
}

#[test]
fn test_seek_failure_aborts_and_keeps_prefix() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");
    let source = disc_image(600);

    let mut reader = FaultyDisc::new(600).seek_failure(250);
    let mut sink = FileSink::create(&output).unwrap();
    let mut engine = CopyEngine::with_config(CopyConfig::new().chunk_blocks(50));

    let result = engine.copy(&mut reader, &mut sink, Some(600));
    drop(sink);

    assert!(matches!(result, Err(Error::SeekFailed { block: 250, .. })));

    let image = std::fs::read(&output).unwrap();
    assert_eq!(image.len(), 250 * BLOCK_SIZE);
    assert_eq!(image[..], source[..250 * BLOCK_SIZE]);
}

// ============================================================================
// Destination handling
// ============================================================================

#[test]
fn test_existing_output_is_refused() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");
    std::fs::write(&output, b"previous rip").unwrap();

    let result = FileSink::create(&output);

    assert!(matches!(result, Err(Error::OutputExists(_))));
    assert_eq!(std::fs::read(&output).unwrap(), b"previous rip");
}

#[test]
fn test_copy_without_flushing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");
    let source = disc_image(33);

    let mut reader = StreamReader::new(Cursor::new(source.clone()));
    let mut sink = FileSink::create(&output).unwrap();
    let config = CopyConfig::new().chunk_blocks(8).flush_each_write(false);

    CopyEngine::with_config(config)
        .copy(&mut reader, &mut sink, None)
        .unwrap();
    drop(sink);

    assert_eq!(std::fs::read(&output).unwrap(), source);
}

// ============================================================================
// Progress reporting
// ============================================================================

#[test]
fn test_progress_ends_with_final_sample() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("disc.iso");

    let samples: Arc<Mutex<Vec<ProgressSnapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let samples_clone = Arc::clone(&samples);

    let config = CopyConfig::new()
        .chunk_blocks(10)
        .progress_interval(Duration::ZERO);
    let mut engine = CopyEngine::with_config(config).on_progress(move |p| {
        samples_clone.lock().unwrap().push(p.clone());
    });

    let mut reader = FaultyDisc::new(40).bad_block(5);
    let mut sink = FileSink::create(&output).unwrap();
    engine.copy(&mut reader, &mut sink, Some(40)).unwrap();

    let samples = samples.lock().unwrap();
    let last = samples.last().unwrap();
    assert!(last.finished);
    assert_eq!(last.copied_blocks, 40);
    assert_eq!(last.error_blocks, 1);
    assert_eq!(last.percent, Some(100));
    assert_eq!(samples.iter().filter(|s| s.finished).count(), 1);

    let positions: Vec<u64> = samples.iter().map(|s| s.copied_blocks).collect();
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
}
