//! Copy command - images a disc into a new file
//!
//! Opens the source read-only through the platform layer, creates the output
//! exclusively and runs the copy engine with a single status line. Unreadable
//! sectors are zero-filled and counted; any other failure aborts and leaves the
//! partial image in place.

use anyhow::{bail, Result};
use chrono::Local;
use console::style;
use isorip_core::{
    CopyConfig, CopyEngine, FileSink, Settings, StreamReader, MAX_CHUNK_BLOCKS, MIN_CHUNK_BLOCKS,
};
use isorip_platform::open_source;
use std::path::PathBuf;

use crate::progress::{banner_line, create_copy_progress_bar, progress_line, summary_line};

/// Arguments for the copy command
pub struct CopyArgs {
    pub source: String,
    pub output: PathBuf,
    pub chunk_blocks: Option<usize>,
    pub no_decrypt: bool,
    pub no_flush: bool,
    pub quiet: bool,
    pub settings: Settings,
}

/// Execute the copy command
pub fn execute(args: CopyArgs) -> Result<()> {
    let config = build_config(&args);
    let quiet = args.quiet;

    let device = match open_source(&args.source) {
        Ok(device) => device,
        Err(e) => bail!("Failed to open source {}: {}", args.source, e),
    };
    let total_blocks = device.block_count();

    tracing::debug!(
        "Opened source: {} ({} bytes, sector size {})",
        device.info().path,
        device.size(),
        device.info().sector_size
    );

    let mut sink = FileSink::create(&args.output)?;
    let mut reader = StreamReader::new(device);

    if !quiet {
        println!("{}", banner_line(total_blocks, Local::now()));
    }

    let pb = create_copy_progress_bar(quiet);
    let pb_clone = pb.clone();
    let mut engine = CopyEngine::with_config(config).on_progress(move |progress| {
        pb_clone.set_message(progress_line(progress));
    });

    let result = engine.copy(&mut reader, &mut sink, total_blocks);

    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            if !quiet {
                println!("{} {}", style("✓").green(), summary_line(&summary));
            }
            Ok(())
        }
        Err(e) => bail!("Copy to {} failed: {}", sink.path().display(), e),
    }
}

/// Combine settings with command-line overrides
fn build_config(args: &CopyArgs) -> CopyConfig {
    let mut config = args.settings.copy.to_config();

    if let Some(blocks) = args.chunk_blocks {
        config = config.chunk_blocks(blocks);
    }
    if args.no_decrypt {
        config = config.decrypt(false);
    }
    if args.no_flush {
        config = config.flush_each_write(false);
    }

    config
}

/// Parse a chunk size in blocks
pub fn parse_chunk_blocks(s: &str) -> std::result::Result<usize, String> {
    let blocks: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid chunk size: {}", s))?;

    if !(MIN_CHUNK_BLOCKS..=MAX_CHUNK_BLOCKS).contains(&blocks) {
        return Err(format!(
            "Chunk size must be between {} and {} blocks",
            MIN_CHUNK_BLOCKS, MAX_CHUNK_BLOCKS
        ));
    }

    Ok(blocks)
}
