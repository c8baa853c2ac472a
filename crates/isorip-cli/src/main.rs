//! isorip - Fault-tolerant optical disc imaging
//!
//! # Usage
//!
//! ```bash
//! # Copy a DVD to an ISO image
//! isorip copy /dev/sr0 movie.iso
//!
//! # Use smaller reads on a badly scratched disc
//! isorip copy /dev/sr0 movie.iso --chunk-blocks 32
//!
//! # Show the effective configuration
//! isorip config
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use console::style;
use isorip_core::Settings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod progress;

/// isorip - Copy optical discs to ISO images, zero-filling unreadable sectors
#[derive(Parser)]
#[command(name = "isorip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this settings file instead of the default location
    #[arg(long, global = true, env = "ISORIP_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a disc (or any block source) to an image file
    Copy {
        /// Source drive or image (e.g., /dev/sr0, /dev/disk2, disc.img)
        source: String,

        /// Output image file; must not already exist
        output: PathBuf,

        /// Blocks (2 KiB sectors) requested per read
        #[arg(short, long, value_name = "BLOCKS", value_parser = commands::copy::parse_chunk_blocks)]
        chunk_blocks: Option<usize>,

        /// Read sectors as stored, without decryption
        #[arg(long)]
        no_decrypt: bool,

        /// Do not flush the image after every write
        #[arg(long)]
        no_flush: bool,
    },

    /// Show or initialize the configuration file
    Config {
        /// Create a configuration file with default values
        #[arg(long)]
        init: bool,

        /// Print the path to the configuration file
        #[arg(long)]
        path: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Set up panic handler for nicer error messages
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("{} {}", style("Error:").red().bold(), panic_info);
    }));

    if let Err(e) = run() {
        eprintln!("{} {}", style("Error:").red().bold(), e);

        // Show cause chain when backtraces are requested
        if std::env::var("RUST_BACKTRACE").is_ok() {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  {} {}", style("Caused by:").yellow(), cause);
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Settings::config_path);
    let settings = Settings::load_from_path(config_path.clone());
    let quiet = cli.quiet || settings.behavior.quiet;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Copy {
            source,
            output,
            chunk_blocks,
            no_decrypt,
            no_flush,
        } => {
            commands::copy::execute(commands::copy::CopyArgs {
                source,
                output,
                chunk_blocks,
                no_decrypt,
                no_flush,
                quiet,
                settings,
            })
        }
        Commands::Config { init, path, json } => {
            commands::config::execute(commands::config::ConfigArgs {
                init,
                path,
                json,
                quiet: cli.quiet,
                config_file: config_path,
            })
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
