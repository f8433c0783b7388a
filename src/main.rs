//! c196dis command-line front end
//!
//! Loads the two firmware segments, runs one strategy and writes the report.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use c196dis::config::CrawlConfig;
use c196dis::format::OutputFormat;
use c196dis::image::RawImage;
use c196dis::session::Session;
use c196dis::strategy::Strategy;

/// Static control-flow disassembler for 8xC196 ECU firmware.
#[derive(Parser, Debug)]
#[command(name = "c196dis")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pre-calibration segment (mapped from 0x000000)
    #[arg(long)]
    pre: PathBuf,

    /// Calibration segment (mapped after the pre-calibration slot)
    #[arg(long)]
    cal: PathBuf,

    /// JSON crawl configuration; missing fields take the 8XC196EA defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disassembly strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Crawl)]
    strategy: Strategy,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed the address after each path end once all other seeds are exhausted
    #[arg(long)]
    fallback_seeding: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("c196dis=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => CrawlConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CrawlConfig::default(),
    };
    if args.fallback_seeding {
        config.fallback_seeding = true;
    }

    let image = RawImage::from_files(&args.pre, &args.cal).with_context(|| {
        format!("Failed to load image from {} and {}", args.pre.display(), args.cal.display())
    })?;
    let session = Session::new(image, config).context("Failed to set up the disassembly session")?;

    let disassembly = session
        .run(args.strategy)
        .with_context(|| format!("{} failed", args.strategy))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            session
                .write_report(&disassembly, args.format, BufWriter::new(file))
                .with_context(|| format!("Failed to write {} report", args.format))?;
        }
        None => session
            .write_report(&disassembly, args.format, io::stdout().lock())
            .with_context(|| format!("Failed to write {} report", args.format))?,
    }

    Ok(())
}
