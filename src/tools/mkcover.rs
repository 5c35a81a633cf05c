//! mkcover - Cover art converter for the launcher
//!
//! Converts cover images between PNG and the RAW565 container the launcher
//! reads natively, and reports what the launcher would make of a file.
//!
//! # Usage
//! ```text
//! mkcover info <image>
//! mkcover to-png <input> <output.png>
//! mkcover to-raw <input> <output.art>
//! ```
//!
//! Inputs may be PNG or RAW565. `RUST_LOG` controls logging (default `info`,
//! `--verbose` switches the default to `debug`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use launcher::hal::{FileSystem, StdFileSystem};
use launcher::image::{Image, MAX_FILE_SIZE, decode, encode_raw565, save_png};
use launcher::render::{COVER_MAX_HEIGHT, COVER_MAX_WIDTH};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mkcover", version, about = "Convert cover art between PNG and RAW565")]
struct Cli {
    /// Debug logging unless RUST_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print format, dimensions and size of an image
    Info {
        input: PathBuf,
    },
    /// Convert an image to PNG
    ToPng {
        input: PathBuf,
        output: PathBuf,
    },
    /// Convert an image to RAW565 (.art)
    ToRaw {
        input: PathBuf,
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Info { input } => cmd_info(&input),
        Command::ToPng { input, output } => cmd_to_png(&input, &output),
        Command::ToRaw { input, output } => cmd_to_raw(&input, &output),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_info(input: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let img = load(input, &data)?;

    println!("File:       {}", input.display());
    println!("Format:     {}", format_name(&data));
    println!("Dimensions: {}x{}", img.width(), img.height());
    println!("File size:  {} bytes", data.len());
    println!("Pixel data: {} bytes", img.byte_len());

    if data.len() > MAX_FILE_SIZE {
        warn!(
            "File is larger than the {} bytes the launcher reads; it will not load on device",
            MAX_FILE_SIZE
        );
    }
    if img.width() > COVER_MAX_WIDTH || img.height() > COVER_MAX_HEIGHT {
        warn!(
            "Image exceeds the {}x{} preview box and will be cropped",
            COVER_MAX_WIDTH, COVER_MAX_HEIGHT
        );
    }
    Ok(())
}

fn cmd_to_png(input: &Path, output: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let img = load(input, &data)?;

    save_png(&StdFileSystem, path_str(output)?, &img)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} ({}x{})", output.display(), img.width(), img.height());
    Ok(())
}

fn cmd_to_raw(input: &Path, output: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let img = load(input, &data)?;

    let raw = encode_raw565(&img).context("Image too large for RAW565")?;
    StdFileSystem
        .write(path_str(output)?, &raw)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {} ({}x{}, {} bytes)",
        output.display(),
        img.width(),
        img.height(),
        raw.len()
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn load(input: &Path, data: &[u8]) -> Result<Image> {
    decode(data).with_context(|| format!("Failed to decode {}", input.display()))
}

fn format_name(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG") {
        "PNG"
    } else {
        "RAW565"
    }
}

fn path_str(path: &Path) -> Result<&str> {
    match path.to_str() {
        Some(path) => Ok(path),
        None => bail!("Path is not valid UTF-8: {}", path.display()),
    }
}
