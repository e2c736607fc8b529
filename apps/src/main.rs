//! Thin demonstration CLI: decode captured AX.25 frames and print them.
//!
//! Not part of the `ax25aprs` codec surface (spec §6.6 names no CLI for
//! the library itself); this binary exists only so the corpus's
//! workspace convention of a library crate plus a small `apps/`
//! driver has somewhere to live.

use std::io::{BufRead, BufReader, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ax25aprs::frame::{Frame, ModuloSelect};

#[derive(Debug, Parser)]
#[command(name = "ax25aprs", version, about = "Decode captured AX.25 frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read one hex-encoded AX.25 frame per line and print its decoded form.
    Decode {
        /// Input file; reads stdin when omitted.
        #[arg(long)]
        input: Option<std::path::PathBuf>,
        /// Print the full `Debug` form instead of `Display`.
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Decode { input, debug } => decode(input, debug),
    }
}

fn decode(input: Option<std::path::PathBuf>, debug: bool) -> Result<()> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => {
            let mut s = String::new();
            std::fs::File::open(&path)
                .with_context(|| format!("opening {}", path.display()))?
                .read_to_string(&mut s)
                .with_context(|| format!("reading {}", path.display()))?;
            Box::new(std::io::Cursor::new(s.into_bytes()))
        }
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut decoded = 0usize;
    let mut failed = 0usize;
    for line in reader.lines() {
        let line = line.context("reading input line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let hex_str: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = match hex::decode(&hex_str) {
            Ok(b) => b,
            Err(e) => {
                warn!("skipping malformed hex line {trimmed:?}: {e}");
                failed += 1;
                continue;
            }
        };
        match Frame::decode(&bytes, ModuloSelect::Auto) {
            Ok(frame) => {
                if debug {
                    println!("{frame:#?}");
                } else {
                    println!("{frame}");
                }
                decoded += 1;
            }
            Err(e) => {
                warn!("skipping undecodable frame {hex_str:?}: {e}");
                failed += 1;
            }
        }
    }
    info!(decoded, failed, "done");
    Ok(())
}
