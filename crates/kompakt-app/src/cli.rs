// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kompakt_core::PaperSize;

#[derive(Parser, Debug)]
#[command(name = "kompakt")]
#[command(
    author,
    version,
    about = "Shrink images and PDFs to fit upload limits"
)]
pub struct Args {
    /// JSON file overriding the optimizer defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Re-encode an image as the sharpest JPEG under a size budget
    Image {
        input: PathBuf,

        /// Size budget in KiB
        #[arg(short = 't', long)]
        target_kb: u64,

        /// Output path (defaults to <stem>.compressed.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-encode the images inside a PDF at a quality tier
    Pdf {
        input: PathBuf,

        /// Quality tier, 1 (smallest) to 100 (best)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,

        /// Output path (defaults to <stem>.compressed.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine images into one PDF, one image per page
    ImagesToPdf {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,

        /// Page size
        #[arg(short, long, value_enum, default_value = "a4")]
        paper: Paper,
    },

    /// Rebuild a damaged PDF's object table
    Repair {
        input: PathBuf,

        /// Output path (defaults to <stem>.repaired.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save a copy of an encrypted PDF without its password protection
    Unlock {
        input: PathBuf,

        /// Owner or user password
        #[arg(short, long, default_value = "")]
        password: String,

        /// Output path (defaults to <stem>.unlocked.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Paper {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<Paper> for PaperSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A4 => PaperSize::A4,
            Paper::A3 => PaperSize::A3,
            Paper::A5 => PaperSize::A5,
            Paper::Letter => PaperSize::Letter,
            Paper::Legal => PaperSize::Legal,
            Paper::Tabloid => PaperSize::Tabloid,
        }
    }
}

impl Args {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
