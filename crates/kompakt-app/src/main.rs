// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kompakt — size-budgeted image and PDF compression
//
// Entry point. Initialises logging, loads the optimizer configuration, and
// dispatches one subcommand.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use kompakt_core::error::Result;
use kompakt_core::human_errors::humanize_error;
use kompakt_core::{OptimizerConfig, QualityTier, TargetSize};
use kompakt_document::pdf::repair::repair_document_to;
use kompakt_document::pdf::unlock::unlock_document_to;
use kompakt_document::workspace::sibling_output;
use kompakt_document::{
    DocumentOptimizer, ImageOptimizer, PdfWriter, repair_document, unlock_document,
};

use cli::{Args, Command};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter())),
        )
        .init();

    tracing::debug!("Kompakt starting");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => OptimizerConfig::from_file(path)?,
        None => OptimizerConfig::default(),
    };

    match args.command {
        Command::Image {
            input,
            target_kb,
            output,
        } => {
            let output = output.unwrap_or_else(|| sibling_output(&input, "compressed", "jpg"));
            let result = ImageOptimizer::new(config.image).optimize_to(
                &input,
                TargetSize::from_kib(target_kb),
                &output,
            )?;
            println!(
                "{} ({}x{}, q{}, {} bytes, {:?}{})",
                result.output.display(),
                result.winner.width,
                result.winner.height,
                result.winner.quality,
                result.winner.size,
                result.strategy,
                if result.within_budget() { "" } else { ", over budget" },
            );
        }

        Command::Pdf {
            input,
            quality,
            output,
        } => {
            let output = output.unwrap_or_else(|| sibling_output(&input, "compressed", "pdf"));
            let tier = QualityTier::new(quality)?;
            let optimizer = DocumentOptimizer::new(config.document);
            let result = optimizer.optimize_to(&input, tier, &output)?;
            println!(
                "{} ({} -> {} bytes, {} images replaced, {} kept, {} skipped, {:?})",
                result.output.display(),
                result.source_size,
                result.output_size,
                result.reencode.replaced(),
                result.reencode.retained(),
                result.reencode.skipped(),
                result.outcome,
            );
        }

        Command::ImagesToPdf {
            inputs,
            output,
            paper,
        } => {
            let written = PdfWriter::new(paper.into()).write_images_to_file(&inputs, &output)?;
            println!("{}", written.display());
        }

        Command::Repair { input, output } => {
            let written = match output {
                Some(output) => repair_document_to(&input, &output)?,
                None => repair_document(&input)?,
            };
            println!("{}", written.display());
        }

        Command::Unlock {
            input,
            password,
            output,
        } => {
            let written = match output {
                Some(output) => unlock_document_to(&input, &password, &output)?,
                None => unlock_document(&input, &password)?,
            };
            println!("{}", written.display());
        }
    }

    Ok(())
}
