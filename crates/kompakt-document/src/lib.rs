// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kompakt-document — Size-constrained re-encoding for uploaded images and PDFs.
//
// Provides the image compression optimizer (scale sweep, quality binary
// search, sharpness ranking), the tier-driven PDF raster re-encoder with
// structural compaction, PDF repair and unlock, and image-to-PDF assembly.

pub mod image;
pub mod pdf;
pub mod workspace;

use std::path::{Path, PathBuf};

use kompakt_core::error::Result;
use kompakt_core::types::{QualityTier, TargetSize};

// Re-export the primary structs so callers can use `kompakt_document::ImageOptimizer` etc.
pub use crate::image::optimizer::{ImageOptimization, ImageOptimizer, SearchStrategy};
pub use crate::image::raster::RasterImage;
pub use crate::pdf::optimizer::{DocumentOptimization, DocumentOptimizer, DocumentOutcome};
pub use crate::pdf::repair::repair_document;
pub use crate::pdf::unlock::unlock_document;
pub use crate::pdf::writer::{PdfWriter, images_to_pdf};

/// Compress an image to at most `target_bytes`, with default settings.
/// Returns the path of `<stem>.compressed.jpg`.
pub fn optimize_image(path: &Path, target_bytes: u64) -> Result<PathBuf> {
    ImageOptimizer::default()
        .optimize(path, TargetSize::from_bytes(target_bytes))
        .map(|result| result.output)
}

/// Compress a PDF at `quality_tier` (1-100), with default settings.
/// Returns the path of `<stem>.compressed.pdf`.
pub fn optimize_document(path: &Path, quality_tier: u8) -> Result<PathBuf> {
    let tier = QualityTier::new(quality_tier)?;
    DocumentOptimizer::default()
        .optimize(path, tier)
        .map(|result| result.output)
}
