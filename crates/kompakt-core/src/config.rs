// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optimizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KompaktError, Result};
use crate::types::PaperSize;

/// Settings for both optimizers. Every field has a default, so a partial JSON
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub image: ImageSearchConfig,
    pub document: DocumentConfig,
}

/// Search space of the image compression optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSearchConfig {
    /// Downscale factors, tried in order. Must be descending within (0, 1].
    pub scales: Vec<f32>,
    /// Scales producing a narrower image are skipped (legibility floor).
    pub min_width: u32,
    /// Budgets at or below this many bytes lift the width floor.
    pub small_budget_bytes: u64,
    /// Lowest JPEG quality the search may accept.
    pub min_quality: u8,
    /// Highest JPEG quality the search tries.
    pub max_quality: u8,
    /// Quality of the single re-encode when the source already fits.
    pub fast_path_quality: u8,
    /// Width of the last-resort encoding.
    pub fallback_width: u32,
    /// Quality of the last-resort encoding.
    pub fallback_quality: u8,
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            scales: vec![1.0, 0.8, 0.6, 0.4, 0.25, 0.15],
            min_width: 300,
            small_budget_bytes: 10 * 1024,
            min_quality: 65,
            max_quality: 95,
            fast_path_quality: 95,
            fallback_width: 200,
            fallback_quality: 50,
        }
    }
}

/// Behaviour of the PDF raster re-encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Page size whose width turns a DPI cap into a pixel-width cap.
    pub reference_paper: PaperSize,
    /// Re-encode embedded images on a rayon worker pool.
    pub parallel: bool,
    /// Remove /Info, XMP metadata, page thumbnails and /PieceInfo.
    pub strip_metadata: bool,
    /// Merge byte-identical embedded font programs.
    pub dedupe_fonts: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            reference_paper: PaperSize::A4,
            parallel: true,
            strip_metadata: true,
            dedupe_fonts: true,
        }
    }
}

impl OptimizerConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the optimizers cannot honour.
    pub fn validate(&self) -> Result<()> {
        let image = &self.image;

        if image.scales.is_empty() {
            return Err(invalid("image.scales must not be empty"));
        }
        if image.scales.iter().any(|s| !(*s > 0.0 && *s <= 1.0)) {
            return Err(invalid("image.scales must lie within (0, 1]"));
        }
        if image.scales.windows(2).any(|pair| pair[1] >= pair[0]) {
            return Err(invalid("image.scales must be strictly descending"));
        }
        if image.min_quality == 0 || image.max_quality > 100 {
            return Err(invalid("JPEG qualities must lie within 1..=100"));
        }
        if image.min_quality > image.max_quality {
            return Err(invalid("image.min_quality exceeds image.max_quality"));
        }
        if !(1..=100).contains(&image.fast_path_quality)
            || !(1..=100).contains(&image.fallback_quality)
        {
            return Err(invalid("JPEG qualities must lie within 1..=100"));
        }
        if image.fallback_width == 0 {
            return Err(invalid("image.fallback_width must be positive"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> KompaktError {
    KompaktError::InvalidInput(format!("configuration: {message}"))
}
