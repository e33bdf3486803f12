// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compression policy — maps a quality tier onto raster re-encoding settings.

use kompakt_core::types::{PaperSize, QualityTier};
use serde::{Deserialize, Serialize};

/// Settings applied to every embedded raster of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionPolicy {
    /// Resolution ceiling relative to the reference page width.
    pub max_dpi: u32,
    pub jpeg_quality: u8,
    /// Convert colour rasters to gray. Sources that are already gray stay
    /// gray in every band.
    pub force_grayscale: bool,
}

impl CompressionPolicy {
    /// Policy for a tier. Bands: 1-30, 31-60, 61-85, 86-100.
    pub fn for_tier(tier: QualityTier) -> Self {
        let (max_dpi, jpeg_quality, force_grayscale) = match tier.value() {
            0..=30 => (72, 15, true),
            31..=60 => (120, 40, false),
            61..=85 => (150, 70, false),
            _ => (200, 85, false),
        };
        Self {
            max_dpi,
            jpeg_quality,
            force_grayscale,
        }
    }

    /// Widest raster allowed on a page of the given size.
    pub fn max_pixel_width(&self, paper: PaperSize) -> u32 {
        paper.pixel_width_at(self.max_dpi)
    }
}
