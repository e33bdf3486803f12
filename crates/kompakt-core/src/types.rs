// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: budgets, asset kinds and page sizes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KompaktError, Result};

/// Byte ceiling for an image optimization.
///
/// A zero budget is not an error; it sends the image optimizer straight to
/// its fallback encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetSize(pub u64);

impl TargetSize {
    pub fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Budget expressed in KiB, as the upload form sends it.
    pub fn from_kib(kib: u64) -> Self {
        Self(kib.saturating_mul(1024))
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }

    /// Whether `size` fits under this budget.
    pub fn fits(&self, size: u64) -> bool {
        size <= self.0
    }
}

impl std::fmt::Display for TargetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

/// Named quality tier for document optimization, 1 (smallest) to 100 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct QualityTier(u8);

impl QualityTier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(KompaktError::InvalidBudget(format!(
                "quality tier must be in {}..={}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for QualityTier {
    type Error = KompaktError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<QualityTier> for u8 {
    fn from(tier: QualityTier) -> Self {
        tier.0
    }
}

/// Asset kinds the optimizers accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Pdf,
    Jpeg,
    Png,
    Tiff,
    Webp,
    Bmp,
    Gif,
}

impl AssetKind {
    /// MIME type for response headers.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
        }
    }

    /// Infer the asset kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Infer the asset kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn is_raster(&self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Fail with `UnsupportedDocument` when the extension of `path` names a
    /// kind that `accept` refuses. Unknown or missing extensions pass, and
    /// the decoder has the final say.
    pub fn ensure(path: &Path, accept: impl Fn(Self) -> bool) -> Result<()> {
        match Self::from_path(path) {
            Some(kind) if !accept(kind) => Err(KompaktError::UnsupportedDocument(
                kind.mime_type().to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Page width in inches.
    pub fn width_inches(&self) -> f64 {
        self.dimensions_mm().0 as f64 / 25.4
    }

    /// Pixel width of a raster spanning the full page width at `dpi`.
    pub fn pixel_width_at(&self, dpi: u32) -> u32 {
        (self.width_inches() * dpi as f64).round().max(1.0) as u32
    }
}
