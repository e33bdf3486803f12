// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster codec — decode, resample, colour conversion and JPEG encoding on
// in-memory images using the `image` crate.

use std::path::Path;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use kompakt_core::error::{KompaktError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Colour model of an encoded output. JPEG has no alpha channel, so both
/// modes drop transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    Grayscale,
    Rgb,
}

impl ColorMode {
    /// PDF colour space name matching this mode.
    pub fn pdf_color_space(&self) -> &'static [u8] {
        match self {
            Self::Grayscale => b"DeviceGray",
            Self::Rgb => b"DeviceRGB",
        }
    }
}

/// A decoded raster image.
///
/// Transformations borrow `self` and return a fresh `RasterImage`, so every
/// candidate encoding can be derived from the same original decode.
///
/// ```ignore
/// let original = RasterImage::open("photo.png")?;
/// let jpeg = original
///     .resize_exact(800, 600)
///     .with_color_mode(ColorMode::Rgb)
///     .to_jpeg_bytes(80)?;
/// ```
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Read and decode an image file. The format is sniffed from the file
    /// contents, not the extension, since uploads arrive under temporary names.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data).map_err(|err| match err {
            KompaktError::Decode(detail) => KompaktError::Decode(format!(
                "{}: {}",
                path.as_ref().display(),
                detail
            )),
            other => other,
        })
    }

    /// Decode raw encoded bytes (JPEG, PNG, TIFF, WebP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| KompaktError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Colour mode the decoded pixels already carry: gray for single-channel
    /// sources (with or without alpha), RGB for everything else.
    pub fn color_mode(&self) -> ColorMode {
        if self.image.color().has_color() {
            ColorMode::Rgb
        } else {
            ColorMode::Grayscale
        }
    }

    /// Borrow the decoded pixels.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Take ownership of the decoded pixels.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resample to exactly `width` x `height` with Lanczos3.
    pub fn resize_exact(&self, width: u32, height: u32) -> Self {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        let resized = self
            .image
            .resize_exact(width.max(1), height.max(1), FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Dimensions after scaling both axes by `factor` (truncating, at least 1px).
    pub fn scaled_dimensions(&self, factor: f32) -> (u32, u32) {
        let width = (self.width() as f64 * factor as f64).floor().max(1.0) as u32;
        let height = (self.height() as f64 * factor as f64).floor().max(1.0) as u32;
        (width, height)
    }

    /// Height that keeps the aspect ratio at the given width.
    pub fn height_for_width(&self, width: u32) -> u32 {
        let ratio = self.height() as f64 / self.width().max(1) as f64;
        (width as f64 * ratio).round().max(1.0) as u32
    }

    /// Shrink proportionally so the width is at most `max_width`. Never upscales.
    pub fn fit_width(&self, max_width: u32) -> Self {
        if self.width() <= max_width {
            return self.clone();
        }
        let height = self.height_for_width(max_width);
        debug!(
            from_w = self.width(),
            from_h = self.height(),
            to_w = max_width,
            to_h = height,
            "Downscaling to width cap"
        );
        self.resize_exact(max_width, height)
    }

    /// Convert to the given colour mode, dropping any alpha channel.
    pub fn with_color_mode(self, mode: ColorMode) -> Self {
        let image = match (mode, self.image) {
            (ColorMode::Grayscale, image @ DynamicImage::ImageLuma8(_)) => image,
            (ColorMode::Grayscale, image) => DynamicImage::ImageLuma8(image.to_luma8()),
            (ColorMode::Rgb, image @ DynamicImage::ImageRgb8(_)) => image,
            (ColorMode::Rgb, image) => DynamicImage::ImageRgb8(image.to_rgb8()),
        };
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as baseline JPEG at `quality` (1-100). Single-channel images are
    /// written as grayscale JPEG, everything else as RGB.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        let written = match &self.image {
            DynamicImage::ImageLuma8(gray) => gray.write_with_encoder(encoder),
            other => other.to_rgb8().write_with_encoder(encoder),
        };
        written.map_err(|err| KompaktError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}
