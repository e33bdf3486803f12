// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — combine raster images into a multi-page PDF using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::{Path, PathBuf};

use kompakt_core::PaperSize;
use kompakt_core::error::{KompaktError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::image::{ColorMode, RasterImage};
use crate::workspace::CandidateWorkspace;

/// Margin around every placed image.
const MARGIN_MM: f32 = 15.0;
/// Native resolution assumed for placement. Images are never upscaled.
const PLACEMENT_DPI: f32 = 150.0;
/// Document title written to the PDF metadata.
const TITLE: &str = "Kompakt Images";

/// Builds PDFs with one image per page.
pub struct PdfWriter {
    paper_size: PaperSize,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Create a PDF with one page per decodable image, in input order.
    ///
    /// Inputs that cannot be read or decoded are skipped with a warning. If
    /// none of them decode the result is a `Decode` error.
    #[instrument(skip_all, fields(inputs = paths.len()))]
    pub fn images_to_pdf(&self, paths: &[PathBuf]) -> Result<Vec<u8>> {
        if paths.is_empty() {
            return Err(KompaktError::InvalidInput(
                "no images were given to combine".into(),
            ));
        }

        let (page_w, page_h) = self.page_dimensions();
        let mut doc = PdfDocument::new(TITLE);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(paths.len());

        for path in paths {
            let raster = match RasterImage::open(path) {
                Ok(raster) => raster.with_color_mode(ColorMode::Rgb),
                Err(err) => {
                    warn!(path = %path.display(), %err, "Skipping image");
                    continue;
                }
            };
            let ops = self.place_image(&mut doc, raster);
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if pages.is_empty() {
            return Err(KompaktError::Decode(
                "none of the images could be decoded".into(),
            ));
        }

        info!(
            paper = ?self.paper_size,
            pages = pages.len(),
            skipped = paths.len() - pages.len(),
            "Creating image PDF"
        );
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        Ok(output)
    }

    /// Combine `paths` into a PDF written to `output`.
    pub fn write_images_to_file(&self, paths: &[PathBuf], output: &Path) -> Result<PathBuf> {
        let bytes = self.images_to_pdf(paths)?;
        let workspace = CandidateWorkspace::beside(output)?;
        let written = workspace.stage(&bytes)?.promote(output)?;
        info!("Wrote image PDF to {}", written.display());
        Ok(written)
    }

    /// Register `raster` with the document and return the ops that draw it
    /// centred within the page margins.
    fn place_image(&self, doc: &mut PdfDocument, raster: RasterImage) -> Vec<Op> {
        let (page_w, page_h) = self.page_dimensions();
        let img_width = raster.width() as usize;
        let img_height = raster.height() as usize;

        let raw = RawImage {
            pixels: RawImageData::U8(raster.into_dynamic().into_rgb8().into_raw()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        let usable_w_pt = Mm(page_w.0 - 2.0 * MARGIN_MM).into_pt().0;
        let usable_h_pt = Mm(page_h.0 - 2.0 * MARGIN_MM).into_pt().0;
        let img_w_pt = img_width as f32 / PLACEMENT_DPI * 72.0;
        let img_h_pt = img_height as f32 / PLACEMENT_DPI * 72.0;

        let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt).min(1.0);
        let rendered_w_pt = img_w_pt * scale;
        let rendered_h_pt = img_h_pt * scale;

        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
        let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

        debug!(rendered_w_pt, rendered_h_pt, scale, "Image placed on page");

        vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_offset)),
                translate_y: Some(Pt(y_offset)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(PLACEMENT_DPI),
                rotate: None,
            },
        }]
    }
}

/// Combine images into one PDF on pages of `paper`.
pub fn images_to_pdf(paths: &[PathBuf], paper: PaperSize) -> Result<Vec<u8>> {
    PdfWriter::new(paper).images_to_pdf(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use lopdf::Document;

    fn png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        DynamicImage::ImageRgb8(img)
            .save_with_format(&path, ImageFormat::Png)
            .expect("write png");
        path
    }

    #[test]
    fn one_page_per_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = vec![
            png(dir.path(), "a.png", 120, 80),
            png(dir.path(), "b.png", 3000, 200),
        ];

        let bytes = images_to_pdf(&paths, PaperSize::A4).expect("pdf");
        let doc = Document::load_mem(&bytes).expect("valid pdf");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn undecodable_inputs_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").expect("write");
        let paths = vec![junk, png(dir.path(), "ok.png", 64, 64)];

        let output = dir.path().join("combined.pdf");
        PdfWriter::a4()
            .write_images_to_file(&paths, &output)
            .expect("pdf");
        let doc = Document::load(&output).expect("valid pdf");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn nothing_decodable_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let junk = dir.path().join("junk.jpg");
        std::fs::write(&junk, b"still not an image").expect("write");

        let err = images_to_pdf(&[junk], PaperSize::Letter).unwrap_err();
        assert!(matches!(err, KompaktError::Decode(_)));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = images_to_pdf(&[], PaperSize::A4).unwrap_err();
        assert!(matches!(err, KompaktError::InvalidInput(_)));
    }
}
