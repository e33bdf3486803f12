// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sharpness scorer — variance of the Laplacian edge response.
//
// Only meaningful as a ranking between encodings of the same source. Noise
// scores as "detail", so this is not an absolute quality threshold.

use image::{DynamicImage, GrayImage};
use imageproc::filter::laplacian_filter;
use kompakt_core::error::Result;

use super::raster::RasterImage;

/// Score encoded image bytes. Higher means more edge detail survived.
pub fn score(image_bytes: &[u8]) -> Result<f64> {
    let raster = RasterImage::from_bytes(image_bytes)?;
    Ok(score_image(raster.as_dynamic()))
}

/// Score an already-decoded image.
pub fn score_image(image: &DynamicImage) -> f64 {
    score_gray(&image.to_luma8())
}

/// Population variance of the 4-neighbour Laplacian over a grayscale image.
pub fn score_gray(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let response = laplacian_filter(gray);
    let samples = response.as_raw();
    let count = samples.len() as f64;

    let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / count;
    let variance = samples
        .iter()
        .map(|&v| {
            let delta = v as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / count;

    variance.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::filter::gaussian_blur_f32;

    fn stripes(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if (x / 4) % 2 == 0 { Luma([20]) } else { Luma([235]) }
        })
    }

    #[test]
    fn flat_image_scores_zero() {
        let flat = GrayImage::from_pixel(40, 40, Luma([128]));
        assert_eq!(score_gray(&flat), 0.0);
    }

    #[test]
    fn blur_lowers_the_score() {
        let sharp = stripes(64, 64);
        let blurred = gaussian_blur_f32(&sharp, 2.0);
        assert!(score_gray(&sharp) > score_gray(&blurred));
    }

    #[test]
    fn score_decodes_bytes() {
        let img = DynamicImage::ImageLuma8(stripes(32, 32));
        let jpeg = RasterImage::from_dynamic(img).to_jpeg_bytes(90).expect("encode");
        assert!(score(&jpeg).expect("score") > 0.0);
    }

    #[test]
    fn score_rejects_garbage() {
        assert!(score(b"\x00\x01\x02").is_err());
    }
}
