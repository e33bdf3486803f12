// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster re-encoder — rewrite every embedded image XObject as JPEG under a
// compression policy.
//
// Planning and applying touch the document and run on the calling thread.
// The decode/resize/encode step in between only sees owned copies of the
// streams, so it can fan out over rayon. Results are applied in object-id
// order, which keeps the output byte-for-byte reproducible.

use std::collections::HashSet;

use image::{DynamicImage, GrayImage, RgbImage};
use kompakt_core::error::{KompaktError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::policy::CompressionPolicy;
use crate::image::{ColorMode, RasterImage};

/// What happened to one image object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// The JPEG was strictly smaller and now backs the object.
    Replaced { before: usize, after: usize },
    /// The JPEG was not smaller; the stored stream was kept.
    Retained { stored: usize, candidate: usize },
    /// The object was left untouched.
    Skipped { reason: String },
}

/// Per-object outcomes of one re-encoding pass, in object-id order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReencodeReport {
    pub objects: Vec<(ObjectId, ObjectOutcome)>,
}

impl ReencodeReport {
    pub fn replaced(&self) -> usize {
        self.count(|outcome| matches!(outcome, ObjectOutcome::Replaced { .. }))
    }

    pub fn retained(&self) -> usize {
        self.count(|outcome| matches!(outcome, ObjectOutcome::Retained { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, ObjectOutcome::Skipped { .. }))
    }

    /// Stream bytes removed by replacements.
    pub fn bytes_saved(&self) -> u64 {
        self.objects
            .iter()
            .map(|(_, outcome)| match outcome {
                ObjectOutcome::Replaced { before, after } => before.saturating_sub(*after) as u64,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome(&self, id: ObjectId) -> Option<&ObjectOutcome> {
        self.objects
            .iter()
            .find(|(object, _)| *object == id)
            .map(|(_, outcome)| outcome)
    }

    fn count(&self, predicate: impl Fn(&ObjectOutcome) -> bool) -> usize {
        self.objects.iter().filter(|(_, outcome)| predicate(outcome)).count()
    }
}

/// How the stored stream bytes turn into pixels.
#[derive(Debug, Clone, Copy)]
enum PixelSource {
    /// DCTDecode: hand the stream to the JPEG decoder.
    Jpeg,
    /// Flate/LZW/unfiltered samples, 8 bits per component.
    Samples {
        width: u32,
        height: u32,
        components: u8,
    },
}

/// An image lifted out of the document for re-encoding.
struct ImageJob {
    id: ObjectId,
    stream: Stream,
    source: PixelSource,
}

enum Planned {
    Job(ImageJob),
    Skip(ObjectId, String),
}

/// Result of re-encoding one job.
struct EncodedImage {
    width: u32,
    height: u32,
    color_mode: ColorMode,
    bytes: Vec<u8>,
}

/// Applies one [`CompressionPolicy`] to every raster in a document.
pub struct ImageReencoder {
    policy: CompressionPolicy,
    max_width: u32,
    parallel: bool,
}

impl ImageReencoder {
    pub fn new(policy: CompressionPolicy, max_width: u32, parallel: bool) -> Self {
        Self {
            policy,
            max_width,
            parallel,
        }
    }

    /// Re-encode every eligible image XObject in `doc` in place.
    ///
    /// Never fails as a whole: a broken object is recorded as skipped and
    /// the pass moves on.
    #[instrument(skip_all, fields(quality = self.policy.jpeg_quality, max_width = self.max_width))]
    pub fn run(&self, doc: &mut Document) -> ReencodeReport {
        let planned = plan(doc);

        let mut skips = Vec::new();
        let mut jobs = Vec::new();
        for entry in planned {
            match entry {
                Planned::Job(job) => jobs.push(job),
                Planned::Skip(id, reason) => skips.push((id, ObjectOutcome::Skipped { reason })),
            }
        }

        debug!(jobs = jobs.len(), skipped = skips.len(), "Image objects planned");

        let encoded: Vec<Result<EncodedImage>> = if self.parallel {
            jobs.par_iter().map(|job| self.encode(job)).collect()
        } else {
            jobs.iter().map(|job| self.encode(job)).collect()
        };

        let mut report = ReencodeReport { objects: skips };
        for (job, result) in jobs.iter().zip(encoded) {
            let stored = job.stream.content.len();
            let outcome = match result {
                Ok(image) if stored == 0 || image.bytes.len() < stored => {
                    let after = image.bytes.len();
                    if replace(doc, job.id, image) {
                        ObjectOutcome::Replaced {
                            before: stored,
                            after,
                        }
                    } else {
                        ObjectOutcome::Skipped {
                            reason: "object disappeared during re-encoding".into(),
                        }
                    }
                }
                Ok(image) => ObjectOutcome::Retained {
                    stored,
                    candidate: image.bytes.len(),
                },
                Err(err) => {
                    warn!(%err, "Image left unchanged");
                    ObjectOutcome::Skipped {
                        reason: err.to_string(),
                    }
                }
            };
            report.objects.push((job.id, outcome));
        }
        report.objects.sort_by_key(|(id, _)| *id);

        info!(
            replaced = report.replaced(),
            retained = report.retained(),
            skipped = report.skipped(),
            bytes_saved = report.bytes_saved(),
            "Image re-encoding finished"
        );
        report
    }

    /// Decode, cap the width, convert and JPEG-encode one image.
    fn encode(&self, job: &ImageJob) -> Result<EncodedImage> {
        let failure = |reason: String| KompaktError::ObjectProcessing {
            object: job.id,
            reason,
        };

        let raster = decode(&job.stream, job.source).map_err(failure)?;
        let color_mode = if self.policy.force_grayscale {
            ColorMode::Grayscale
        } else {
            raster.color_mode()
        };
        let resized = raster.fit_width(self.max_width).with_color_mode(color_mode);
        let bytes = resized
            .to_jpeg_bytes(self.policy.jpeg_quality)
            .map_err(|err| failure(err.to_string()))?;

        Ok(EncodedImage {
            width: resized.width(),
            height: resized.height(),
            color_mode,
            bytes,
        })
    }
}

// -- Planning -----------------------------------------------------------------

/// Walk the object table and decide, per image XObject, whether it can be
/// re-encoded.
fn plan(doc: &Document) -> Vec<Planned> {
    let masks = mask_targets(doc);

    doc.objects
        .iter()
        .filter_map(|(&id, object)| match object {
            Object::Stream(stream) if is_image(&stream.dict) => Some((id, stream)),
            _ => None,
        })
        .map(|(id, stream)| {
            if masks.contains(&id) {
                return Planned::Skip(id, "soft or stencil mask of another image".into());
            }
            match classify(doc, &stream.dict) {
                Ok(source) => Planned::Job(ImageJob {
                    id,
                    stream: stream.clone(),
                    source,
                }),
                Err(reason) => {
                    debug!(object = ?id, %reason, "Image not eligible");
                    Planned::Skip(id, reason)
                }
            }
        })
        .collect()
}

fn is_image(dict: &Dictionary) -> bool {
    name(dict, b"Subtype") == Some(b"Image".as_slice())
}

/// Objects referenced as /SMask or /Mask by some image. They must stay
/// single-channel, so they are never rewritten.
fn mask_targets(doc: &Document) -> HashSet<ObjectId> {
    doc.objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) if is_image(&stream.dict) => Some(&stream.dict),
            _ => None,
        })
        .flat_map(|dict| {
            [b"SMask".as_slice(), b"Mask".as_slice()]
                .into_iter()
                .filter_map(move |key| match dict.get(key) {
                    Ok(Object::Reference(target)) => Some(*target),
                    _ => None,
                })
        })
        .collect()
}

fn classify(doc: &Document, dict: &Dictionary) -> std::result::Result<PixelSource, String> {
    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Err("stencil mask".into());
    }
    if dict.has(b"Decode") {
        return Err("custom /Decode array".into());
    }
    if matches!(dict.get(b"Mask"), Ok(Object::Array(_))) {
        return Err("colour-key mask".into());
    }

    let filters = filters(dict);
    match filters.as_slice() {
        [b"DCTDecode"] => Ok(PixelSource::Jpeg),
        chain
            if chain
                .iter()
                .all(|filter| matches!(*filter, b"FlateDecode" | b"LZWDecode")) =>
        {
            let bits = integer(dict, b"BitsPerComponent").unwrap_or(0);
            if bits != 8 {
                return Err(format!("{bits} bits per component"));
            }
            let width = positive(dict, b"Width")?;
            let height = positive(dict, b"Height")?;
            let color_space = dict
                .get(b"ColorSpace")
                .map_err(|_| "missing /ColorSpace".to_string())?;
            let components = components(doc, color_space)?;
            Ok(PixelSource::Samples {
                width,
                height,
                components,
            })
        }
        chain => Err(format!(
            "unsupported filter chain [{}]",
            chain
                .iter()
                .map(|filter| String::from_utf8_lossy(filter).into_owned())
                .collect::<Vec<_>>()
                .join(" ")
        )),
    }
}

/// Number of colour components of an image colour space.
fn components(doc: &Document, color_space: &Object) -> std::result::Result<u8, String> {
    match resolve(doc, color_space) {
        Some(Object::Name(family)) => match family.as_slice() {
            b"DeviceGray" | b"G" | b"CalGray" => Ok(1),
            b"DeviceRGB" | b"RGB" | b"CalRGB" => Ok(3),
            b"DeviceCMYK" | b"CMYK" => Ok(4),
            other => Err(format!("colour space {}", String::from_utf8_lossy(other))),
        },
        Some(Object::Array(items)) => match items.first() {
            Some(Object::Name(family)) if family == b"ICCBased" => {
                let profile = items.get(1).and_then(|entry| resolve(doc, entry));
                match profile {
                    Some(Object::Stream(profile)) => match integer(&profile.dict, b"N") {
                        Some(n @ (1 | 3 | 4)) => Ok(n as u8),
                        other => Err(format!("ICC profile with /N {other:?}")),
                    },
                    _ => Err("ICCBased without a profile stream".into()),
                }
            }
            Some(Object::Name(family)) if family == b"CalGray" => Ok(1),
            Some(Object::Name(family)) if family == b"CalRGB" => Ok(3),
            Some(Object::Name(family)) => {
                Err(format!("colour space {}", String::from_utf8_lossy(family)))
            }
            _ => Err("malformed colour space array".into()),
        },
        _ => Err("unresolvable colour space".into()),
    }
}

// -- Decoding -----------------------------------------------------------------

fn decode(stream: &Stream, source: PixelSource) -> std::result::Result<RasterImage, String> {
    match source {
        PixelSource::Jpeg => {
            RasterImage::from_bytes(&stream.content).map_err(|err| err.to_string())
        }
        PixelSource::Samples {
            width,
            height,
            components,
        } => {
            let samples = if filters(&stream.dict).is_empty() {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .map_err(|err| format!("stream decompression failed: {err}"))?
            };
            from_samples(samples, width, height, components).map(RasterImage::from_dynamic)
        }
    }
}

/// Build an image from packed 8-bit samples. CMYK is converted to RGB.
fn from_samples(
    mut samples: Vec<u8>,
    width: u32,
    height: u32,
    components: u8,
) -> std::result::Result<DynamicImage, String> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(components as usize))
        .ok_or_else(|| "image dimensions overflow".to_string())?;
    if samples.len() < expected {
        return Err(format!(
            "truncated pixel data: {} bytes, expected {expected}",
            samples.len()
        ));
    }
    samples.truncate(expected);

    let image = match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).map(DynamicImage::ImageRgb8),
        other => return Err(format!("{other} colour components")),
    };
    image.ok_or_else(|| "pixel buffer does not match dimensions".to_string())
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    samples
        .chunks_exact(4)
        .flat_map(|cmyk| {
            let k = 255 - cmyk[3] as u32;
            let channel = |ink: u8| ((255 - ink as u32) * k / 255) as u8;
            [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
        })
        .collect()
}

// -- Applying -----------------------------------------------------------------

/// Swap the encoded JPEG into the object. Returns false if the object is no
/// longer a stream.
fn replace(doc: &mut Document, id: ObjectId, image: EncodedImage) -> bool {
    let Ok(Object::Stream(stream)) = doc.get_object_mut(id) else {
        return false;
    };
    let dict = &mut stream.dict;
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    dict.set("Width", Object::Integer(image.width as i64));
    dict.set("Height", Object::Integer(image.height as i64));
    dict.set(
        "ColorSpace",
        Object::Name(image.color_mode.pdf_color_space().to_vec()),
    );
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.remove(b"DecodeParms");
    dict.remove(b"Decode");
    stream.set_content(image.bytes);
    stream.allows_compression = false;
    true
}

// -- Dictionary helpers -------------------------------------------------------

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn filters(dict: &Dictionary) -> Vec<&[u8]> {
    match dict.get(b"Filter") {
        Ok(Object::Name(filter)) => vec![filter.as_slice()],
        Ok(Object::Array(chain)) => chain
            .iter()
            .filter_map(|filter| match filter {
                Object::Name(filter) => Some(filter.as_slice()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn name<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match dict.get(key) {
        Ok(Object::Name(value)) => Some(value.as_slice()),
        _ => None,
    }
}

fn integer(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match dict.get(key) {
        Ok(Object::Integer(value)) => Some(*value),
        _ => None,
    }
}

fn positive(dict: &Dictionary, key: &[u8]) -> std::result::Result<u32, String> {
    match integer(dict, key) {
        Some(value) if value > 0 && value <= u32::MAX as i64 => Ok(value as u32),
        other => Err(format!(
            "invalid /{} {:?}",
            String::from_utf8_lossy(key),
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{self, FixtureImage};
    use kompakt_core::types::{PaperSize, QualityTier};
    use lopdf::dictionary;

    fn reencoder(tier: u8) -> ImageReencoder {
        let policy = CompressionPolicy::for_tier(QualityTier::new(tier).expect("tier"));
        ImageReencoder::new(policy, policy.max_pixel_width(PaperSize::A4), true)
    }

    #[test]
    fn low_tier_rewrites_noise_as_capped_grayscale_jpeg() {
        let mut doc = fixtures::document(vec![
            Some(FixtureImage::Noise {
                width: 700,
                height: 120,
            }),
            Some(FixtureImage::Noise {
                width: 300,
                height: 200,
            }),
        ]);

        let report = reencoder(20).run(&mut doc);
        assert_eq!(report.replaced(), 2);
        assert!(report.bytes_saved() > 0);

        for id in fixtures::image_ids(&doc) {
            let dict = &fixtures::stream(&doc, id).dict;
            assert_eq!(fixtures::name(dict, b"Filter"), Some(b"DCTDecode".as_slice()));
            assert_eq!(fixtures::name(dict, b"ColorSpace"), Some(b"DeviceGray".as_slice()));
            assert!(fixtures::integer(dict, b"Width").expect("width") <= 595);
        }
    }

    #[test]
    fn width_cap_preserves_aspect_ratio() {
        let mut doc = fixtures::document(vec![Some(FixtureImage::Noise {
            width: 1190,
            height: 200,
        })]);
        reencoder(20).run(&mut doc);

        let id = fixtures::image_ids(&doc)[0];
        let dict = &fixtures::stream(&doc, id).dict;
        assert_eq!(fixtures::integer(dict, b"Width"), Some(595));
        assert_eq!(fixtures::integer(dict, b"Height"), Some(100));
    }

    #[test]
    fn never_replaces_with_a_larger_stream() {
        let bytes = fixtures::jpeg(64, 64, 5);
        let stored = bytes.len();
        let mut doc = fixtures::document(vec![Some(FixtureImage::Jpeg {
            bytes: bytes.clone(),
            width: 64,
            height: 64,
        })]);

        let report = reencoder(95).run(&mut doc);
        let id = fixtures::image_ids(&doc)[0];
        assert!(matches!(
            report.outcome(id),
            Some(ObjectOutcome::Retained { stored: s, .. }) if *s == stored
        ));
        assert_eq!(fixtures::stream(&doc, id).content, bytes);
    }

    #[test]
    fn corrupt_object_is_isolated() {
        let mut pages: Vec<Option<FixtureImage>> = (0..4)
            .map(|_| {
                Some(FixtureImage::Noise {
                    width: 320,
                    height: 80,
                })
            })
            .collect();
        pages.push(Some(FixtureImage::Corrupt));

        let mut doc = fixtures::document(pages);
        let report = reencoder(50).run(&mut doc);

        assert_eq!(report.replaced(), 4);
        assert_eq!(report.skipped(), 1);
        let reason = report
            .objects
            .iter()
            .find_map(|(_, outcome)| match outcome {
                ObjectOutcome::Skipped { reason } => Some(reason.clone()),
                _ => None,
            })
            .expect("skip recorded");
        assert!(reason.contains("could not be processed"), "{reason}");
    }

    #[test]
    fn masks_and_stencils_are_left_alone() {
        let mut doc = fixtures::document(vec![None]);
        let smask_id = doc.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 16,
                    "Height" => 16,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![200; 256],
            )
            .with_compression(false),
        );
        let image_id = doc.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 16,
                    "Height" => 16,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "SMask" => smask_id,
                },
                fixtures::noise_rgb(16, 16, 3).into_raw(),
            )
            .with_compression(false),
        );
        let stencil_id = doc.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 8,
                    "Height" => 8,
                    "ImageMask" => true,
                    "BitsPerComponent" => 1,
                },
                vec![0xAA; 8],
            )
            .with_compression(false),
        );

        let report = reencoder(50).run(&mut doc);
        assert!(matches!(report.outcome(smask_id), Some(ObjectOutcome::Skipped { .. })));
        assert!(matches!(report.outcome(stencil_id), Some(ObjectOutcome::Skipped { .. })));
        assert!(report.outcome(image_id).is_some());
        assert_eq!(
            fixtures::name(&fixtures::stream(&doc, smask_id).dict, b"ColorSpace"),
            Some(b"DeviceGray".as_slice())
        );
    }

    #[test]
    fn cmyk_and_icc_samples_decode() {
        let mut doc = fixtures::document(vec![None]);
        let profile_id = doc.add_object(Stream::new(dictionary! { "N" => 3 }, vec![0; 128]));
        let icc = doc.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 200,
                    "Height" => 100,
                    "ColorSpace" => vec![Object::Name(b"ICCBased".to_vec()), profile_id.into()],
                    "BitsPerComponent" => 8,
                },
                fixtures::noise_rgb(200, 100, 11).into_raw(),
            )
            .with_compression(false),
        );
        let cmyk_pixels: Vec<u8> = fixtures::noise_rgb(100, 100, 5)
            .into_raw()
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], rgb[0] / 4])
            .collect();
        let cmyk = doc.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 100,
                    "Height" => 100,
                    "ColorSpace" => "DeviceCMYK",
                    "BitsPerComponent" => 8,
                },
                cmyk_pixels,
            )
            .with_compression(false),
        );

        let report = reencoder(70).run(&mut doc);
        assert!(matches!(report.outcome(icc), Some(ObjectOutcome::Replaced { .. })));
        assert!(matches!(report.outcome(cmyk), Some(ObjectOutcome::Replaced { .. })));
        assert_eq!(
            fixtures::name(&fixtures::stream(&doc, cmyk).dict, b"ColorSpace"),
            Some(b"DeviceRGB".as_slice())
        );
    }

    #[test]
    fn gray_sources_stay_gray_above_the_lowest_band() {
        let gray_pixels: Vec<u8> = fixtures::noise_rgb(400, 300, 13)
            .into_raw()
            .into_iter()
            .step_by(3)
            .collect();
        let gray_image = |color_space: Object| {
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 400,
                    "Height" => 300,
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                },
                gray_pixels.clone(),
            )
            .with_compression(false)
        };

        let mut doc = fixtures::document(vec![None]);
        let device_gray = doc.add_object(gray_image(Object::Name(b"DeviceGray".to_vec())));
        let profile_id = doc.add_object(Stream::new(dictionary! { "N" => 1 }, vec![0; 128]));
        let icc_gray = doc.add_object(gray_image(Object::Array(vec![
            Object::Name(b"ICCBased".to_vec()),
            profile_id.into(),
        ])));

        let report = reencoder(70).run(&mut doc);
        for id in [device_gray, icc_gray] {
            assert!(matches!(report.outcome(id), Some(ObjectOutcome::Replaced { .. })));
            let stream = fixtures::stream(&doc, id);
            assert_eq!(
                fixtures::name(&stream.dict, b"ColorSpace"),
                Some(b"DeviceGray".as_slice())
            );
            let decoded = RasterImage::from_bytes(&stream.content).expect("decode");
            assert_eq!(decoded.color_mode(), ColorMode::Grayscale);
        }
    }

    #[test]
    fn indexed_and_low_bit_images_are_skipped() {
        let mut doc = fixtures::document(vec![None]);
        let indexed = doc.add_object(
            Stream::new(
                dictionary! {
                    "Subtype" => "Image",
                    "Width" => 4,
                    "Height" => 4,
                    "ColorSpace" => vec![
                        Object::Name(b"Indexed".to_vec()),
                        Object::Name(b"DeviceRGB".to_vec()),
                        1.into(),
                        Object::string_literal(vec![0u8, 0, 0, 255, 255, 255]),
                    ],
                    "BitsPerComponent" => 8,
                },
                vec![0; 16],
            )
            .with_compression(false),
        );
        let one_bit = doc.add_object(
            Stream::new(
                dictionary! {
                    "Subtype" => "Image",
                    "Width" => 8,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 1,
                },
                vec![0x0F],
            )
            .with_compression(false),
        );

        let report = reencoder(50).run(&mut doc);
        assert!(matches!(report.outcome(indexed), Some(ObjectOutcome::Skipped { .. })));
        assert!(matches!(report.outcome(one_bit), Some(ObjectOutcome::Skipped { .. })));
    }

    #[test]
    fn serial_and_parallel_passes_agree() {
        let pages = || {
            (0..3)
                .map(|_| {
                    Some(FixtureImage::Noise {
                        width: 400,
                        height: 90,
                    })
                })
                .collect::<Vec<_>>()
        };
        let policy = CompressionPolicy::for_tier(QualityTier::new(60).expect("tier"));

        let mut serial = fixtures::document(pages());
        let mut parallel = fixtures::document(pages());
        ImageReencoder::new(policy, 500, false).run(&mut serial);
        ImageReencoder::new(policy, 500, true).run(&mut parallel);

        for id in fixtures::image_ids(&serial) {
            assert_eq!(
                fixtures::stream(&serial, id).content,
                fixtures::stream(&parallel, id).content
            );
        }
    }

    #[test]
    fn cmyk_conversion_handles_extremes() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), vec![255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), vec![0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 255, 0]), vec![0, 255, 0]);
    }
}
