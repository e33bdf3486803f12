// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic PDFs for the document tests, built directly with lopdf.

use image::{DynamicImage, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// What to place on one fixture page.
pub(crate) enum FixtureImage {
    /// Gradient with noise, stored as 8-bit DeviceRGB and Flate-compressed.
    Noise { width: u32, height: u32 },
    /// Pre-encoded JPEG stored with DCTDecode.
    Jpeg { bytes: Vec<u8>, width: u32, height: u32 },
    /// DCTDecode stream whose bytes are not a JPEG.
    Corrupt,
    /// Unfiltered pixels in an arbitrary image dictionary.
    Raw { dict: Dictionary, pixels: Vec<u8> },
}

/// Gradient plus xorshift noise, packed RGB.
pub(crate) fn noise_rgb(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 26) as i32
    };
    RgbImage::from_fn(width, height, |x, y| {
        let base = ((x * 255) / width.max(1)) as i32;
        let shade = ((y * 255) / height.max(1)) as i32;
        image::Rgb([
            (base + next() - 32).clamp(0, 255) as u8,
            (shade + next() - 32).clamp(0, 255) as u8,
            ((base + shade) / 2 + next() - 32).clamp(0, 255) as u8,
        ])
    })
}

/// Encode a small JPEG at the given quality.
pub(crate) fn jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    crate::image::RasterImage::from_dynamic(DynamicImage::ImageRgb8(noise_rgb(width, height, 7)))
        .to_jpeg_bytes(quality)
        .expect("encode fixture jpeg")
}

fn image_stream(image: FixtureImage, seed: u32) -> Stream {
    match image {
        FixtureImage::Noise { width, height } => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            noise_rgb(width, height, seed).into_raw(),
        ),
        FixtureImage::Jpeg {
            bytes,
            width,
            height,
        } => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            bytes,
        )
        .with_compression(false),
        FixtureImage::Corrupt => Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 640,
                "Height" => 480,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            b"\xff\xd8\xff\xe0 this is not a jpeg body".repeat(64),
        )
        .with_compression(false),
        FixtureImage::Raw { dict, pixels } => Stream::new(dict, pixels).with_compression(false),
    }
}

/// Build a document with one page per entry. Every page carries a line of
/// Helvetica text; pages with `Some` image also draw it. The document has an
/// /Info dictionary and catalog XMP metadata. Uncompressed streams are
/// deflated, as a typical producer would.
pub(crate) fn document(pages: Vec<Option<FixtureImage>>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(count);
    for (index, image) in pages.into_iter().enumerate() {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 14.into()]),
            Operation::new("Td", vec![72.into(), 760.into()]),
            Operation::new(
                "Tj",
                vec![Object::string_literal(format!("Fixture page {}", index + 1))],
            ),
            Operation::new("ET", vec![]),
        ];
        let mut xobjects = Dictionary::new();
        if let Some(image) = image {
            let image_id = doc.add_object(image_stream(image, index as u32 + 1));
            xobjects.set("Im0", image_id);
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![451.into(), 0.into(), 0.into(), 300.into(), 72.into(), 400.into()],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );

    let metadata_id = doc.add_object(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        b"<?xpacket begin=''?><x:xmpmeta xmlns:x='adobe:ns:meta/'></x:xmpmeta>".to_vec(),
    ));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Metadata" => metadata_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Kompakt fixture"),
        "Producer" => Object::string_literal("kompakt test suite"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();
    doc
}

/// Serialise a fixture document.
pub(crate) fn pdf_bytes(pages: Vec<Option<FixtureImage>>) -> Vec<u8> {
    let mut doc = document(pages);
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save fixture");
    out
}

/// Ids of every image XObject stream, in object order.
pub(crate) fn image_ids(doc: &Document) -> Vec<ObjectId> {
    doc.objects
        .iter()
        .filter_map(|(id, object)| {
            let stream = object.as_stream().ok()?;
            let is_image = name(&stream.dict, b"Subtype") == Some(b"Image".as_slice());
            is_image.then_some(*id)
        })
        .collect()
}

/// Fetch the image stream with `id`.
pub(crate) fn stream(doc: &Document, id: ObjectId) -> &Stream {
    match doc.get_object(id) {
        Ok(Object::Stream(stream)) => stream,
        other => panic!("object {id:?} is not a stream: {other:?}"),
    }
}

/// Name-valued dictionary entry.
pub(crate) fn name<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match dict.get(key) {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

/// Integer-valued dictionary entry.
pub(crate) fn integer(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match dict.get(key) {
        Ok(Object::Integer(value)) => Some(*value),
        _ => None,
    }
}
