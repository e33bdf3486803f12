// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural compaction — metadata stripping, font-program deduplication,
// stream deflation and orphan pruning on a loaded lopdf document.

use std::collections::BTreeMap;

use kompakt_core::config::DocumentConfig;
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

/// Page-level keys that only carry metadata or previews.
const PAGE_METADATA_KEYS: [&[u8]; 3] = [b"Metadata", b"PieceInfo", b"Thumb"];
/// Catalog-level metadata keys.
const CATALOG_METADATA_KEYS: [&[u8]; 2] = [b"Metadata", b"PieceInfo"];
/// FontDescriptor keys that reference embedded font programs.
const FONT_FILE_KEYS: [&[u8]; 3] = [b"FontFile", b"FontFile2", b"FontFile3"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    /// Metadata entries removed from the trailer, catalog and pages.
    pub metadata_entries_removed: usize,
    /// Font-program references redirected to an identical program.
    pub fonts_deduplicated: usize,
    /// Unreachable objects dropped.
    pub objects_pruned: usize,
}

/// Compact `doc` in place.
#[instrument(skip_all)]
pub fn compact(doc: &mut Document, config: &DocumentConfig) -> CompactionReport {
    let mut report = CompactionReport::default();

    if config.strip_metadata {
        report.metadata_entries_removed = strip_metadata(doc);
    }
    if config.dedupe_fonts {
        report.fonts_deduplicated = dedupe_font_programs(doc);
    }

    doc.compress();
    report.objects_pruned = doc.prune_objects().len();
    doc.renumber_objects();

    info!(
        metadata = report.metadata_entries_removed,
        fonts = report.fonts_deduplicated,
        pruned = report.objects_pruned,
        "Document compacted"
    );
    report
}

/// Remove /Info, catalog XMP and per-page metadata. Returns the number of
/// entries removed.
pub fn strip_metadata(doc: &mut Document) -> usize {
    let mut removed = usize::from(doc.trailer.remove(b"Info").is_some());

    let catalog_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    if let Some(id) = catalog_id {
        removed += remove_keys(doc, id, &CATALOG_METADATA_KEYS);
    }

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for id in page_ids {
        removed += remove_keys(doc, id, &PAGE_METADATA_KEYS);
    }

    debug!(removed, "Metadata stripped");
    removed
}

fn remove_keys(doc: &mut Document, id: ObjectId, keys: &[&[u8]]) -> usize {
    match doc.get_object_mut(id) {
        Ok(Object::Dictionary(dict)) => keys
            .iter()
            .filter(|key| dict.remove(key).is_some())
            .count(),
        _ => 0,
    }
}

/// Point every FontDescriptor at the first of any byte-identical embedded
/// font programs. The duplicates become orphans and are pruned afterwards.
///
/// Best effort: descriptors or programs that are not shaped as expected are
/// left alone.
pub fn dedupe_font_programs(doc: &mut Document) -> usize {
    // (descriptor, key, program) for every embedded font program reference.
    let mut references: Vec<(ObjectId, &'static [u8], ObjectId)> = Vec::new();
    for (&id, object) in &doc.objects {
        let Object::Dictionary(dict) = object else {
            continue;
        };
        if !matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"FontDescriptor") {
            continue;
        }
        for key in FONT_FILE_KEYS {
            if let Ok(Object::Reference(program)) = dict.get(key) {
                references.push((id, key, *program));
            }
        }
    }

    let mut canonical: BTreeMap<String, ObjectId> = BTreeMap::new();
    let mut redirects: Vec<(ObjectId, &'static [u8], ObjectId)> = Vec::new();
    for (descriptor, key, program) in references {
        let Some(digest) = program_digest(doc, program) else {
            continue;
        };
        let first = *canonical.entry(digest).or_insert(program);
        if first != program {
            redirects.push((descriptor, key, first));
        }
    }

    for (descriptor, key, target) in &redirects {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*descriptor) {
            dict.set(key.to_vec(), Object::Reference(*target));
        }
    }

    if !redirects.is_empty() {
        debug!(merged = redirects.len(), "Duplicate font programs merged");
    }
    redirects.len()
}

/// SHA-256 over the filter and stored bytes of a font program stream.
fn program_digest(doc: &Document, id: ObjectId) -> Option<String> {
    let Ok(Object::Stream(stream)) = doc.get_object(id) else {
        return None;
    };
    let mut hasher = Sha256::new();
    if let Ok(filter) = stream.dict.get(b"Filter") {
        hasher.update(format!("{filter:?}").as_bytes());
    }
    hasher.update(&stream.content);
    Some(hex::encode(hasher.finalize()))
}
