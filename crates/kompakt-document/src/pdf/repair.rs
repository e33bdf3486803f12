// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF repair — reload and re-save a document with a rebuilt object table.

use std::path::{Path, PathBuf};

use kompakt_core::error::{KompaktError, Result};
use kompakt_core::types::AssetKind;
use lopdf::Document;
use tracing::{info, instrument};

use crate::workspace::{CandidateWorkspace, sibling_output};

/// Repair `source`, writing `<stem>.repaired.pdf` next to it.
pub fn repair_document(source: &Path) -> Result<PathBuf> {
    let output = sibling_output(source, "repaired", "pdf");
    repair_document_to(source, &output)
}

/// Load `source`, drop unreachable objects, renumber, deflate and save to
/// `output`. The loader's cross-reference recovery does the actual fixing.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn repair_document_to(source: &Path, output: &Path) -> Result<PathBuf> {
    AssetKind::ensure(source, |kind| !kind.is_raster())?;
    let original = std::fs::read(source)?;
    let mut doc = Document::load_mem(&original).map_err(|err| {
        KompaktError::Decode(format!("failed to load {}: {}", source.display(), err))
    })?;
    let workspace = CandidateWorkspace::beside(output)?;

    let pruned = doc.prune_objects().len();
    doc.renumber_objects();
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| KompaktError::StructuralSave(err.to_string()))?;

    info!(
        pages = doc.get_pages().len(),
        pruned,
        before = original.len(),
        after = bytes.len(),
        "Document repaired"
    );
    workspace.stage(&bytes)?.promote(output)
}
