// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF unlock — remove the standard security handler from a document the
// caller holds the password for.

use std::path::{Path, PathBuf};

use kompakt_core::error::{KompaktError, Result};
use kompakt_core::types::AssetKind;
use lopdf::{Document, Object};
use tracing::{info, instrument, warn};

use crate::workspace::{CandidateWorkspace, sibling_output};

/// Unlock `source`, writing `<stem>.unlocked.pdf` next to it.
pub fn unlock_document(source: &Path, password: &str) -> Result<PathBuf> {
    let output = sibling_output(source, "unlocked", "pdf");
    unlock_document_to(source, password, &output)
}

/// Authenticate `password` against `source` and save a copy without
/// encryption to `output`.
///
/// An unencrypted input is re-saved as-is. The password may be either the
/// owner or the user password. The loader decrypts objects only for
/// documents whose user password is empty, so a document that needs a
/// password just to open is reported as `UnsupportedDocument` even when the
/// password is right.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn unlock_document_to(source: &Path, password: &str, output: &Path) -> Result<PathBuf> {
    AssetKind::ensure(source, |kind| !kind.is_raster())?;
    let original = std::fs::read(source)?;
    let mut doc = Document::load_mem(&original).map_err(|err| {
        KompaktError::Decode(format!("failed to load {}: {}", source.display(), err))
    })?;
    let workspace = CandidateWorkspace::beside(output)?;

    let has_encrypt = doc.trailer.get(b"Encrypt").is_ok();
    if has_encrypt && !doc.is_encrypted() {
        return Err(KompaktError::Decode("encryption dictionary could not be read".into()));
    }

    if has_encrypt {
        doc.authenticate_password(password)
            .map_err(|_| KompaktError::IncorrectPassword)?;
        if doc.encryption_state.is_none() {
            warn!("Objects were not decrypted on load");
            return Err(KompaktError::UnsupportedDocument(
                "PDF that needs a password to open".into(),
            ));
        }
        strip_encryption(&mut doc);
    } else {
        info!("Document is not encrypted, re-saving");
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| KompaktError::StructuralSave(err.to_string()))?;

    info!(
        pages = doc.get_pages().len(),
        before = original.len(),
        after = bytes.len(),
        "Document unlocked"
    );
    workspace.stage(&bytes)?.promote(output)
}

/// Drop the /Encrypt trailer entry and its dictionary. Objects are already
/// plaintext in memory, so saving afterwards writes an open document.
fn strip_encryption(doc: &mut Document) {
    if let Some(Object::Reference(id)) = doc.trailer.remove(b"Encrypt") {
        doc.objects.remove(&id);
    }
    doc.encryption_state = None;
}
