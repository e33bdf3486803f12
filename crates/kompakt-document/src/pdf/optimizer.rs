// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document optimizer — tier policy, raster re-encoding, compaction and a
// guaranteed-valid output.
//
// Only an unreadable source is an error. Once the source has loaded, the
// caller always gets a valid PDF back: the optimized one when it is smaller,
// otherwise the source bytes unchanged.

use std::path::{Path, PathBuf};

use kompakt_core::config::DocumentConfig;
use kompakt_core::error::{KompaktError, Result};
use kompakt_core::types::{AssetKind, QualityTier};
use lopdf::Document;
use tracing::{info, instrument, warn};

use super::compaction::{self, CompactionReport};
use super::policy::CompressionPolicy;
use super::reencode::{ImageReencoder, ReencodeReport};
use crate::workspace::{CandidateWorkspace, sibling_output};

/// Which bytes ended up in the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// The rebuilt document, smaller than the source.
    Optimized,
    /// The rebuild was not smaller, so the source bytes were emitted.
    SourceSmaller,
    /// The rebuild was abandoned and the source copied unchanged.
    Unmodified { reason: String },
}

/// Result of one document optimization.
#[derive(Debug, Clone)]
pub struct DocumentOptimization {
    pub output: PathBuf,
    pub outcome: DocumentOutcome,
    pub policy: CompressionPolicy,
    pub reencode: ReencodeReport,
    pub compaction: Option<CompactionReport>,
    pub source_size: u64,
    pub output_size: u64,
}

impl DocumentOptimization {
    /// Output size as a fraction of the source size.
    pub fn ratio(&self) -> f64 {
        if self.source_size == 0 {
            return 1.0;
        }
        self.output_size as f64 / self.source_size as f64
    }
}

/// Tier-driven PDF optimizer.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptimizer {
    config: DocumentConfig,
}

impl DocumentOptimizer {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Optimize `source`, writing `<stem>.compressed.pdf` next to it.
    pub fn optimize(&self, source: &Path, tier: QualityTier) -> Result<DocumentOptimization> {
        let output = sibling_output(source, "compressed", "pdf");
        self.optimize_to(source, tier, &output)
    }

    #[instrument(skip_all, fields(source = %source.display(), tier = tier.value()))]
    pub fn optimize_to(
        &self,
        source: &Path,
        tier: QualityTier,
        output: &Path,
    ) -> Result<DocumentOptimization> {
        AssetKind::ensure(source, |kind| !kind.is_raster())?;
        let original = std::fs::read(source)?;
        let source_size = original.len() as u64;
        let mut doc = Document::load_mem(&original).map_err(|err| {
            KompaktError::Decode(format!("failed to load {}: {}", source.display(), err))
        })?;

        let policy = CompressionPolicy::for_tier(tier);
        let workspace = CandidateWorkspace::beside(output)?;

        info!(
            pages = doc.get_pages().len(),
            objects = doc.objects.len(),
            source_size,
            max_dpi = policy.max_dpi,
            quality = policy.jpeg_quality,
            force_grayscale = policy.force_grayscale,
            "Optimizing document"
        );

        let mut result = DocumentOptimization {
            output: output.to_path_buf(),
            outcome: DocumentOutcome::Optimized,
            policy,
            reencode: ReencodeReport::default(),
            compaction: None,
            source_size,
            output_size: source_size,
        };

        if doc.trailer.get(b"Encrypt").is_ok() {
            let reason = "document is encrypted, unlock it first".to_string();
            warn!(%reason, "Copying source unchanged");
            result.outcome = DocumentOutcome::Unmodified { reason };
            workspace.stage(&original)?.promote(output)?;
            return Ok(result);
        }

        let max_width = policy.max_pixel_width(self.config.reference_paper);
        let reencoder = ImageReencoder::new(policy, max_width, self.config.parallel);
        result.reencode = reencoder.run(&mut doc);
        result.compaction = Some(compaction::compact(&mut doc, &self.config));

        let rebuilt = match serialise(&mut doc) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, "Copying source unchanged");
                result.outcome = DocumentOutcome::Unmodified {
                    reason: err.to_string(),
                };
                workspace.stage(&original)?.promote(output)?;
                return Ok(result);
            }
        };

        let emitted = if rebuilt.len() < original.len() {
            rebuilt
        } else {
            info!(
                rebuilt = rebuilt.len(),
                source_size, "Rebuilt document is not smaller, keeping source bytes"
            );
            result.outcome = DocumentOutcome::SourceSmaller;
            original
        };

        result.output_size = emitted.len() as u64;
        workspace.stage(&emitted)?.promote(output)?;

        info!(
            outcome = ?result.outcome,
            output_size = result.output_size,
            ratio = result.ratio(),
            "Document optimized"
        );
        Ok(result)
    }
}

fn serialise(doc: &mut Document) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| KompaktError::StructuralSave(err.to_string()))?;
    Ok(bytes)
}
