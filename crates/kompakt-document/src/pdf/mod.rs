// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — tier policy, raster re-encoding, compaction, repair, unlock
// and image-to-PDF assembly.

pub mod compaction;
pub mod optimizer;
pub mod policy;
pub mod reencode;
pub mod repair;
pub mod unlock;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use compaction::CompactionReport;
pub use optimizer::{DocumentOptimization, DocumentOptimizer, DocumentOutcome};
pub use policy::CompressionPolicy;
pub use reencode::{ImageReencoder, ObjectOutcome, ReencodeReport};
pub use repair::{repair_document, repair_document_to};
pub use unlock::{unlock_document, unlock_document_to};
pub use writer::{PdfWriter, images_to_pdf};
