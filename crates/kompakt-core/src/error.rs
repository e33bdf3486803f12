// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kompakt.
//
// Only `Decode` on the primary source is fatal to an optimization call. The
// remaining optimizer variants are raised internally and degrade to a
// best-effort output (fallback encodings, skipped objects, unmodified copies).

use thiserror::Error;

/// Top-level error type for all Kompakt operations.
#[derive(Debug, Error)]
pub enum KompaktError {
    // -- Optimizer taxonomy --
    #[error("failed to decode source: {0}")]
    Decode(String),

    #[error("no candidate fits within {target_bytes} bytes")]
    ConstraintUnsatisfiable { target_bytes: u64 },

    #[error("object {} {} could not be processed: {reason}", object.0, object.1)]
    ObjectProcessing { object: (u32, u16), reason: String },

    #[error("structural save failed: {0}")]
    StructuralSave(String),

    // -- Encoding and input validation --
    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("the password does not open this document")]
    IncorrectPassword,

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KompaktError>;
