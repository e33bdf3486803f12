// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the upload tools.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how a front end presents it.

use crate::error::KompaktError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Temporary problem, retrying the same request may work.
    Transient,
    /// The user must change something (file, budget, settings).
    ActionRequired,
    /// The file itself cannot be processed.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the caller may retry the same request unchanged.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `KompaktError` into a `HumanError`.
pub fn humanize_error(err: &KompaktError) -> HumanError {
    match err {
        KompaktError::Decode(_) => HumanError {
            message: "We couldn't read this file.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it again as a JPEG, PNG or PDF.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        KompaktError::ConstraintUnsatisfiable { target_bytes } => HumanError {
            message: "The file can't be made that small without losing too much detail.".into(),
            suggestion: format!(
                "Try a larger target size than {} KB.",
                target_bytes.div_ceil(1024)
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        KompaktError::ObjectProcessing { .. } => HumanError {
            message: "One picture inside the document couldn't be compressed.".into(),
            suggestion: "The rest of the document was still compressed. No action is needed.".into(),
            retriable: false,
            severity: Severity::Transient,
        },

        KompaktError::StructuralSave(_) => HumanError {
            message: "The document couldn't be rebuilt.".into(),
            suggestion: "We returned your original file unchanged. Try the Repair tool first, then compress again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        KompaktError::Encode(_) => HumanError {
            message: "Compression failed while writing the result.".into(),
            suggestion: "Please try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        KompaktError::InvalidBudget(detail) => HumanError {
            message: "That quality or size setting isn't valid.".into(),
            suggestion: format!("Pick a value within the allowed range. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        KompaktError::InvalidInput(detail) => HumanError {
            message: "Something about the request isn't right.".into(),
            suggestion: format!("Check the files and settings, then try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        KompaktError::UnsupportedDocument(detail) => HumanError {
            message: "This tool can't work with that type of file.".into(),
            suggestion: format!(
                "Use the image tool for pictures and the PDF tools for documents. (File type: {detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        KompaktError::IncorrectPassword => HumanError {
            message: "That password doesn't unlock this document.".into(),
            suggestion: "Check the password with whoever sent you the file and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        KompaktError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The uploaded file couldn't be found.".into(),
                    suggestion: "Upload the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again in a moment.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        KompaktError::Serialization(_) => HumanError {
            message: "The server configuration couldn't be read.".into(),
            suggestion: "Please report this problem.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
