// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate workspace — scoped staging area for trial encodings.
//
// Every candidate an optimizer keeps is staged as a file inside a temporary
// directory next to the output. Promoting a candidate renames it onto the
// output path; everything still staged is deleted when the workspace drops,
// whichever way the optimizer returns.

use std::io::Write;
use std::path::{Path, PathBuf};

use kompakt_core::error::{KompaktError, Result};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

/// Temporary directory owning all staged candidates of one invocation.
pub struct CandidateWorkspace {
    dir: TempDir,
}

impl CandidateWorkspace {
    /// Create a workspace on the same filesystem as `output`, so promotion is
    /// a rename rather than a copy.
    pub fn beside(output: &Path) -> Result<Self> {
        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dir = tempfile::Builder::new()
            .prefix(".kompakt-")
            .tempdir_in(parent)?;
        debug!(path = %dir.path().display(), "Candidate workspace created");
        Ok(Self { dir })
    }

    /// Hidden directory holding the staged candidates.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to a new staged file.
    pub fn stage(&self, bytes: &[u8]) -> Result<StagedFile> {
        let mut file = NamedTempFile::new_in(self.dir.path())?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(StagedFile {
            file,
            len: bytes.len() as u64,
        })
    }
}

/// A staged candidate. Dropping it deletes the backing file.
pub struct StagedFile {
    file: NamedTempFile,
    len: u64,
}

impl StagedFile {
    /// Temporary location inside the workspace until promoted.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the staged bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move the staged file onto `destination`, replacing any existing file.
    pub fn promote(self, destination: &Path) -> Result<PathBuf> {
        self.file
            .persist(destination)
            .map_err(|err| KompaktError::Io(err.error))?;
        debug!(path = %destination.display(), bytes = self.len, "Candidate promoted");
        Ok(destination.to_path_buf())
    }
}

/// Output path next to `source`: `scan.png` → `scan.<tag>.<extension>`.
pub fn sibling_output(source: &Path, tag: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    source.with_file_name(format!("{stem}.{tag}.{extension}"))
}
