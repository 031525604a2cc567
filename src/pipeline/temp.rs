//! The intermediate TIFF handed from the cleanup stage to the OCR stage.
//!
//! Every file gets its own uniquely named artifact. The path is closed
//! immediately after creation so the external tool can replace it, and the
//! file is removed when the [`TempArtifact`] is dropped, whichever way the
//! iteration ends. A tool that already deleted or renamed it is fine.

use std::io;
use std::path::Path;
use tempfile::TempPath;

/// Owns the per-file intermediate TIFF.
#[derive(Debug)]
pub struct TempArtifact {
    path: TempPath,
}

impl TempArtifact {
    /// Create an empty `scan2pdf-*.tiff` in `dir`, or the system temp dir.
    pub fn create(dir: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scan2pdf-").suffix(".tiff");
        let file = match dir {
            Some(d) => builder.tempfile_in(d)?,
            None => builder.tempfile()?,
        };
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Path handed to both stages; valid until the artifact is dropped.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
