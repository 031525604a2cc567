//! Error types for the scan2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Scan2PdfError`]: **Fatal**: the batch cannot proceed at all
//!   (tool missing and not installable, bad source directory, destination
//!   cannot be created). Returned as `Err(Scan2PdfError)` from the setup
//!   functions and the top-level `convert_*` entry points.
//!
//! * [`FileError`]: **Non-fatal**: a single image failed one of its stages
//!   but every other file is unaffected. Stored inside
//!   [`crate::output::FileResult`] so callers can inspect partial success.
//!
//! [`InstallError`] is the lower-level failure of a package-manager command;
//! the dependency ensurer folds it into [`Scan2PdfError::InstallFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scan2pdf library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Scan2PdfError {
    // ── Dependency errors ─────────────────────────────────────────────────
    /// A required tool is not on `PATH` and was not (or could not be) installed.
    #[error("Required tool '{tool}' was not found on PATH.\nInstall it manually: sudo apt-get install {package}")]
    MissingTool { tool: String, package: String },

    /// The package manager exited non-zero while installing a tool.
    #[error("Failed to install '{package}' with {manager}: {detail}\nInstall it manually: sudo apt-get install {package}")]
    InstallFailed {
        package: String,
        manager: String,
        detail: String,
    },

    // ── Directory errors ──────────────────────────────────────────────────
    /// Source directory is missing or is not a directory.
    #[error("Source directory '{path}' is not usable: {reason}")]
    InvalidSourceDir { path: PathBuf, reason: String },

    /// Destination directory could not be created.
    #[error("Failed to create destination directory '{path}': {reason}\nCheck the parent directory exists and is writable.")]
    DestCreateFailed { path: PathBuf, reason: String },

    /// Source directory exists but its entries could not be listed.
    #[error("Failed to read source directory '{path}': {source}")]
    SourceReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// Some files converted but at least one failed.
    ///
    /// Returned by [`crate::output::BatchOutput::into_result`] when the caller
    /// wants to treat any per-file failure as an error.
    #[error("{failed}/{total} files failed during conversion")]
    PartialFailure {
        converted: usize,
        failed: usize,
        total: usize,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input image.
///
/// Stored in [`crate::output::FileOutcome::Failed`]. The batch always moves on
/// to the next file.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The image-cleanup tool exited non-zero or could not be started.
    #[error("{file}: cleanup stage failed: {detail}")]
    CleanupFailed { file: PathBuf, detail: String },

    /// The OCR tool exited non-zero or could not be started.
    #[error("{file}: OCR stage failed: {detail}")]
    OcrFailed { file: PathBuf, detail: String },

    /// The output PDF already exists and the policy forbids replacing it.
    #[error("{file}: output '{output}' already exists")]
    OutputExists { file: PathBuf, output: PathBuf },

    /// The intermediate TIFF could not be allocated.
    #[error("{file}: could not create temporary file: {detail}")]
    TempFileFailed { file: PathBuf, detail: String },
}

impl FileError {
    /// The input image this error belongs to.
    pub fn file(&self) -> &std::path::Path {
        match self {
            FileError::CleanupFailed { file, .. }
            | FileError::OcrFailed { file, .. }
            | FileError::OutputExists { file, .. }
            | FileError::TempFileFailed { file, .. } => file,
        }
    }
}

/// A package-manager command failed.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The package manager could not be launched at all.
    #[error("could not run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The package manager ran and exited unsuccessfully.
    #[error("'{command}' exited with {status}")]
    ExitStatus { command: String, status: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = Scan2PdfError::PartialFailure {
            converted: 9,
            failed: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn install_failed_names_manual_remedy() {
        let e = Scan2PdfError::InstallFailed {
            package: "ocrmypdf".into(),
            manager: "apt-get".into(),
            detail: "exit status: 100".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("sudo apt-get install ocrmypdf"), "got: {msg}");
        assert!(msg.contains("exit status: 100"));
    }

    #[test]
    fn missing_tool_display() {
        let e = Scan2PdfError::MissingTool {
            tool: "convert".into(),
            package: "imagemagick".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'convert'"));
        assert!(msg.contains("imagemagick"));
    }

    #[test]
    fn file_error_reports_its_file() {
        let e = FileError::OcrFailed {
            file: PathBuf::from("/scans/a.png"),
            detail: "exit status: 2".into(),
        };
        assert_eq!(e.file(), std::path::Path::new("/scans/a.png"));
        assert!(e.to_string().contains("OCR stage failed"));
    }

    #[test]
    fn file_error_serializes() {
        let e = FileError::CleanupFailed {
            file: PathBuf::from("broken.png"),
            detail: "bad header".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("CleanupFailed"));
        let back: FileError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
