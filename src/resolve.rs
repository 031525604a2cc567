//! Directory resolution: turn user-supplied source and destination paths
//! into validated, canonical directories.
//!
//! The source must already exist; the destination is created on demand.
//! The source is always resolved first so a typo in it never leaves a
//! freshly-created, empty destination behind.

use crate::error::Scan2PdfError;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Validated, absolute source and destination directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirs {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Write `prompt`, read one line, and return it trimmed.
///
/// End of input yields an empty string.
pub fn prompt_line<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    prompt: &str,
) -> io::Result<String> {
    write!(writer, "{prompt}")?;
    writer.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Canonicalise an existing source directory.
pub fn resolve_source(path: impl AsRef<Path>) -> Result<PathBuf, Scan2PdfError> {
    let path = path.as_ref();
    let invalid = |reason: &str| Scan2PdfError::InvalidSourceDir {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("no path given"));
    }

    let canonical = path.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => invalid("does not exist"),
        _ => invalid(&e.to_string()),
    })?;

    if !canonical.is_dir() {
        return Err(invalid("not a directory"));
    }

    debug!("Resolved source directory: {}", canonical.display());
    Ok(canonical)
}

/// Canonicalise the destination directory, creating it (and any missing
/// parents) when absent.
pub fn resolve_destination(path: impl AsRef<Path>) -> Result<PathBuf, Scan2PdfError> {
    let path = path.as_ref();
    let failed = |reason: String| Scan2PdfError::DestCreateFailed {
        path: path.to_path_buf(),
        reason,
    };

    if path.as_os_str().is_empty() {
        return Err(failed("no path given".into()));
    }

    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| failed(e.to_string()))?;
        info!("Created destination directory: {}", path.display());
    }

    let canonical = path.canonicalize().map_err(|e| failed(e.to_string()))?;
    if !canonical.is_dir() {
        return Err(failed("exists but is not a directory".into()));
    }

    debug!("Resolved destination directory: {}", canonical.display());
    Ok(canonical)
}

/// Resolve both directories, source first.
pub fn resolve_directories(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<ResolvedDirs, Scan2PdfError> {
    let source = resolve_source(source)?;
    let dest = resolve_destination(dest)?;
    Ok(ResolvedDirs { source, dest })
}

/// Interactively ask for the source and destination directories.
pub fn prompt_directories<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> Result<ResolvedDirs, Scan2PdfError> {
    let io_err = |e: io::Error| Scan2PdfError::Internal(format!("Failed to read input: {e}"));

    let source = prompt_line(reader, writer, "Enter the source directory containing images: ")
        .map_err(io_err)?;
    let source = resolve_source(source)?;

    let dest = prompt_line(reader, writer, "Enter the destination directory for PDFs: ")
        .map_err(io_err)?;
    let dest = resolve_destination(dest)?;

    Ok(ResolvedDirs { source, dest })
}
