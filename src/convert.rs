//! Eager (whole-directory) conversion entry points.
//!
//! [`convert_directory`] resolves the directories, discovers the images and
//! runs every file through the cleanup → OCR pipeline one after another,
//! returning only when the batch is done. Use
//! [`crate::stream::convert_stream`] instead to receive results as each file
//! finishes.

use crate::config::{BatchConfig, OutputPolicy};
use crate::error::{FileError, Scan2PdfError};
use crate::output::{BatchOutput, BatchStats, FileOutcome, FileResult};
use crate::pipeline::{discover, stage, temp::TempArtifact};
use crate::resolve;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Convert every supported image in `source` into a searchable PDF in `dest`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(BatchOutput)` once every file was attempted, even if some failed
/// (check `output.stats.failed`).
///
/// # Errors
/// Returns `Err(Scan2PdfError)` only for setup failures:
/// - source directory missing or not a directory
/// - destination directory cannot be created
/// - source directory cannot be listed
pub async fn convert_directory(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BatchOutput, Scan2PdfError> {
    let total_start = Instant::now();

    // ── Step 1: Resolve directories ──────────────────────────────────────
    let dirs = resolve::resolve_directories(source, dest)?;
    info!(
        "Converting images in {} into {}",
        dirs.source.display(),
        dirs.dest.display()
    );

    // ── Step 2: Discover inputs ──────────────────────────────────────────
    let images = discover_in(&dirs.source, config)?;
    let total = images.len();
    if total == 0 {
        info!("No supported images found in {}", dirs.source.display());
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 3: Convert sequentially ─────────────────────────────────────
    let mut files = Vec::with_capacity(total);
    for (i, image) in images.iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, image);
        }

        let result = convert_file(image, &dirs.dest, config).await;
        report(config, index, total, &result);
        files.push(result);
    }

    // ── Step 4: Tally ────────────────────────────────────────────────────
    let mut stats = BatchStats::from_results(&files);
    stats.duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Batch complete: {} converted, {} skipped, {} failed of {} in {}ms",
        stats.converted, stats.skipped, stats.failed, stats.discovered, stats.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.converted);
    }

    Ok(BatchOutput {
        source_dir: dirs.source,
        dest_dir: dirs.dest,
        files,
        stats,
    })
}

/// Synchronous wrapper around [`convert_directory`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside one.
pub fn convert_directory_sync(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BatchOutput, Scan2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Scan2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_directory(source, dest, config))
}

/// List the images a batch over `source` would process, without converting.
pub fn list_images(
    source: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, Scan2PdfError> {
    let source = resolve::resolve_source(source)?;
    discover_in(&source, config)
}

/// Run one image through cleanup → OCR into `dest_dir`.
///
/// Always returns a `FileResult`; a failing stage is recorded in
/// `outcome` rather than propagated so one bad image never stops a batch.
pub async fn convert_file(image: &Path, dest_dir: &Path, config: &BatchConfig) -> FileResult {
    let start = Instant::now();
    let output = discover::output_path(dest_dir, image);

    let outcome = run_pipeline(image, &output, config)
        .await
        .unwrap_or_else(FileOutcome::Failed);

    FileResult {
        input: image.to_path_buf(),
        output,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

pub(crate) fn discover_in(source: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, Scan2PdfError> {
    discover::discover_images(source, &config.extensions, config.sort_inputs).map_err(|e| {
        Scan2PdfError::SourceReadFailed {
            path: source.to_path_buf(),
            source: e,
        }
    })
}

async fn run_pipeline(
    image: &Path,
    output: &Path,
    config: &BatchConfig,
) -> Result<FileOutcome, FileError> {
    if output.exists() {
        match config.output_policy {
            OutputPolicy::Overwrite => debug!("Overwriting existing {}", output.display()),
            OutputPolicy::Skip => return Ok(FileOutcome::Skipped),
            OutputPolicy::Fail => {
                return Err(FileError::OutputExists {
                    file: image.to_path_buf(),
                    output: output.to_path_buf(),
                })
            }
        }
    }

    // Dropped (and deleted) on every return path below.
    let temp = TempArtifact::create(config.temp_dir.as_deref()).map_err(|e| {
        FileError::TempFileFailed {
            file: image.to_path_buf(),
            detail: e.to_string(),
        }
    })?;
    let timeout = config.tool_timeout_secs.map(Duration::from_secs);

    let cleanup = stage::cleanup_command(config, image, temp.path());
    stage::run_stage(&cleanup, timeout)
        .await
        .map_err(|e| FileError::CleanupFailed {
            file: image.to_path_buf(),
            detail: e.detail,
        })?;

    let ocr = stage::ocr_command(config, temp.path(), output);
    stage::run_stage(&ocr, timeout)
        .await
        .map_err(|e| FileError::OcrFailed {
            file: image.to_path_buf(),
            detail: e.detail,
        })?;

    Ok(FileOutcome::Converted)
}

/// Log a finished file and forward it to the progress callback.
pub(crate) fn report(config: &BatchConfig, index: usize, total: usize, result: &FileResult) {
    match &result.outcome {
        FileOutcome::Converted => {
            info!(
                "[{}/{}] {} -> {}",
                index,
                total,
                result.input.display(),
                result.output.display()
            );
        }
        FileOutcome::Skipped => {
            info!(
                "[{}/{}] {} skipped: {} exists",
                index,
                total,
                result.input.display(),
                result.output.display()
            );
        }
        FileOutcome::Failed(e) => warn!("[{}/{}] {}", index, total, e),
    }

    let Some(ref cb) = config.progress_callback else {
        return;
    };
    match &result.outcome {
        FileOutcome::Converted => cb.on_file_complete(index, total, &result.output),
        FileOutcome::Skipped => cb.on_file_skipped(index, total, &result.output),
        FileOutcome::Failed(e) => cb.on_file_error(index, total, &e.to_string()),
    }
}
