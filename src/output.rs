//! Result types produced by a batch conversion.

use crate::error::{FileError, Scan2PdfError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one input image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOutcome {
    /// The searchable PDF was written.
    Converted,
    /// The PDF already existed and [`crate::OutputPolicy::Skip`] was in force.
    Skipped,
    /// A stage failed; the batch moved on.
    Failed(FileError),
}

/// Per-file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Absolute path of the source image.
    pub input: PathBuf,
    /// Where the PDF was (or would have been) written.
    pub output: PathBuf,
    pub outcome: FileOutcome,
    /// Wall-clock time spent on this file, both stages included.
    pub duration_ms: u64,
}

impl FileResult {
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Converted)
    }

    pub fn error(&self) -> Option<&FileError> {
        match &self.outcome {
            FileOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub discovered: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl BatchStats {
    /// Tally the outcomes of `files`. `duration_ms` is left at zero.
    pub fn from_results(files: &[FileResult]) -> Self {
        let mut stats = BatchStats {
            discovered: files.len(),
            ..Default::default()
        };
        for f in files {
            match f.outcome {
                FileOutcome::Converted => stats.converted += 1,
                FileOutcome::Skipped => stats.skipped += 1,
                FileOutcome::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Turn any per-file failure into [`Scan2PdfError::PartialFailure`].
    pub fn into_result(self) -> Result<Self, Scan2PdfError> {
        if self.stats.failed > 0 {
            Err(Scan2PdfError::PartialFailure {
                converted: self.stats.converted,
                failed: self.stats.failed,
                total: self.stats.discovered,
            })
        } else {
            Ok(self)
        }
    }

    /// Per-file errors in processing order.
    pub fn errors(&self) -> impl Iterator<Item = &FileError> {
        self.files.iter().filter_map(FileResult::error)
    }
}
