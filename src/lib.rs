//! # scan2pdf
//!
//! Batch-convert a directory of scanned images into searchable PDFs.
//!
//! The heavy lifting is delegated to two external tools: ImageMagick
//! normalises each image into a TIFF, then OCRmyPDF runs Tesseract over it
//! and writes a PDF with an invisible text layer. This crate does the
//! sequencing around them: make sure the tools exist, validate the
//! directories, find the images, run both stages per file, and report
//! what happened to every file without letting one bad scan stop the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source dir
//!  │
//!  ├─ 1. Deps      ensure `convert` and `ocrmypdf` exist (install if absent)
//!  ├─ 2. Resolve   canonicalise source, create destination
//!  ├─ 3. Discover  *.jpg *.jpeg *.png *.tif *.tiff, any case, top level only
//!  ├─ 4. Cleanup   convert <image> <temp.tiff>
//!  ├─ 5. OCR       ocrmypdf -l eng --skip-text --output-type pdf
//!  │               --image-dpi 300 <temp.tiff> <dest>/<base>.pdf
//!  └─ 6. Report    per-file outcome + batch tally
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan2pdf::{convert_directory, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::default();
//!     let output = convert_directory("scans/", "pdfs/", &config).await?;
//!     eprintln!(
//!         "{} converted, {} failed",
//!         output.stats.converted, output.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scan2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod deps;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod resolve;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder, OutputPolicy, DEFAULT_EXTENSIONS};
pub use convert::{convert_directory, convert_directory_sync, convert_file, list_images};
pub use deps::{
    ensure_dependencies, ensure_tool, locate_tool, EnsureOptions, PackageInstaller,
    SystemPackageManager, ToolRequirement,
};
pub use error::{FileError, InstallError, Scan2PdfError};
pub use output::{BatchOutput, BatchStats, FileOutcome, FileResult};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use resolve::{
    prompt_directories, prompt_line, resolve_destination, resolve_directories, resolve_source,
    ResolvedDirs,
};
pub use stream::{convert_stream, FileStream};
