//! Configuration types for a batch image-to-PDF conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The defaults reproduce the classic pipeline:
//! ImageMagick `convert` to a TIFF, then `ocrmypdf -l eng --skip-text
//! --output-type pdf --image-dpi 300`.

use crate::deps::ToolRequirement;
use crate::error::Scan2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// File extensions picked up by default (matched case-insensitively).
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// Configuration for a batch conversion.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use scan2pdf::{BatchConfig, OutputPolicy};
///
/// let config = BatchConfig::builder()
///     .language("eng+deu")
///     .fallback_dpi(400)
///     .output_policy(OutputPolicy::Skip)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Image-cleanup program. Default: `convert` (ImageMagick).
    ///
    /// Invoked as `<cleanup_tool> <input> <temp.tiff>`.
    pub cleanup_tool: String,

    /// Package that provides `cleanup_tool`. Default: `imagemagick`.
    pub cleanup_package: String,

    /// OCR program. Default: `ocrmypdf`.
    pub ocr_tool: String,

    /// Package that provides `ocr_tool`. Default: `ocrmypdf`.
    pub ocr_package: String,

    /// Tesseract language passed as `-l`. Default: `eng`.
    pub language: String,

    /// Pass `--skip-text` so pages that already carry text are left alone. Default: true.
    pub skip_text: bool,

    /// DPI assumed when the image carries no resolution metadata. Range: 72–1200. Default: 300.
    pub fallback_dpi: u32,

    /// Accepted file extensions, lower-case, without the dot.
    pub extensions: Vec<String>,

    /// Process files in file-name order rather than directory order. Default: true.
    pub sort_inputs: bool,

    /// What to do when the output PDF already exists. Default: [`OutputPolicy::Overwrite`].
    pub output_policy: OutputPolicy,

    /// Directory for the intermediate TIFF. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Kill an external tool that runs longer than this. `None` waits forever.
    ///
    /// Only the direct child is killed. Workers it spawned (OCRmyPDF's
    /// Tesseract and Ghostscript processes) are not signalled and may keep
    /// running until they finish on their own.
    pub tool_timeout_secs: Option<u64>,

    /// Receives per-file events while the batch runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            cleanup_tool: "convert".to_string(),
            cleanup_package: "imagemagick".to_string(),
            ocr_tool: "ocrmypdf".to_string(),
            ocr_package: "ocrmypdf".to_string(),
            language: "eng".to_string(),
            skip_text: true,
            fallback_dpi: 300,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            sort_inputs: true,
            output_policy: OutputPolicy::default(),
            temp_dir: None,
            tool_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("cleanup_tool", &self.cleanup_tool)
            .field("cleanup_package", &self.cleanup_package)
            .field("ocr_tool", &self.ocr_tool)
            .field("ocr_package", &self.ocr_package)
            .field("language", &self.language)
            .field("skip_text", &self.skip_text)
            .field("fallback_dpi", &self.fallback_dpi)
            .field("extensions", &self.extensions)
            .field("sort_inputs", &self.sort_inputs)
            .field("output_policy", &self.output_policy)
            .field("temp_dir", &self.temp_dir)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// The external tools this configuration needs, in invocation order.
    pub fn requirements(&self) -> Vec<ToolRequirement> {
        vec![
            ToolRequirement::new(&self.cleanup_tool, &self.cleanup_package),
            ToolRequirement::new(&self.ocr_tool, &self.ocr_package),
        ]
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn cleanup_tool(mut self, program: impl Into<String>) -> Self {
        self.config.cleanup_tool = program.into();
        self
    }

    pub fn cleanup_package(mut self, package: impl Into<String>) -> Self {
        self.config.cleanup_package = package.into();
        self
    }

    pub fn ocr_tool(mut self, program: impl Into<String>) -> Self {
        self.config.ocr_tool = program.into();
        self
    }

    pub fn ocr_package(mut self, package: impl Into<String>) -> Self {
        self.config.ocr_package = package.into();
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn skip_text(mut self, v: bool) -> Self {
        self.config.skip_text = v;
        self
    }

    pub fn fallback_dpi(mut self, dpi: u32) -> Self {
        self.config.fallback_dpi = dpi.clamp(72, 1200);
        self
    }

    /// Replace the accepted extensions. Leading dots and case are normalised.
    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn sort_inputs(mut self, v: bool) -> Self {
        self.config.sort_inputs = v;
        self
    }

    pub fn output_policy(mut self, policy: OutputPolicy) -> Self {
        self.config.output_policy = policy;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Scan2PdfError> {
        let c = &self.config;
        if c.cleanup_tool.trim().is_empty() || c.ocr_tool.trim().is_empty() {
            return Err(Scan2PdfError::InvalidConfig(
                "Tool names must not be empty".into(),
            ));
        }
        if c.language.trim().is_empty() {
            return Err(Scan2PdfError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.extensions.iter().all(|e| e.is_empty()) {
            return Err(Scan2PdfError::InvalidConfig(
                "At least one file extension is required".into(),
            ));
        }
        if c.tool_timeout_secs == Some(0) {
            return Err(Scan2PdfError::InvalidConfig(
                "Tool timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do when `<dest>/<base>.pdf` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputPolicy {
    /// Replace the existing file silently. (default)
    #[default]
    Overwrite,
    /// Leave the existing file alone and mark the input as skipped.
    Skip,
    /// Record a per-file [`crate::error::FileError::OutputExists`].
    Fail,
}
