//! CLI binary for scan2pdf.
//!
//! A thin shim over the library crate: ensure the tools are installed, ask
//! for (or take from flags) the two directories, run the batch and print
//! per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scan2pdf::resolve::prompt_line;
use scan2pdf::{
    convert_directory, ensure_dependencies, list_images, prompt_directories, resolve_destination,
    resolve_source, BatchConfig, ConversionProgressCallback, EnsureOptions, OutputPolicy,
    ResolvedDirs, SystemPackageManager,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the file currently being processed.
    started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` tells us how many files there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning source directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} images…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, input: &Path) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(file_label(input));
    }

    fn on_file_complete(&self, index: usize, total: usize, output: &Path) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            file_label(output),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, index: usize, total: usize, output: &Path) {
        let _ = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            dim("–"),
            index,
            total,
            dim(&format!("{} exists, skipped", file_label(output))),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs();
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 100 {
            format!("{}\u{2026}", error.chars().take(99).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);

        if failed == 0 {
            eprintln!(
                "{} {}/{} images converted",
                green("✔"),
                bold(&converted.to_string()),
                total_files
            );
        } else {
            eprintln!(
                "{} {}/{} images converted  ({} failed)",
                if converted == 0 { red("✘") } else { cyan("⚠") },
                bold(&converted.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: prompts for source and destination directories
  scan2pdf

  # Non-interactive
  scan2pdf --source ~/scans --dest ~/pdfs

  # German + English OCR, keep PDFs that already exist
  scan2pdf --source scans --dest pdfs --language deu+eng --on-existing skip

  # Show which files would be converted
  scan2pdf --source scans --list-only

  # Machine-readable report
  scan2pdf --source scans --dest pdfs --json > report.json

PIPELINE (per image):
  convert <image> <tmp.tiff>
  ocrmypdf -l eng --skip-text --output-type pdf --image-dpi 300 <tmp.tiff> <dest>/<name>.pdf

  Supported inputs: .jpg .jpeg .png .tif .tiff (any case), top level of the
  source directory only. A file that fails either stage is reported and the
  batch continues; the exit code is 0 unless setup failed.

SETUP:
  Missing tools are installed with `sudo apt-get install -y imagemagick ocrmypdf`
  on first run. Pass --no-install to fail instead, or --no-sudo when running
  as root.
"#;

/// Batch-convert scanned images into searchable PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "scan2pdf",
    version,
    about = "Batch-convert scanned images into searchable PDFs with ImageMagick and OCRmyPDF",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the images. Prompted for when absent.
    #[arg(long, env = "SCAN2PDF_SOURCE")]
    source: Option<PathBuf>,

    /// Directory for the PDFs (created if missing). Prompted for when absent.
    #[arg(long, env = "SCAN2PDF_DEST")]
    dest: Option<PathBuf>,

    /// Tesseract language(s), e.g. eng or deu+eng.
    #[arg(short, long, env = "SCAN2PDF_LANGUAGE", default_value = "eng")]
    language: String,

    /// DPI assumed for images without resolution metadata (72–1200).
    #[arg(long, env = "SCAN2PDF_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// Image-cleanup program.
    #[arg(long, env = "SCAN2PDF_CLEANUP_TOOL", default_value = "convert")]
    cleanup_tool: String,

    /// OCR program.
    #[arg(long, env = "SCAN2PDF_OCR_TOOL", default_value = "ocrmypdf")]
    ocr_tool: String,

    /// What to do when the output PDF already exists.
    #[arg(long, env = "SCAN2PDF_ON_EXISTING", value_enum, default_value = "overwrite")]
    on_existing: OnExistingArg,

    /// Kill an external tool after this many seconds.
    #[arg(long, env = "SCAN2PDF_TOOL_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    tool_timeout: Option<u64>,

    /// Directory for intermediate TIFF files.
    #[arg(long, env = "SCAN2PDF_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Fail instead of installing missing tools.
    #[arg(long, env = "SCAN2PDF_NO_INSTALL")]
    no_install: bool,

    /// Run the package manager without sudo.
    #[arg(long, env = "SCAN2PDF_NO_SUDO")]
    no_sudo: bool,

    /// Process files in directory order instead of by name.
    #[arg(long, env = "SCAN2PDF_NO_SORT")]
    no_sort: bool,

    /// Print the images that would be converted and exit.
    #[arg(long)]
    list_only: bool,

    /// Print a JSON report (BatchOutput) on stdout.
    #[arg(long, env = "SCAN2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SCAN2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCAN2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCAN2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OnExistingArg {
    Overwrite,
    Skip,
    Fail,
}

impl From<OnExistingArg> for OutputPolicy {
    fn from(v: OnExistingArg) -> Self {
        match v {
            OnExistingArg::Overwrite => OutputPolicy::Overwrite,
            OnExistingArg::Skip => OutputPolicy::Skip,
            OnExistingArg::Fail => OutputPolicy::Fail,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces per-file logs; setup warnings (a tool being
    // installed) still reach stderr before the bar exists.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn,scan2pdf::convert=error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        let config = build_config(&cli)?;
        let source = match cli.source {
            Some(ref p) => p.clone(),
            None => ask("Enter the source directory containing images: ")?,
        };
        let images = list_images(&source, &config).context("Failed to list images")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&images).context("Failed to serialise file list")?
            );
        } else {
            for image in &images {
                println!("{}", image.display());
            }
            if !cli.quiet {
                eprintln!("{} supported images", images.len());
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = build_config(&cli)?;

    // ── Ensure external tools ────────────────────────────────────────────
    let installer = if cli.no_sudo {
        SystemPackageManager::apt().without_elevation()
    } else {
        SystemPackageManager::apt()
    };
    let options = EnsureOptions {
        install_missing: !cli.no_install,
        ..EnsureOptions::default()
    };
    let requirements = config.requirements();
    // block_in_place: the package manager is blocking and may prompt for a password.
    tokio::task::block_in_place(|| ensure_dependencies(&requirements, &installer, &options))
        .context("Required tools are unavailable")?;

    // ── Resolve directories ──────────────────────────────────────────────
    let dirs = obtain_directories(&cli).context("Invalid directories")?;

    // The bar starts after the prompts so it never draws over them.
    if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        config.progress_callback = Some(cb as Arc<dyn ConversionProgressCallback>);
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let output = convert_directory(&dirs.source, &dirs.dest, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        // Per-file failures were already logged as they happened.
        eprintln!(
            "Converted {}/{} images in {}ms  →  {}",
            output.stats.converted,
            output.stats.discovered,
            output.stats.duration_ms,
            output.dest_dir.display()
        );
        if output.stats.skipped > 0 {
            eprintln!("  {} skipped (output exists)", output.stats.skipped);
        }
        if output.stats.failed > 0 {
            eprintln!("  {} failed", output.stats.failed);
        }
    } else if !cli.quiet {
        eprintln!(
            "   {}  {}",
            dim("PDFs written to"),
            bold(&output.dest_dir.display().to_string())
        );
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .language(&cli.language)
        .fallback_dpi(cli.dpi)
        .cleanup_tool(&cli.cleanup_tool)
        .ocr_tool(&cli.ocr_tool)
        .output_policy(cli.on_existing.into())
        .sort_inputs(!cli.no_sort);

    if let Some(secs) = cli.tool_timeout {
        builder = builder.tool_timeout_secs(secs);
    }
    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

/// Take directories from flags, prompting on stderr for whichever is missing.
fn obtain_directories(cli: &Cli) -> Result<ResolvedDirs> {
    match (&cli.source, &cli.dest) {
        (None, None) => {
            let stdin = io::stdin();
            let mut reader = stdin.lock();
            let mut prompt_out = io::stderr();
            Ok(prompt_directories(&mut reader, &mut prompt_out)?)
        }
        (source, dest) => {
            let source = match source {
                Some(p) => resolve_source(p)?,
                None => resolve_source(ask("Enter the source directory containing images: ")?)?,
            };
            let dest = match dest {
                Some(p) => resolve_destination(p)?,
                None => resolve_destination(ask("Enter the destination directory for PDFs: ")?)?,
            };
            Ok(ResolvedDirs { source, dest })
        }
    }
}

fn ask(prompt: &str) -> Result<PathBuf> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let line = prompt_line(&mut reader, &mut io::stderr(), prompt).context("Failed to read input")?;
    Ok(PathBuf::from(line))
}
