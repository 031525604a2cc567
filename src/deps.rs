//! Dependency ensurer: make sure the external tools exist before a batch.
//!
//! Each [`ToolRequirement`] pairs a binary looked up on `PATH` with the
//! system package that provides it. A missing binary triggers one index
//! refresh (failure tolerated) and one install attempt through a
//! [`PackageInstaller`]; a failed install is fatal and the error names the
//! manual remedy.
//!
//! Installation is blocking and may prompt for a `sudo` password, so the
//! package manager inherits the terminal. Async callers should wrap
//! [`ensure_dependencies`] in `tokio::task::block_in_place`.

use crate::error::{InstallError, Scan2PdfError};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

/// An external binary and the package that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequirement {
    pub binary: String,
    pub package: String,
}

impl ToolRequirement {
    pub fn new(binary: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            package: package.into(),
        }
    }
}

/// Installs system packages. Implemented by [`SystemPackageManager`]; tests
/// substitute their own.
pub trait PackageInstaller: Send + Sync {
    /// Short name used in diagnostics, e.g. `apt-get`.
    fn manager(&self) -> &str;

    /// Refresh the package index. Callers treat failure as non-fatal.
    fn refresh_index(&self) -> Result<(), InstallError>;

    /// Install a single package.
    fn install(&self, package: &str) -> Result<(), InstallError>;
}

/// Runs a real package manager, optionally through an elevation wrapper.
#[derive(Debug, Clone)]
pub struct SystemPackageManager {
    program: String,
    elevate_with: Option<String>,
    refresh_args: Vec<String>,
    install_args: Vec<String>,
}

impl SystemPackageManager {
    /// A package manager invoked as `<program> <refresh_args>` and
    /// `<program> <install_args> <package>`.
    pub fn new<I, J, S, T>(program: impl Into<String>, refresh_args: I, install_args: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            program: program.into(),
            elevate_with: None,
            refresh_args: refresh_args.into_iter().map(Into::into).collect(),
            install_args: install_args.into_iter().map(Into::into).collect(),
        }
    }

    /// `sudo apt-get update` / `sudo apt-get install -y <package>`.
    pub fn apt() -> Self {
        Self::new("apt-get", ["update"], ["install", "-y"]).elevate_with("sudo")
    }

    /// Prefix every command with `wrapper` (usually `sudo`).
    pub fn elevate_with(mut self, wrapper: impl Into<String>) -> Self {
        self.elevate_with = Some(wrapper.into());
        self
    }

    /// Run the package manager directly, e.g. when already root.
    pub fn without_elevation(mut self) -> Self {
        self.elevate_with = None;
        self
    }

    fn run(&self, args: &[&str]) -> Result<(), InstallError> {
        let mut argv: Vec<&str> = Vec::with_capacity(args.len() + 2);
        if let Some(ref wrapper) = self.elevate_with {
            argv.push(wrapper);
        }
        argv.push(&self.program);
        argv.extend_from_slice(args);

        let command_line = argv.join(" ");
        debug!("Running: {}", command_line);

        let status = Command::new(argv[0])
            .args(&argv[1..])
            .status()
            .map_err(|e| InstallError::Spawn {
                program: argv[0].to_string(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(InstallError::ExitStatus {
                command: command_line,
                status: status.to_string(),
            })
        }
    }
}

impl PackageInstaller for SystemPackageManager {
    fn manager(&self) -> &str {
        &self.program
    }

    fn refresh_index(&self) -> Result<(), InstallError> {
        let args: Vec<&str> = self.refresh_args.iter().map(String::as_str).collect();
        self.run(&args)
    }

    fn install(&self, package: &str) -> Result<(), InstallError> {
        let mut args: Vec<&str> = self.install_args.iter().map(String::as_str).collect();
        args.push(package);
        self.run(&args)
    }
}

/// Options for [`ensure_dependencies`].
#[derive(Debug, Clone)]
pub struct EnsureOptions {
    /// Try to install absent tools. When false an absent tool is fatal. Default: true.
    pub install_missing: bool,
    /// Search this `PATH`-style list instead of the process `PATH`.
    pub search_path: Option<OsString>,
}

impl Default for EnsureOptions {
    fn default() -> Self {
        Self {
            install_missing: true,
            search_path: None,
        }
    }
}

/// Find `binary` on the search path. Paths containing a separator are
/// checked as-is.
pub fn locate_tool(binary: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    match search_path {
        Some(paths) => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            which::which_in(binary, Some(paths), cwd).ok()
        }
        None => which::which(binary).ok(),
    }
}

/// Ensure a single tool is available, installing it if allowed.
///
/// Returns the resolved path of the binary.
pub fn ensure_tool(
    requirement: &ToolRequirement,
    installer: &dyn PackageInstaller,
    options: &EnsureOptions,
) -> Result<PathBuf, Scan2PdfError> {
    if let Some(path) = locate_tool(&requirement.binary, options.search_path.as_ref()) {
        debug!("Found {} at {}", requirement.binary, path.display());
        return Ok(path);
    }

    let missing = || Scan2PdfError::MissingTool {
        tool: requirement.binary.clone(),
        package: requirement.package.clone(),
    };

    if !options.install_missing {
        return Err(missing());
    }

    warn!(
        "{} not found; installing package '{}' with {}",
        requirement.binary,
        requirement.package,
        installer.manager()
    );

    if let Err(e) = installer.refresh_index() {
        warn!("Package index refresh failed (continuing): {}", e);
    }

    installer
        .install(&requirement.package)
        .map_err(|e| Scan2PdfError::InstallFailed {
            package: requirement.package.clone(),
            manager: installer.manager().to_string(),
            detail: e.to_string(),
        })?;

    let path = locate_tool(&requirement.binary, options.search_path.as_ref()).ok_or_else(missing)?;
    info!("Installed {} ({})", requirement.binary, path.display());
    Ok(path)
}

/// Ensure every requirement in order, stopping at the first failure.
pub fn ensure_dependencies(
    requirements: &[ToolRequirement],
    installer: &dyn PackageInstaller,
    options: &EnsureOptions,
) -> Result<Vec<PathBuf>, Scan2PdfError> {
    requirements
        .iter()
        .map(|req| ensure_tool(req, installer, options))
        .collect()
}
