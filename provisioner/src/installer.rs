//! Blocking `pip` invocations against an already-located interpreter.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

/// Installer toolchain upgraded before every install. Fresh environments
/// frequently ship a stale installer, so the upgrade always runs first.
pub const BOOTSTRAP_PACKAGES: [&str; 3] = ["pip", "setuptools", "wheel"];

/// Errors raised by package installation
#[derive(Error, Debug)]
pub enum InstallError {
    /// A pip invocation exited non-zero or could not be spawned
    #[error("Package installation failed: {reason}")]
    InstallFailed { reason: String },

    /// Requirements file does not exist
    #[error("Requirements file not found: {path}")]
    RequirementsNotFound { path: String },
}

pub type InstallResult<T> = Result<T, InstallError>;

/// What to install: a literal package list or a requirements file.
///
/// When a requirements path is set it takes precedence over the package
/// list.
#[derive(Debug, Clone, Default)]
pub struct InstallSpec {
    /// Package names forwarded to pip verbatim, in order
    pub packages: Vec<String>,
    /// Optional requirements file, installed with `pip install -r`
    pub requirements: Option<PathBuf>,
}

impl InstallSpec {
    pub fn packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            requirements: None,
        }
    }

    pub fn requirements(path: impl Into<PathBuf>) -> Self {
        Self {
            packages: Vec::new(),
            requirements: Some(path.into()),
        }
    }
}

/// Install packages into the environment owning `interpreter`.
///
/// Upgrades the bootstrap toolchain first, then installs the target list or
/// requirements file. Package names are not validated before submission;
/// malformed names surface as pip's own failure text. No retry, no rollback
/// of already-installed packages.
pub fn install(interpreter: &Path, spec: &InstallSpec) -> InstallResult<()> {
    if let Some(path) = &spec.requirements {
        if !path.exists() {
            return Err(InstallError::RequirementsNotFound {
                path: path.display().to_string(),
            });
        }
    }

    upgrade_bootstrap(interpreter)?;

    let mut cmd = Command::new(interpreter);
    cmd.args(["-m", "pip", "install"]);
    match &spec.requirements {
        Some(path) => {
            info!("Installing from requirements file: {}", path.display());
            cmd.arg("-r").arg(path);
        }
        None => {
            info!("Installing {} packages", spec.packages.len());
            cmd.args(&spec.packages);
        }
    }

    run_pip(cmd)
}

fn upgrade_bootstrap(interpreter: &Path) -> InstallResult<()> {
    debug!("Upgrading installer toolchain: {}", BOOTSTRAP_PACKAGES.join(", "));
    let mut cmd = Command::new(interpreter);
    cmd.args(["-m", "pip", "install", "--upgrade"]);
    cmd.args(BOOTSTRAP_PACKAGES);
    run_pip(cmd)
}

fn run_pip(mut cmd: Command) -> InstallResult<()> {
    let output = cmd.output().map_err(|e| InstallError::InstallFailed {
        reason: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(InstallError::InstallFailed {
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
