//! Environment lifecycle: create, locate, enumerate, and delete named
//! `venv` directories under a root directory.

use crate::python;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by environment lifecycle operations
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// No interpreter supplied and none found on PATH
    #[error("No Python interpreter found on PATH. Install Python 3 or pass an interpreter path explicitly.")]
    NoInterpreter,

    /// The `venv` invocation failed or could not be spawned
    #[error("Failed to create environment '{name}': {reason}")]
    CreationFailed { name: String, reason: String },

    /// Referenced environment does not exist
    #[error("Environment '{name}' not found")]
    NotFound { name: String },

    /// The environment directory exists but holds no interpreter
    #[error("No interpreter at '{path}'. The environment may be incomplete.")]
    InterpreterMissing { path: String },

    /// Recursive deletion failed, e.g. a file lock
    #[error("Failed to remove environment '{name}': {reason}")]
    RemovalFailed { name: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EnvironmentResult<T> = Result<T, EnvironmentError>;

/// Outcome of a create call
#[derive(Debug, Clone)]
pub struct CreatedEnvironment {
    /// Environment root directory
    pub path: PathBuf,
    /// True when the directory already existed and creation was skipped
    pub already_existed: bool,
}

/// One row of an environment listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentEntry {
    /// Directory name under the root
    pub name: String,
    /// Full path to the environment
    pub path: PathBuf,
    /// True iff the conventional interpreter path exists inside it
    pub valid: bool,
}

/// Create a named environment under `root`, creating `root` itself if absent.
///
/// Idempotent: if `root/name` already exists the call is a no-op that
/// returns the existing path flagged as pre-existing. Otherwise runs
/// `<interpreter> -m venv <root/name>`. A failed invocation leaves any
/// partial directory behind; [`list_environments`] reports such directories
/// as invalid.
pub fn create_environment(
    root: &Path,
    name: &str,
    interpreter: Option<&Path>,
) -> EnvironmentResult<CreatedEnvironment> {
    fs::create_dir_all(root)?;

    let env_path = root.join(name);
    if env_path.exists() {
        info!("Environment '{}' already exists at {}", name, env_path.display());
        return Ok(CreatedEnvironment {
            path: env_path,
            already_existed: true,
        });
    }

    let interpreter = match interpreter {
        Some(path) => path.to_path_buf(),
        None => python::detect_interpreter().ok_or(EnvironmentError::NoInterpreter)?,
    };

    debug!(
        "Creating environment '{}' with interpreter {}",
        name,
        interpreter.display()
    );

    let output = Command::new(&interpreter)
        .args(["-m", "venv"])
        .arg(&env_path)
        .output()
        .map_err(|e| EnvironmentError::CreationFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(EnvironmentError::CreationFailed {
            name: name.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    info!("Created environment: {}", env_path.display());
    Ok(CreatedEnvironment {
        path: env_path,
        already_existed: false,
    })
}

/// Resolve the interpreter inside an environment root.
///
/// A deterministic path join followed by an existence check; the interpreter
/// is not executed to confirm it runs.
pub fn locate_interpreter(env_root: &Path) -> EnvironmentResult<PathBuf> {
    let path = python::interpreter_path(env_root);
    if !path.exists() {
        return Err(EnvironmentError::InterpreterMissing {
            path: path.display().to_string(),
        });
    }
    Ok(path)
}

/// Enumerate environments under `root`, sorted by name.
///
/// An entry is valid iff the conventional interpreter path exists inside
/// it. A missing root yields an empty listing. Non-directory entries are
/// skipped.
pub fn list_environments(root: &Path) -> EnvironmentResult<Vec<EnvironmentEntry>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let valid = python::interpreter_path(&path).exists();
        entries.push(EnvironmentEntry { name, path, valid });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Delete a named environment recursively and unconditionally.
///
/// Returns [`EnvironmentError::NotFound`] without touching the filesystem
/// when the directory is absent.
pub fn remove_environment(root: &Path, name: &str) -> EnvironmentResult<()> {
    let env_path = root.join(name);
    if !env_path.exists() {
        return Err(EnvironmentError::NotFound {
            name: name.to_string(),
        });
    }

    fs::remove_dir_all(&env_path).map_err(|e| EnvironmentError::RemovalFailed {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    info!("Removed environment: {}", env_path.display());
    Ok(())
}
