use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Interpreter commands probed in order of preference.
const INTERPRETER_CANDIDATES: [&str; 2] = ["python3", "python"];

/// Detect a usable Python interpreter on PATH.
///
/// Tries each candidate with `--version` and returns the first one that
/// exits successfully.
pub fn detect_interpreter() -> Option<PathBuf> {
    for candidate in INTERPRETER_CANDIDATES {
        if Command::new(candidate)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
        {
            return Some(PathBuf::from(candidate));
        }
    }

    None
}

/// Platform-conventional interpreter path inside an environment root.
///
/// Purely a path join; the file is not checked for existence here.
pub fn interpreter_path(env_root: &Path) -> PathBuf {
    if cfg!(windows) {
        env_root.join("Scripts").join("python.exe")
    } else {
        env_root.join("bin").join("python")
    }
}

/// Platform-conventional activation script inside an environment root.
///
/// The environment root is an explicit parameter; nothing here depends on
/// surrounding state.
pub fn activation_script(env_root: &Path) -> PathBuf {
    if cfg!(windows) {
        env_root.join("Scripts").join("Activate.ps1")
    } else {
        env_root.join("bin").join("activate")
    }
}
