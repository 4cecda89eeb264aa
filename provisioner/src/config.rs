use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but failed validation
    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Configuration for the provisioner.
///
/// Passed explicitly to [`crate::Provisioner::new`]; there is no ambient
/// process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Root directory under which environments are created
    pub root_dir: PathBuf,
    /// Interpreter used to create environments; discovered on PATH if unset
    pub python: Option<PathBuf>,
    /// Target Python version, informational only and never enforced
    pub python_version: String,
    /// Verbosity flag
    pub verbose: bool,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./venvs"),
            python: None,
            python_version: "3.11".to_string(),
            verbose: false,
        }
    }
}

impl ProvisionerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = Some(python.into());
        self
    }

    pub fn with_python_version(mut self, version: impl Into<String>) -> Self {
        self.python_version = version.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.root_dir.as_os_str().is_empty() {
            return Err("Root directory cannot be empty".to_string());
        }

        if self.python_version.is_empty() {
            return Err("Python version cannot be empty".to_string());
        }

        if !self.python_version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(format!(
                "Python version must start with a digit, got '{}'",
                self.python_version
            ));
        }

        if let Some(python) = &self.python {
            if python.as_os_str().is_empty() {
                return Err("Interpreter path cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config
            .validate()
            .map_err(|reason| ConfigError::Invalid { reason })?;
        Ok(config)
    }
}
