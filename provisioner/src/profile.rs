//! Fixed installation profiles and the provisioning pipeline.
//!
//! Each profile maps to a literal, ordered package list. Provisioning a
//! profile is the linear composition create -> locate interpreter ->
//! install -> write manifest; the first failing step short-circuits the
//! rest and surfaces that step's error kind.

use crate::config::ProvisionerConfig;
use crate::environment::{self, EnvironmentEntry, EnvironmentError};
use crate::installer::{self, InstallError, InstallSpec};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Companion packages for ArcPy work. ArcPy itself ships with ArcGIS Pro
/// and is not installable from PyPI.
pub const ARCPY_PACKAGES: &[&str] = &["numpy", "pandas", "matplotlib", "openpyxl", "jupyter"];

/// PyQGIS scripting stack.
pub const PYQGIS_PACKAGES: &[&str] = &["pyqt5", "numpy", "pandas", "matplotlib", "jupyter"];

/// GDAL/OGR raster and vector stack.
pub const GDAL_PACKAGES: &[&str] = &["gdal", "rasterio", "fiona", "shapely", "pyproj", "geopandas"];

/// PostGIS database access stack.
pub const POSTGIS_PACKAGES: &[&str] = &["psycopg2-binary", "sqlalchemy", "geoalchemy2", "geopandas"];

/// Superset of the four toolchain profiles plus analysis and formatting
/// extras.
pub const COMPREHENSIVE_PACKAGES: &[&str] = &[
    "numpy",
    "pandas",
    "matplotlib",
    "openpyxl",
    "jupyter",
    "pyqt5",
    "gdal",
    "rasterio",
    "fiona",
    "shapely",
    "pyproj",
    "geopandas",
    "psycopg2-binary",
    "sqlalchemy",
    "geoalchemy2",
    "folium",
    "contextily",
    "black",
    "flake8",
    "pytest",
];

/// The five fixed provisioning profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// ArcPy companion packages
    Arcpy,
    /// PyQGIS scripting
    Pyqgis,
    /// GDAL/OGR raster and vector processing
    Gdal,
    /// PostGIS database access
    Postgis,
    /// Everything above plus analysis and formatting tools
    Comprehensive,
}

impl Profile {
    pub fn all() -> [Profile; 5] {
        [
            Profile::Arcpy,
            Profile::Pyqgis,
            Profile::Gdal,
            Profile::Postgis,
            Profile::Comprehensive,
        ]
    }

    /// The profile's fixed package list, in install order.
    pub fn packages(&self) -> &'static [&'static str] {
        match self {
            Profile::Arcpy => ARCPY_PACKAGES,
            Profile::Pyqgis => PYQGIS_PACKAGES,
            Profile::Gdal => GDAL_PACKAGES,
            Profile::Postgis => POSTGIS_PACKAGES,
            Profile::Comprehensive => COMPREHENSIVE_PACKAGES,
        }
    }

    /// Default environment name when the caller does not supply one.
    pub fn default_env_name(&self) -> String {
        format!("{}-venv", self)
    }

    /// Manifest file name written into the environment root.
    pub fn manifest_filename(&self) -> String {
        format!("requirements-{}.txt", self)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Arcpy => write!(f, "arcpy"),
            Profile::Pyqgis => write!(f, "pyqgis"),
            Profile::Gdal => write!(f, "gdal"),
            Profile::Postgis => write!(f, "postgis"),
            Profile::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

/// Error for unrecognized profile names
#[derive(Error, Debug)]
#[error("Unknown profile '{name}'. Expected one of: arcpy, pyqgis, gdal, postgis, comprehensive")]
pub struct ParseProfileError {
    pub name: String,
}

impl FromStr for Profile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arcpy" => Ok(Profile::Arcpy),
            "pyqgis" => Ok(Profile::Pyqgis),
            "gdal" => Ok(Profile::Gdal),
            "postgis" => Ok(Profile::Postgis),
            "comprehensive" => Ok(Profile::Comprehensive),
            _ => Err(ParseProfileError {
                name: s.to_string(),
            }),
        }
    }
}

/// Errors raised by the provisioning pipeline
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Environment lifecycle step failed
    #[error("Environment operation failed: {0}")]
    Environment(#[from] EnvironmentError),

    /// Package installation step failed
    #[error("Install operation failed: {0}")]
    Install(#[from] InstallError),
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Outcome of a successful provisioning run
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    /// Profile that was installed
    pub profile: Profile,
    /// Environment root directory
    pub env_path: PathBuf,
    /// Interpreter inside the environment
    pub interpreter: PathBuf,
    /// Manifest path, or None when the manifest write failed
    pub manifest: Option<PathBuf>,
    /// True when the environment directory pre-existed
    pub already_existed: bool,
}

/// Orchestrates environment creation and profile installation.
///
/// Holds its configuration explicitly; nothing is read from process-wide
/// state. Stateless across invocations and strictly sequential: one
/// provisioning run at a time per environment name is assumed, with no
/// locking against concurrent callers.
pub struct Provisioner {
    config: ProvisionerConfig,
}

impl Provisioner {
    pub fn new(config: ProvisionerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Provision a profile: create the environment (idempotently), locate
    /// its interpreter, install the profile's package list, and write the
    /// manifest.
    ///
    /// A manifest write failure is logged and reported as `manifest: None`
    /// in the returned report; it does not revert the completed
    /// installation. Any earlier step's failure short-circuits the
    /// remainder. A failed install leaves the created directory behind;
    /// `list` shows it as invalid until it is removed or re-provisioned.
    pub fn provision(
        &self,
        profile: Profile,
        name: Option<&str>,
        interpreter: Option<&Path>,
    ) -> ProvisionResult<ProvisionReport> {
        let env_name = name
            .map(str::to_owned)
            .unwrap_or_else(|| profile.default_env_name());

        info!("Provisioning profile '{}' into '{}'", profile, env_name);

        let base_interpreter = interpreter
            .map(Path::to_path_buf)
            .or_else(|| self.config.python.clone());

        let created =
            environment::create_environment(&self.config.root_dir, &env_name, base_interpreter.as_deref())?;

        let env_python = environment::locate_interpreter(&created.path)?;

        let spec = InstallSpec::packages(profile.packages().iter().copied());
        installer::install(&env_python, &spec)?;

        let manifest = match write_manifest(&created.path, profile) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to write manifest for '{}': {}", env_name, e);
                None
            }
        };

        info!("Profile '{}' installed into {}", profile, created.path.display());
        Ok(ProvisionReport {
            profile,
            env_path: created.path,
            interpreter: env_python,
            manifest,
            already_existed: created.already_existed,
        })
    }

    /// Enumerate environments under the configured root.
    pub fn list(&self) -> ProvisionResult<Vec<EnvironmentEntry>> {
        Ok(environment::list_environments(&self.config.root_dir)?)
    }

    /// Delete a named environment under the configured root.
    pub fn remove(&self, name: &str) -> ProvisionResult<()> {
        Ok(environment::remove_environment(&self.config.root_dir, name)?)
    }
}

/// Write a profile's package list, one name per line in install order and
/// with no header, to `requirements-<profile>.txt` in the environment root.
pub fn write_manifest(env_root: &Path, profile: Profile) -> std::io::Result<PathBuf> {
    let path = env_root.join(profile.manifest_filename());
    let mut contents = profile.packages().join("\n");
    contents.push('\n');
    fs::write(&path, contents)?;
    Ok(path)
}
