//! Environment provisioning for geospatial Python toolchains.
//!
//! This crate creates isolated `venv` directories under a configured root,
//! installs fixed, profile-specific package lists into them via `pip`, and
//! records each install to a plain-text manifest. Profiles cover the common
//! geospatial stacks: ArcPy companions, PyQGIS, GDAL/OGR, PostGIS, and a
//! comprehensive superset.
//!
//! Everything here is synchronous and blocking: each operation is a sequence
//! of filesystem calls and external process invocations executed in order,
//! with the first failure short-circuiting the rest.

pub mod config;
pub mod environment;
pub mod installer;
pub mod profile;
pub mod python;

pub use config::{ConfigError, ProvisionerConfig};
pub use environment::{
    create_environment, list_environments, locate_interpreter, remove_environment,
    CreatedEnvironment, EnvironmentEntry, EnvironmentError, EnvironmentResult,
};
pub use installer::{install, InstallError, InstallResult, InstallSpec, BOOTSTRAP_PACKAGES};
pub use profile::{
    write_manifest, ParseProfileError, Profile, ProvisionError, ProvisionReport, ProvisionResult,
    Provisioner,
};
pub use python::{activation_script, detect_interpreter, interpreter_path};
