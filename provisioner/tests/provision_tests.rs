//! End-to-end provisioning tests against tempfile roots.
//!
//! A stub interpreter script stands in for Python so that success and
//! failure paths are deterministic without a real installation. Unix-only:
//! the stub relies on shell scripts and execute permissions.

#![cfg(unix)]

use provisioner::{
    create_environment, list_environments, locate_interpreter, remove_environment,
    EnvironmentError, InstallError, Profile, ProvisionError, Provisioner, ProvisionerConfig,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write a stand-in interpreter. `-m venv <dir>` lays out the directory
/// skeleton and copies the stub in as the environment's interpreter;
/// `-m pip ...` exits with the given status.
fn stub_interpreter(dir: &Path, pip_exit: i32) -> PathBuf {
    let path = dir.join("python-stub");
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
    mkdir -p "$3/bin"
    cp "$0" "$3/bin/python"
    chmod +x "$3/bin/python"
    exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
    echo "pip stub failure" >&2
    exit {pip_exit}
fi
exit 0
"#
    );
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

#[test]
fn create_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 0);

    let first = create_environment(&root, "gdal-venv", Some(&python)).unwrap();
    assert_eq!(first.path, root.join("gdal-venv"));
    assert!(!first.already_existed);
    assert!(first.path.is_dir());

    let second = create_environment(&root, "gdal-venv", Some(&python)).unwrap();
    assert_eq!(second.path, first.path);
    assert!(second.already_existed);
}

#[test]
fn provision_writes_manifest_with_exact_package_list() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 0);

    let config = ProvisionerConfig::default()
        .with_root_dir(&root)
        .with_python(&python);
    let provisioner = Provisioner::new(config);

    let report = provisioner.provision(Profile::Gdal, None, None).unwrap();

    // Default name follows the profile
    assert_eq!(report.env_path, root.join("gdal-venv"));
    assert!(!report.already_existed);
    assert_eq!(report.interpreter, report.env_path.join("bin/python"));

    let manifest = report.manifest.expect("manifest should be written");
    assert_eq!(manifest, report.env_path.join("requirements-gdal.txt"));
    let contents = fs::read_to_string(&manifest).unwrap();
    assert_eq!(
        contents,
        "gdal\nrasterio\nfiona\nshapely\npyproj\ngeopandas\n"
    );
}

#[test]
fn provision_with_explicit_name() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 0);

    let provisioner = Provisioner::new(
        ProvisionerConfig::default()
            .with_root_dir(&root)
            .with_python(&python),
    );

    let report = provisioner
        .provision(Profile::Postgis, Some("db-env"), None)
        .unwrap();
    assert_eq!(report.env_path, root.join("db-env"));
    assert!(report
        .manifest
        .unwrap()
        .ends_with("requirements-postgis.txt"));
}

#[test]
fn provision_into_existing_environment_reports_it() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 0);

    create_environment(&root, "gdal-venv", Some(&python)).unwrap();

    let provisioner = Provisioner::new(
        ProvisionerConfig::default()
            .with_root_dir(&root)
            .with_python(&python),
    );
    let report = provisioner.provision(Profile::Gdal, None, None).unwrap();
    assert!(report.already_existed);
}

#[test]
fn failed_install_surfaces_install_error_and_skips_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 1);

    let provisioner = Provisioner::new(
        ProvisionerConfig::default()
            .with_root_dir(&root)
            .with_python(&python),
    );

    let result = provisioner.provision(Profile::Arcpy, None, None);
    match result {
        Err(ProvisionError::Install(InstallError::InstallFailed { reason })) => {
            assert!(reason.contains("pip stub failure"));
        }
        other => panic!("expected InstallFailed, got {:?}", other),
    }

    // The created directory is left behind, but no manifest exists
    let env_path = root.join("arcpy-venv");
    assert!(env_path.is_dir());
    assert!(!env_path.join("requirements-arcpy.txt").exists());
}

#[test]
fn failed_creation_surfaces_creation_error() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");

    let provisioner = Provisioner::new(
        ProvisionerConfig::default()
            .with_root_dir(&root)
            .with_python("/nonexistent/python"),
    );

    let result = provisioner.provision(Profile::Pyqgis, None, None);
    assert!(matches!(
        result,
        Err(ProvisionError::Environment(
            EnvironmentError::CreationFailed { .. }
        ))
    ));
}

#[test]
fn list_distinguishes_valid_and_invalid_environments() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");

    // "a" has the conventional interpreter path, "b" does not
    fs::create_dir_all(root.join("a/bin")).unwrap();
    fs::write(root.join("a/bin/python"), "").unwrap();
    fs::create_dir_all(root.join("b")).unwrap();

    let entries = list_environments(&root).unwrap();
    let summary: Vec<(&str, bool)> = entries
        .iter()
        .map(|e| (e.name.as_str(), e.valid))
        .collect();
    assert_eq!(summary, vec![("a", true), ("b", false)]);
}

#[test]
fn remove_deletes_environment_and_listing_forgets_it() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 0);

    create_environment(&root, "scratch", Some(&python)).unwrap();
    assert_eq!(list_environments(&root).unwrap().len(), 1);

    remove_environment(&root, "scratch").unwrap();
    assert!(!root.join("scratch").exists());
    assert!(list_environments(&root).unwrap().is_empty());
}

#[test]
fn remove_missing_environment_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    fs::create_dir_all(&root).unwrap();

    let result = remove_environment(&root, "ghost");
    assert!(matches!(result, Err(EnvironmentError::NotFound { .. })));
    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
}

#[test]
fn locate_interpreter_inside_created_environment() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("venvs");
    let python = stub_interpreter(tmp.path(), 0);

    let created = create_environment(&root, "env", Some(&python)).unwrap();
    let interpreter = locate_interpreter(&created.path).unwrap();
    assert_eq!(interpreter, created.path.join("bin/python"));
}
