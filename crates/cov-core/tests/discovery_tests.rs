#![cfg(unix)]


use std::fs;

use cov_core::{discover_artifacts, CoreError};
use cov_domain::ArtifactFilter;
use test_support::touch;

#[test]
fn discovers_only_executable_prefix_matches() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "app-abc123", 0o755);
    touch(dir.path(), "app-abc123.d", 0o644);
    let filter = ArtifactFilter::new("app-").unwrap();

    let found = discover_artifacts(dir.path(), &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].base_name(), "app-abc123");
    assert!(found[0].is_executable());
}

#[test]
fn execute_bit_must_apply_to_current_user() {
    // sólo el grupo puede ejecutar; el dueño (nosotros) no
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "app-group-only", 0o010);
    touch(dir.path(), "app-no-exec", 0o644);
    let filter = ArtifactFilter::new("app-").unwrap();

    let found = discover_artifacts(dir.path(), &filter).unwrap();
    let names: Vec<&str> = found.iter().map(|a| a.base_name()).collect();
    // root ejecuta si cualquier bit x está activo; cualquier otro usuario no
    if nix::unistd::geteuid().is_root() {
        assert_eq!(names, vec!["app-group-only"]);
    } else {
        assert!(names.is_empty());
    }
}

#[test]
fn returns_n_matches_regardless_of_noise() {
    let dir = tempfile::tempdir().unwrap();
    for n in ["app-1", "app-2", "app-3"] {
        touch(dir.path(), n, 0o700);
    }
    // ruido: otro prefijo, no ejecutables, directorio con el prefijo
    touch(dir.path(), "lib-1", 0o755);
    touch(dir.path(), "app-4.d", 0o644);
    touch(dir.path(), "app-5.rlib", 0o600);
    fs::create_dir(dir.path().join("app-dir")).unwrap();
    let filter = ArtifactFilter::new("app-").unwrap();

    let found = discover_artifacts(dir.path(), &filter).unwrap();
    let names: Vec<&str> = found.iter().map(|a| a.base_name()).collect();
    assert_eq!(names, vec!["app-1", "app-2", "app-3"]);
}

#[test]
fn is_not_recursive() {
    let dir = tempfile::tempdir().unwrap();
    let deps = dir.path().join("deps");
    fs::create_dir(&deps).unwrap();
    touch(&deps, "app-nested", 0o755);
    let filter = ArtifactFilter::new("app-").unwrap();
    assert!(discover_artifacts(dir.path(), &filter).unwrap().is_empty());
}

#[test]
fn follows_symlinks_and_ignores_broken_ones() {
    let dir = tempfile::tempdir().unwrap();
    let target = touch(dir.path(), "real-bin", 0o755);
    std::os::unix::fs::symlink(&target, dir.path().join("app-link")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("app-broken")).unwrap();
    let filter = ArtifactFilter::new("app-").unwrap();

    let found = discover_artifacts(dir.path(), &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].base_name(), "app-link");
}

#[test]
fn empty_directory_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let filter = ArtifactFilter::new("app-").unwrap();
    assert!(discover_artifacts(dir.path(), &filter).unwrap().is_empty());
}

#[test]
fn missing_build_dir_is_a_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let filter = ArtifactFilter::new("app-").unwrap();
    let err = discover_artifacts(&dir.path().join("nope"), &filter).unwrap_err();
    assert!(matches!(err, CoreError::Discovery { .. }), "got {err:?}");
}
