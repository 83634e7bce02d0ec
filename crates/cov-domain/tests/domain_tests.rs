use std::path::Path;

use cov_domain::{Artifact, ArtifactFilter, DomainError};

#[test]
fn test_filter_accepts_executable_with_prefix() {
    let filter = ArtifactFilter::new("app-").unwrap();
    let bin = Artifact::new("target/debug/app-abc123", true).unwrap();
    assert!(filter.accepts(&bin));
}

#[test]
fn test_filter_rejects_dependency_file() {
    // El .d comparte prefijo pero no es ejecutable
    let filter = ArtifactFilter::new("app-").unwrap();
    let dep = Artifact::new("target/debug/app-abc123.d", false).unwrap();
    assert!(filter.matches_name(dep.base_name()));
    assert!(!filter.accepts(&dep));
}

#[test]
fn test_filter_rejects_other_prefix() {
    let filter = ArtifactFilter::new("app-").unwrap();
    let other = Artifact::new("target/debug/lib-abc123", true).unwrap();
    assert!(!filter.accepts(&other));
}

#[test]
fn test_filter_rejects_empty_or_path_prefix() {
    assert!(matches!(ArtifactFilter::new(""), Err(DomainError::ValidationError(_))));
    assert!(matches!(ArtifactFilter::new("deps/app-"), Err(DomainError::ValidationError(_))));
}

#[test]
fn test_output_dir_is_derived_from_base_name() {
    let bin = Artifact::new("/work/target/debug/app-abc123", true).unwrap();
    let out = bin.output_dir(Path::new("target/cov"));
    assert_eq!(out.path(), Path::new("target/cov/app-abc123"));
    assert_eq!(out.root(), Path::new("target/cov"));
}

#[test]
fn test_artifact_requires_file_name() {
    let err = Artifact::new("/", true).unwrap_err();
    assert!(err.to_string().starts_with("Error de validación"));
}
