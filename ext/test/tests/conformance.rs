//! Conformance tests that run YAML fixtures against callmatch
//!
//! Run with: cargo test -p callmatch-test --test conformance --features callmatch-test/fixtures

#![cfg(feature = "fixtures")]

use callmatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The `conformance/` directory at the workspace root.
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");

    // Go up: ext/test -> ext -> workspace root
    Path::new(manifest_dir)
        .parent()
        .and_then(Path::parent)
        .expect("Could not find workspace root")
        .join("conformance")
}

/// Load and run every fixture document in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_exact_match() {
    run_fixture_file("01_exact.yaml");
}

#[test]
fn test_optional() {
    run_fixture_file("02_optional.yaml");
}

#[test]
fn test_patterns() {
    run_fixture_file("03_patterns.yaml");
}

#[test]
fn test_deep_paths() {
    run_fixture_file("04_deep.yaml");
}

#[test]
fn test_greedy_pairing() {
    run_fixture_file("05_greedy.yaml");
}

#[test]
fn test_inputs() {
    run_fixture_file("06_inputs.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_exact.yaml",
            "02_optional.yaml",
            "03_patterns.yaml",
            "04_deep.yaml",
            "05_greedy.yaml",
            "06_inputs.yaml",
        ]
    );
}
