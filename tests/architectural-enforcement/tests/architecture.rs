//! Workspace-wide architecture checks

use std::fs;

use architectural_enforcement::{find_in_production, report, rust_sources, workspace_root};

fn core_sources() -> Vec<std::path::PathBuf> {
    rust_sources(&workspace_root().join("engine").join("core").join("src"))
}

fn all_sources() -> Vec<std::path::PathBuf> {
    let root = workspace_root().join("engine");
    ["core", "console"]
        .iter()
        .flat_map(|krate| rust_sources(&root.join(krate).join("src")))
        .collect()
}

#[test]
fn test_sources_are_found() {
    assert!(core_sources().len() >= 10, "core sources not found");
}

#[test]
fn test_no_blocking_sleep() {
    let violations = find_in_production(&all_sources(), &["std::thread::sleep", "thread::sleep("]);
    assert!(violations.is_empty(), "blocking sleep:\n{}", report(&violations));
}

#[test]
fn test_no_unwrap_outside_tests() {
    let violations = find_in_production(&all_sources(), &[".unwrap()", ".expect("]);
    assert!(violations.is_empty(), "unwrap/expect:\n{}", report(&violations));
}

#[test]
fn test_core_never_prints() {
    let violations = find_in_production(
        &core_sources(),
        &["println!", "print!(", "eprintln!", "eprint!(", "dbg!("],
    );
    assert!(violations.is_empty(), "printing in core:\n{}", report(&violations));
}

#[test]
fn test_core_has_no_subscriber_dependency() {
    let manifest = fs::read_to_string(workspace_root().join("engine/core/Cargo.toml"))
        .unwrap_or_default();
    assert!(!manifest.is_empty(), "core manifest not found");
    assert!(!manifest.contains("tracing-subscriber"));
    assert!(!manifest.contains("clap"));
}
