//! Architectural Enforcement Integration Tests
//!
//! This package scans the workspace sources and enforces architectural
//! principles:
//! - No blocking `std::thread::sleep` in production code
//! - No `unwrap()` / `expect()` outside tests
//! - The core library never prints; it logs through `tracing`
//! - The core library stays free of subscriber and platform dependencies
//!
//! These tests are designed to catch violations early in the development cycle.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One offending source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files under `dir`
pub fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|entry| entry.into_path())
        .collect()
}

/// The part of a file before its `#[cfg(test)]` module
pub fn production_part(source: &str) -> &str {
    match source.find("#[cfg(test)]") {
        Some(index) => &source[..index],
        None => source,
    }
}

/// Lines of production code (comments skipped) containing any of `needles`
pub fn find_in_production(files: &[PathBuf], needles: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in files {
        let Ok(source) = fs::read_to_string(path) else {
            continue;
        };
        for (index, line) in production_part(&source).lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if needles.iter().any(|needle| trimmed.contains(needle)) {
                violations.push(Violation {
                    path: path.clone(),
                    line: index + 1,
                    text: trimmed.to_string(),
                });
            }
        }
    }
    violations
}

/// Render violations one per line for assertion messages
pub fn report(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
