//! Cross-layer integration tests for Thoughts
//!
//! Tests that drive rule files, built-in commands, and the console through
//! the root crate.

mod commands;
mod console;
mod conversations;

use std::path::PathBuf;

/// Path of a rule file under `tests/integration/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("integration")
        .join("fixtures")
        .join(name)
}
