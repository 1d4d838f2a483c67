// Hostname utilities

use anyhow::{Context, Result};

/// Get the current hostname from the system
pub fn get_current_hostname() -> Result<String> {
    whoami::fallible::hostname().context("Failed to get hostname")
}

/// Compare two hostnames exactly, ignoring surrounding whitespace
pub fn hostnames_match(expected: &str, actual: &str) -> bool {
    expected.trim() == actual.trim()
}
