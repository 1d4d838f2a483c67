use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves the filesystem path of external binaries
pub trait ToolLocator {
    /// Find a tool, returning `None` if it is not available
    fn find_tool(&self, name: &str) -> Option<PathBuf>;

    /// Find a tool, failing if it is not available
    fn check_tool(&self, name: &str) -> Result<PathBuf> {
        self.find_tool(name)
            .ok_or_else(|| anyhow!("Required tool '{}' could not be found", name))
    }
}

/// Locates tools via configured overrides, then `PATH` (which crate)
#[derive(Debug, Clone, Default)]
pub struct PathTools {
    overrides: HashMap<String, PathBuf>,
}

impl PathTools {
    pub fn new(overrides: HashMap<String, PathBuf>) -> Self {
        Self { overrides }
    }
}

impl ToolLocator for PathTools {
    fn find_tool(&self, name: &str) -> Option<PathBuf> {
        if let Some(path) = self.overrides.get(name) {
            if path.is_file() {
                return Some(path.clone());
            }
            tracing::warn!(
                tool = name,
                path = %path.display(),
                "configured tool path does not exist, searching PATH"
            );
        }
        which::which(name).ok()
    }
}
