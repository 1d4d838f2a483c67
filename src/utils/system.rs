use anyhow::Result;
use std::path::Path;

use crate::utils::hostname::get_current_hostname;

/// Host facts the net helpers depend on
pub trait SystemProbe {
    /// Hostname of the machine we are running on
    fn hostname(&self) -> Result<String>;

    /// Whether the current user may create files in `dir`
    fn is_writable(&self, dir: &Path) -> bool;
}

/// Probes the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSystem;

impl SystemProbe for LocalSystem {
    fn hostname(&self) -> Result<String> {
        get_current_hostname()
    }

    #[cfg(unix)]
    fn is_writable(&self, dir: &Path) -> bool {
        use nix::unistd::{AccessFlags, access};
        dir.is_dir() && access(dir, AccessFlags::W_OK).is_ok()
    }

    #[cfg(not(unix))]
    fn is_writable(&self, dir: &Path) -> bool {
        std::fs::metadata(dir)
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }
}
