// Relnet Library
// ssh, rsync and curl helpers for moving release artifacts between hosts

pub mod config;
pub mod net;
pub mod utils;

// Re-export commonly used items
pub use config::RelnetConfig;
pub use net::{CurlOptions, Net};
