// Utils module - tool lookup, command execution and host probes
pub mod exec;
pub mod hostname;
pub mod http;
pub mod string;
pub mod system;
pub mod tool;

// Re-export commonly used utilities
pub use exec::{CapturedOutput, CommandRunner, ShellRunner};
pub use http::{HttpFetcher, UriFetcher};
pub use system::{LocalSystem, SystemProbe};
pub use tool::{PathTools, ToolLocator};
