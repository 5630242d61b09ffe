// Frameworks layer: environment configuration and runtime bootstrap.

pub mod config;
pub mod runtime;

pub use runtime::{run_with_config, LoggingAudio, LoggingShell, NullCanvas};
