use std::path::PathBuf;

use thiserror::Error;

use crate::results::AggregateError;

/// The main error type for orbit operations
#[derive(Debug, Error)]
pub enum OrbitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read workspace root {}: {source}", path.display())]
    RootTraversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{keyword} declaration not found in {}", path.display())]
    DeclarationNotFound { keyword: String, path: PathBuf },

    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Failed to run '{command}' in {location}: {source}")]
    ModuleCommand {
        command: String,
        location: String,
        #[source]
        source: Box<OrbitError>,
    },

    #[error("Failed to install {tool} after {attempts} attempts: {source}")]
    InstallExhausted {
        tool: String,
        attempts: u32,
        #[source]
        source: Box<OrbitError>,
    },

    #[error("Task error: {0}")]
    Task(String),

    #[error(transparent)]
    Modules(#[from] AggregateError),
}

/// Result type alias for orbit operations
pub type OrbitResult<T> = Result<T, OrbitError>;

/// Render a program and its arguments the way an operator would type them.
pub(crate) fn render_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
