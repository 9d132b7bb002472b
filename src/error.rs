//! Error types shared by every compilation stage

use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems detected before any XML is emitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid version string '{value}' in {context}")]
    InvalidVersion { context: String, value: String },

    #[error("Unknown symbolic folder '{0}'")]
    UnknownFolder(String),

    #[error(
        "Managed actions backed by '{assembly}' reference different assembly sets; \
         every action using the same assembly must declare identical references"
    )]
    InconsistentManagedAction { assembly: String },

    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("Feature '{0}' is declared more than once")]
    DuplicateFeature(String),

    #[error("Unknown language '{0}'")]
    UnknownLanguage(String),
}

#[derive(Error, Debug)]
pub enum WixError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid project structure: {0}")]
    Structure(String),

    #[error("WiX tool not found: {tool}. Install from https://wixtoolset.org/ or set WIX_BIN_DIR")]
    ToolNotFound { tool: String },

    #[error("Command failed: {command}\n{output}")]
    ToolFailed { command: String, output: String },

    #[error("Command did not produce {}: {command}", path.display())]
    MissingOutput { command: String, path: PathBuf },

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WixError>;
