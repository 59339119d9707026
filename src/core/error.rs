use std::path::PathBuf;

use thiserror::Error;

/// Terminal failure of one scan invocation.
///
/// Results delivered before the failure stay delivered.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to load workspace {}: {message}", path.display())]
    WorkspaceLoad { path: PathBuf, message: String },
    #[error("Failed to load compilation unit {}: {message}", path.display())]
    UnitLoad { path: PathBuf, message: String },
    #[error("Failed to write scan result: {0}")]
    Sink(#[from] std::io::Error),
    #[error("Scan cancelled")]
    Cancelled,
}

impl ScanError {
    pub fn workspace_load(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        ScanError::WorkspaceLoad {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }
}
