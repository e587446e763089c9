
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactotumError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Data corruption: {message}")]
    DataCorruption { message: String },
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Unknown sigil in token: {token}")]
    UnknownSigil { token: String },
    #[error("Unknown action: {action}")]
    ActionNotFound { action: String },
    #[error("Chooser failed: {0}")]
    Chooser(String),
    #[error("No such file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, FactotumError>;
