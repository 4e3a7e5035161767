use thiserror::Error;

/// Main error type for MethodInsight operations
#[derive(Error, Debug)]
pub enum MethodInsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid method reference '{0}': expected Type#method or pkg.Type.method(Params)")]
    InvalidMethodRef(String),

    #[error("Entry method not found: {0}")]
    EntryNotFound(String),
}

pub type Result<T> = std::result::Result<T, MethodInsightError>;
