use thiserror::Error;

/// Top-level error type for the Chronicle value model and settings.
#[derive(Error, Debug)]
pub enum ChronicleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
