use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Output directory is not a directory: {path}")]
    NotADirectory { path: String },

    #[error(transparent)]
    Upscale(#[from] esrgup::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
