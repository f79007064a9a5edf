//! Crate-level error type and `Result` alias.
//! Covers the batch preconditions (empty selection, single-flight), the per-file
//! failures recorded by the runner, and catalog/selection validation.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ModelId, ScaleFactor};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No images selected")]
    NoFilesSelected,

    #[error("A batch is already running")]
    AlreadyRunning,

    #[error("Upscaler executable not found at: {}", path.display())]
    MissingExecutable { path: PathBuf },

    #[error("Upscaler exited with {}: {stderr}", exit_label(*code))]
    ExternalProcessFailure { code: Option<i32>, stderr: String },

    #[error("Failed to launch upscaler: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Unknown model: {id}")]
    UnknownModel { id: String },

    #[error("Scale {scale}x is not supported by model {model}")]
    UnsupportedScale { model: ModelId, scale: ScaleFactor },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Coarse classification of a per-file failure, kept in batch reports.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingExecutable,
    ExternalProcessFailure,
}

impl Error {
    /// Per-file classification. Anything but a missing executable failed at the
    /// process boundary.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::MissingExecutable { .. } => FailureKind::MissingExecutable,
            _ => FailureKind::ExternalProcessFailure,
        }
    }
}
