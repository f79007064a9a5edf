//! High-level library API: build a runner for the installed upscaler, upscale a
//! list of files in one call, or open a [`Session`] for interactive use. Prefer
//! these entrypoints over wiring the `core` modules by hand.
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::core::params::UpscaleParams;
use crate::core::progress::{BatchEvent, ProgressSink};
use crate::core::runner::{BatchOutcome, BatchRunner, RunnerConfig};
use crate::core::selection::Selection;
use crate::core::session::{Session, SessionConfig};
use crate::error::Result;

/// Sink that forwards events to `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_event(&self, event: BatchEvent) {
        if let Some(status) = event.status_text() {
            debug!("{}", status);
        }
    }
}

/// Runner for the upscaler next to the running binary, or at `executable` when
/// given. Non-interactive callers get no progress animation.
pub fn runner_for(executable: Option<PathBuf>, animate: bool) -> Result<BatchRunner> {
    let config = match executable {
        Some(path) => RunnerConfig::new(path),
        None => RunnerConfig::installed()?,
    };
    let config = if animate {
        config
    } else {
        config.with_progress_tick(Duration::ZERO)
    };
    Ok(BatchRunner::with_process_runner(config))
}

/// Upscale `files` with the installed upscaler and wait for the result.
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use esrgup::{upscale_files, ModelId, OutputFormat, UpscaleParams};
///
/// fn main() -> esrgup::Result<()> {
///     let params = UpscaleParams::for_model(ModelId::RealesrganX4plus, OutputFormat::Png);
///     let outcome = upscale_files(vec![PathBuf::from("catA.jpg")], None, params)?;
///     println!("{}", outcome.summary());
///     Ok(())
/// }
/// ```
pub fn upscale_files(
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    params: UpscaleParams,
) -> Result<BatchOutcome> {
    let runner = runner_for(None, false)?;
    let selection = Selection::new(files, output_dir, params);
    runner.run(&selection, &TracingSink)
}

/// Interactive session bound to the installed upscaler.
pub fn installed_session() -> Result<Session> {
    Ok(Session::new(
        runner_for(None, true)?,
        SessionConfig::default(),
    ))
}
