use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;
use tracing_subscriber::EnvFilter;

use esrgup::core::selection::display_name;
use esrgup::{BatchEvent, FileStatus, ProgressSink, Selection, runner_for};

use super::args::CliArgs;
use super::errors::AppError;

/// Prints one line per finished file to stderr so stdout stays clean for `--json`.
#[derive(Default)]
struct ConsoleSink {
    total: AtomicUsize,
    done: AtomicUsize,
}

impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: BatchEvent) {
        match event {
            BatchEvent::Started { total } => self.total.store(total, Ordering::Relaxed),
            BatchEvent::FileFinished(file) => {
                let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
                let total = self.total.load(Ordering::Relaxed);
                match &file.status {
                    FileStatus::Succeeded => {
                        eprintln!("[{done}/{total}] {} -> {}", display_name(&file.input), file.output.display())
                    }
                    FileStatus::Failed { reason, .. } => {
                        eprintln!("[{done}/{total}] {} failed: {reason}", display_name(&file.input))
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let params = args.params().map_err(AppError::from)?;

    if args.inputs.is_empty() {
        return Err(AppError::from(esrgup::Error::NoFilesSelected).into());
    }

    if let Some(output_dir) = &args.output_dir {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(AppError::NotADirectory {
                path: output_dir.display().to_string(),
            }
            .into());
        }
        fs::create_dir_all(output_dir).map_err(AppError::from)?;
        info!("Output directory: {:?}", output_dir);
    }

    let runner = runner_for(args.upscaler.clone(), false).map_err(AppError::from)?;
    info!("Using upscaler: {:?}", runner.config().executable);

    let selection = Selection::new(args.inputs.clone(), args.output_dir.clone(), params);
    let sink = ConsoleSink::default();
    let outcome = runner.run(&selection, &sink).map_err(AppError::from)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.summary());
    }

    Ok(())
}
