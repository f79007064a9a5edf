use crate::core::runner::{BatchRunner, RunnerConfig, locate_executable};
use crate::core::session::{Session, SessionConfig};
use crate::gui::logging::{GuiLogLayer, LogEntry, level_name, level_visible};
use crate::runner_for;
use once_cell::sync::OnceCell;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

static LOGGING_INIT: OnceCell<()> = OnceCell::new();

pub fn init_gui_logging() {
    LOGGING_INIT.get_or_init(|| {
        let gui_layer = GuiLogLayer::new();

        // Keep windowing internals out of the log panel.
        let filter = EnvFilter::new("trace,eframe=info,egui=info,winit=info");

        let subscriber = Registry::default().with(gui_layer).with(filter);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

pub struct EsrgupGui {
    pub session: Session,

    pub min_log_level: Level,
    pub show_about: bool,

    pub processing_start_time: Option<Instant>,
    pub last_processing_duration: Option<Duration>,

    // Log messages for the log panel
    pub log_messages: Arc<Mutex<Vec<LogEntry>>>,
}

impl Default for EsrgupGui {
    fn default() -> Self {
        let runner = match runner_for(None, true) {
            Ok(runner) => runner,
            Err(e) => {
                tracing::warn!("Could not resolve the application folder: {}", e);
                BatchRunner::with_process_runner(RunnerConfig::new(locate_executable(Path::new(
                    ".",
                ))))
            }
        };
        Self::new(Session::new(runner, SessionConfig::default()))
    }
}

impl EsrgupGui {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            min_log_level: Level::INFO,
            show_about: false,
            processing_start_time: None,
            last_processing_duration: None,
            log_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.session.is_processing()
    }

    /// Back to the startup selection. Ignored while a batch runs.
    pub fn reset(&mut self) {
        if self.is_processing() {
            tracing::debug!("Reset ignored while processing");
            return;
        }
        self.session.selection = Default::default();
        self.last_processing_duration = None;
        tracing::info!("Selection reset to defaults");
    }

    pub fn generate_cli_command(&self) -> String {
        self.session.selection.to_cli_command()
    }

    /// Log file body for the entries visible under the current filter.
    pub fn format_logs(&self) -> Result<String, Box<dyn std::error::Error>> {
        let logs = self
            .log_messages
            .lock()
            .map_err(|e| format!("Failed to lock logs: {}", e))?;

        if logs.is_empty() {
            return Err("No logs to save".into());
        }

        let filtered: Vec<&LogEntry> = logs
            .iter()
            .filter(|entry| level_visible(self.min_log_level, entry.level))
            .collect();

        if filtered.is_empty() {
            return Err("No logs match the current filter level".into());
        }

        let filter_name = if self.min_log_level == Level::TRACE {
            "ALL"
        } else {
            level_name(self.min_log_level)
        };

        let mut content = String::new();
        content.push_str("=== ESRGUP Log File ===\n");
        content.push_str(&format!("Generated: {}\n", chrono::Utc::now().to_rfc3339()));
        content.push_str(&format!("Filter Level: {}\n", filter_name));
        content.push_str(&format!("Total Logs: {}\n", filtered.len()));
        content.push_str("======================\n\n");
        for entry in &filtered {
            content.push_str(&entry.to_line());
            content.push('\n');
        }
        Ok(content)
    }

    pub fn save_logs_to_file(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = self.format_logs()?;

        if let Some(save_path) = rfd::FileDialog::new()
            .add_filter("Log files", &["log"])
            .set_file_name("esrgup_log.log")
            .save_file()
        {
            fs::write(&save_path, content)?;
            tracing::info!("Logs saved to: {:?}", save_path);
            Ok(())
        } else {
            Err("No save location selected".into())
        }
    }
}
