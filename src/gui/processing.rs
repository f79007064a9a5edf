use super::models::EsrgupGui;
use crate::error::Error;
use crate::types::INPUT_EXTENSIONS;
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::time::Instant;
use tracing::{debug, error, info, trace};

fn show_dialog(level: MessageLevel, title: &str, description: &str) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

impl EsrgupGui {
    pub fn select_files(&mut self) {
        if let Some(paths) = rfd::FileDialog::new()
            .set_title("Select Images")
            .add_filter("Image files", &INPUT_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_files()
        {
            info!("Selected {} image(s)", paths.len());
            for path in &paths {
                trace!("Selected input: {:?}", path);
            }
            self.session.selection.set_files(paths);
        }
    }

    pub fn select_output_directory(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select Output Directory")
            .pick_folder()
        {
            info!("Selected output directory: {:?}", path);
            self.session.selection.set_output_dir(Some(path));
        }
    }

    pub fn clear_output_directory(&mut self) {
        self.session.selection.set_output_dir(None);
        debug!("Output directory cleared, saving next to each input");
    }

    pub fn start_upscaling(&mut self) {
        let selection = &self.session.selection;
        let count = selection.files().len();
        let params = selection.params;

        match self.session.start() {
            Ok(()) => {
                self.processing_start_time = Some(Instant::now());
                self.last_processing_duration = None;
                info!(
                    "--- Upscaling {} image(s): {} at {}x to {} ---",
                    count,
                    params.model().label(),
                    params.scale(),
                    params.format()
                );
            }
            Err(Error::AlreadyRunning) => {
                debug!("Processing already in progress, ignoring request");
                show_dialog(MessageLevel::Warning, "Warning", "Already processing images!");
            }
            Err(Error::NoFilesSelected) => {
                show_dialog(MessageLevel::Error, "Error", "Please select images first!");
            }
            Err(e) => {
                error!("Failed to start processing: {}", e);
                show_dialog(MessageLevel::Error, "Error", &e.to_string());
            }
        }
    }

    /// Drain the running batch. Called once per frame.
    pub fn poll_session(&mut self) {
        let outcome = self.session.poll();

        if self.processing_start_time.is_some() && !self.session.is_processing() {
            if let Some(start_time) = self.processing_start_time.take() {
                let duration = start_time.elapsed();
                self.last_processing_duration = Some(duration);
                info!("Processing completed in {:.2?}", duration);
            }
        }

        if let Some(outcome) = outcome {
            show_dialog(MessageLevel::Info, "Complete", &outcome.summary());
            // The dialog blocks; keep 100% visible for the full delay after it closes.
            self.session.schedule_progress_reset(Instant::now());
        }
    }
}
