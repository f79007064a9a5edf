use super::models::EsrgupGui;
use crate::gui::logging::LogEntry;
use crate::types::{ModelId, OutputFormat};
use eframe::egui::{Align, Color32, ComboBox, Frame, Layout, ProgressBar, RichText, Ui};

const COMPONENT_HEIGHT: f32 = 80.0;
const COMPONENT_WIDTH: f32 = 120.0;

const ACCENT: Color32 = Color32::from_rgb(255, 165, 0);
const MUTED: Color32 = Color32::from_gray(120);

pub struct FileSelectionComponent;

impl FileSelectionComponent {
    pub fn render(ui: &mut Ui, app: &mut EsrgupGui) {
        ui.heading("Images");

        Frame::NONE.inner_margin(0.0).show(ui, |ui| {
            ui.set_min_height(COMPONENT_HEIGHT);
            ui.set_min_width(COMPONENT_WIDTH);

            ui.horizontal(|ui| {
                ui.label("Input Images:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Browse").clicked() {
                        app.select_files();
                    }
                });
            });

            let selection = &app.session.selection;
            let color = if selection.is_empty() { MUTED } else { ACCENT };
            ui.label(RichText::new(selection.files_summary()).color(color));
        });
    }
}

pub struct OutputLocationComponent;

impl OutputLocationComponent {
    pub fn render(ui: &mut Ui, app: &mut EsrgupGui) {
        ui.heading("Output");

        Frame::NONE.inner_margin(0.0).show(ui, |ui| {
            ui.set_min_height(COMPONENT_HEIGHT * 0.6);
            ui.set_min_width(COMPONENT_WIDTH);

            ui.horizontal(|ui| {
                ui.label("Output Directory:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Browse").clicked() {
                        app.select_output_directory();
                    }
                    if app.session.selection.output_dir().is_some()
                        && ui.button("Same as source").clicked()
                    {
                        app.clear_output_directory();
                    }
                });
            });

            let selection = &app.session.selection;
            let color = if selection.output_dir().is_some() {
                ACCENT
            } else {
                MUTED
            };
            ui.label(RichText::new(selection.output_summary()).color(color));
        });
    }
}

pub struct UpscaleSettingsComponent;

impl UpscaleSettingsComponent {
    pub fn render(ui: &mut Ui, app: &mut EsrgupGui) {
        ui.heading("Upscale Settings");

        Frame::NONE.inner_margin(0.0).show(ui, |ui| {
            ui.set_min_width(COMPONENT_WIDTH);

            let current = app.session.selection.params;

            ui.horizontal(|ui| {
                ui.label("Model:");
                let mut model = current.model();
                ComboBox::from_id_salt("model")
                    .selected_text(model.label())
                    .show_ui(ui, |ui| {
                        for option in ModelId::ALL {
                            ui.selectable_value(&mut model, option, option.label());
                        }
                    });
                if model != current.model() {
                    app.session.selection.set_model(model);
                    tracing::debug!(
                        "Model set to {}, scale now {}x",
                        model,
                        app.session.selection.params.scale()
                    );
                }
            });

            // Offer only the factors the active model accepts.
            let params = app.session.selection.params;
            ui.horizontal(|ui| {
                ui.label("Scale:");
                let mut scale = params.scale();
                ComboBox::from_id_salt("scale")
                    .selected_text(format!("{}x", scale))
                    .show_ui(ui, |ui| {
                        for &option in params.model().scales() {
                            ui.selectable_value(&mut scale, option, format!("{}x", option));
                        }
                    });
                if scale != params.scale() {
                    if let Err(e) = app.session.selection.params.set_scale(scale) {
                        tracing::warn!("{}", e);
                    }
                }
            });

            ui.horizontal(|ui| {
                ui.label("Format:");
                let mut format = params.format();
                ComboBox::from_id_salt("format")
                    .selected_text(format.extension().to_uppercase())
                    .show_ui(ui, |ui| {
                        for option in OutputFormat::ALL {
                            ui.selectable_value(
                                &mut format,
                                option,
                                option.extension().to_uppercase(),
                            );
                        }
                    });
                if format != params.format() {
                    app.session.selection.params.set_format(format);
                    tracing::debug!("Output format set to {}", format);
                }
            });
        });
    }
}

pub struct ProgressComponent;

impl ProgressComponent {
    pub fn render(ui: &mut Ui, app: &EsrgupGui) {
        let progress = app.session.progress();
        ui.add(ProgressBar::new(progress.fraction()).show_percentage());
        ui.label(RichText::new(progress.status()).color(Color32::from_gray(200)));
    }
}

pub struct FooterComponent;

impl FooterComponent {
    pub fn render(ui: &mut Ui, app: &mut EsrgupGui) {
        ui.horizontal(|ui| {
            let processing = app.is_processing();
            let status_color = if processing {
                ACCENT
            } else {
                Color32::from_rgb(100, 200, 100)
            };

            let timing_text = if processing {
                if let Some(start_time) = app.processing_start_time {
                    format!("Processing: {:.2?}", start_time.elapsed())
                } else {
                    "Processing...".to_string()
                }
            } else if let Some(duration) = app.last_processing_duration {
                format!("Last run: {:.2?}", duration)
            } else {
                "Ready".to_string()
            };

            ui.label(RichText::new(timing_text).color(status_color).size(14.0));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("To CLI").clicked() {
                    let cli_entry = LogEntry::new(
                        tracing::Level::INFO,
                        format!("CLI Command: {}", app.generate_cli_command()),
                        "cli".to_string(),
                    );
                    if let Ok(mut logs) = app.log_messages.lock() {
                        logs.push(cli_entry);
                    }
                }

                if ui.button("Save Logs").clicked() {
                    if let Err(e) = app.save_logs_to_file() {
                        tracing::error!("Failed to save logs: {}", e);
                    }
                }

                if ui.button("Clear Logs").clicked() {
                    if let Ok(mut logs) = app.log_messages.lock() {
                        logs.clear();
                    }
                }

                ui.add_enabled_ui(!processing, |ui| {
                    if ui.button("Reset").clicked() {
                        app.reset();
                    }
                });
            });
        });
    }
}
