use super::components::*;
use super::models::EsrgupGui;
use crate::gui::logging::{LogEntry, MAX_LOG_ENTRIES, get_log_buffer, level_visible};
use eframe::egui;
use std::time::Duration;
use tracing::Level;

/// Redraw cadence while a batch runs or a progress reset is pending.
const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

fn format_log_entry(entry: &LogEntry) -> egui::RichText {
    if entry.message.starts_with("---") {
        return egui::RichText::new(&entry.message)
            .color(egui::Color32::from_rgb(255, 165, 0))
            .monospace()
            .strong();
    }

    if entry.target == "cli" {
        return egui::RichText::new(&entry.message)
            .color(egui::Color32::from_rgb(100, 255, 100))
            .monospace()
            .strong();
    }

    let (color, icon) = match entry.level {
        Level::ERROR => (egui::Color32::from_rgb(255, 100, 100), "❌"),
        Level::WARN => (egui::Color32::from_rgb(255, 200, 100), "⚠️"),
        Level::INFO => (egui::Color32::from_rgb(100, 200, 255), "ℹ️"),
        Level::DEBUG => (egui::Color32::from_rgb(150, 150, 150), "🔍"),
        Level::TRACE => (egui::Color32::from_rgb(100, 100, 100), "🔎"),
    };

    egui::RichText::new(format!(
        "[{}] {} {}: {}",
        entry.timestamp, icon, entry.level, entry.message
    ))
    .color(color)
    .monospace()
}

impl EsrgupGui {
    /// Move freshly captured log entries into the panel. Returns true if any arrived.
    fn drain_log_buffer(&mut self) -> bool {
        let mut new_messages = Vec::new();
        if let Ok(mut buf) = get_log_buffer().lock() {
            new_messages.extend(buf.drain(..));
        }
        if new_messages.is_empty() {
            return false;
        }
        if let Ok(mut logs) = self.log_messages.lock() {
            logs.extend(new_messages);
            let len = logs.len();
            if len > MAX_LOG_ENTRIES {
                logs.drain(0..(len - MAX_LOG_ENTRIES));
            }
        }
        true
    }

    fn render_about(&mut self, ctx: &egui::Context) {
        egui::Window::new("About ESRGUP")
            .open(&mut self.show_about)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("ESRGUP").size(24.0).strong());
                ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.add_space(8.0);
                ui.label("Batch image upscaling with realesrgan-ncnn-vulkan.");
                ui.label("Powered by Real-ESRGAN");
            });
    }

    fn render_log_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Log Output");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.selectable_value(&mut self.min_log_level, Level::ERROR, "ERROR");
                ui.selectable_value(&mut self.min_log_level, Level::WARN, "WARN");
                ui.selectable_value(&mut self.min_log_level, Level::INFO, "INFO");
                ui.selectable_value(&mut self.min_log_level, Level::DEBUG, "DEBUG");
                ui.selectable_value(&mut self.min_log_level, Level::TRACE, "ALL");
            });

            if let Ok(logs) = self.log_messages.lock() {
                let visible = logs
                    .iter()
                    .filter(|entry| level_visible(self.min_log_level, entry.level))
                    .count();
                if !logs.is_empty() {
                    ui.label(format!("({} visible / {} total)", visible, logs.len()));
                }
            }
        });

        ui.add_space(5.0);

        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 10.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if let Ok(logs) = self.log_messages.lock() {
                    if logs.is_empty() {
                        ui.centered_and_justified(|ui| {
                            ui.label(
                                egui::RichText::new("No log messages")
                                    .color(egui::Color32::from_gray(120)),
                            );
                        });
                    } else {
                        for entry in logs
                            .iter()
                            .filter(|entry| level_visible(self.min_log_level, entry.level))
                        {
                            ui.label(format_log_entry(entry));
                        }
                    }
                }
            });
    }
}

impl eframe::App for EsrgupGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(crate::gui::models::init_gui_logging);

        let mut style = (*ctx.style()).clone();
        style.visuals.override_text_color = Some(egui::Color32::from_gray(220));
        style.visuals.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(40, 40, 40);
        style.visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(50, 50, 50);
        style.visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(60, 60, 60);
        style.visuals.widgets.active.bg_fill = egui::Color32::from_rgb(70, 70, 70);
        style.visuals.panel_fill = egui::Color32::from_rgb(30, 30, 30);
        style.visuals.window_fill = egui::Color32::from_rgb(25, 25, 25);
        style.visuals.extreme_bg_color = egui::Color32::from_rgb(20, 20, 20);
        ctx.set_style(style);

        self.poll_session();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new("ESRGUP")
                                .size(42.0)
                                .color(egui::Color32::from_gray(220))
                                .strong(),
                        );
                        ui.label(
                            egui::RichText::new(format!("v{} ", env!("CARGO_PKG_VERSION")))
                                .size(10.0)
                                .color(egui::Color32::WHITE),
                        );
                    });
                    ui.label(
                        egui::RichText::new("REAL-ESRGAN BATCH IMAGE UPSCALER")
                            .size(12.0)
                            .color(egui::Color32::from_gray(220))
                            .strong(),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_enabled_ui(!self.is_processing(), |ui| {
                        if ui
                            .button(
                                egui::RichText::new("Upscale")
                                    .size(16.0)
                                    .color(egui::Color32::WHITE),
                            )
                            .clicked()
                        {
                            self.start_upscaling();
                        }
                    });
                    if ui.button("Info").clicked() {
                        self.show_about = true;
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            FooterComponent::render(ui, self);
        });

        egui::SidePanel::left("left_panel")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add_space(10.0);
                        let idle = !self.is_processing();
                        ui.add_enabled_ui(idle, |ui| {
                            FileSelectionComponent::render(ui, self);
                            ui.separator();
                            OutputLocationComponent::render(ui, self);
                            ui.separator();
                            UpscaleSettingsComponent::render(ui, self);
                        });
                        ui.add_space(20.0);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ProgressComponent::render(ui, self);
            ui.separator();
            self.render_log_panel(ui);
        });

        self.render_about(ctx);

        if self.drain_log_buffer() {
            ctx.request_repaint();
        }
        if self.session.needs_refresh() {
            ctx.request_repaint_after(REFRESH_INTERVAL);
        }
    }
}
