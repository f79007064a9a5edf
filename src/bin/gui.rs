#[cfg(feature = "gui")]
use eframe::{NativeOptions, egui::ViewportBuilder};
#[cfg(feature = "gui")]
use esrgup::gui::models::{EsrgupGui, init_gui_logging};

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    init_gui_logging();

    let options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("ESRGUP")
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ESRGUP",
        options,
        Box::new(|_cc| Ok(Box::new(EsrgupGui::default()))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("GUI feature is not enabled. Please build with --features gui");
    std::process::exit(1);
}
