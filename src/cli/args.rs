use clap::Parser;
use std::path::PathBuf;

use esrgup::{ModelId, OutputFormat, ScaleFactor, UpscaleParams};

#[derive(Parser, Debug)]
#[command(name = "esrgup", version, about = "ESRGUP CLI")]
pub struct CliArgs {
    /// Input image; repeat for a batch. Files are processed in the given order
    #[arg(short, long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Output directory; defaults to each input's own folder
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Upscaling model
    #[arg(short, long, value_enum, default_value_t = ModelId::RealesrganX4plus)]
    pub model: ModelId,

    /// Upscale factor (2, 3 or 4). Defaults to the largest factor the model supports
    #[arg(short, long, value_enum)]
    pub scale: Option<ScaleFactor>,

    /// Output format (png, jpg or webp)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Path to realesrgan-ncnn-vulkan. Defaults to the copy next to this binary
    #[arg(long, value_name = "PATH")]
    pub upscaler: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Print the batch outcome as JSON instead of the summary line
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl CliArgs {
    pub fn params(&self) -> esrgup::Result<UpscaleParams> {
        match self.scale {
            Some(scale) => UpscaleParams::new(self.model, scale, self.format),
            None => Ok(UpscaleParams::for_model(self.model, self.format)),
        }
    }
}
