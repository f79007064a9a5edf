//! What the user picked: input images, where to write results, and how to
//! upscale them. Also derives the per-file output path.
use std::path::{Path, PathBuf};

use crate::core::params::UpscaleParams;
use crate::types::{ModelId, OutputFormat};

/// Suffix appended to each input's stem.
pub const OUTPUT_SUFFIX: &str = "_upscaled";

/// Number of file names listed before the summary collapses into a count.
const SUMMARY_NAMES: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    pub params: UpscaleParams,
}

impl Selection {
    pub fn new(files: Vec<PathBuf>, output_dir: Option<PathBuf>, params: UpscaleParams) -> Self {
        Self {
            files,
            output_dir,
            params,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Replace the file list. Order and duplicates are kept as given.
    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    /// `None` writes each result next to its input.
    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) {
        self.output_dir = dir;
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.params.set_model(model);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn target_path(&self, input: &Path) -> PathBuf {
        target_path(input, self.output_dir(), self.params.format())
    }

    /// Text for the file picker area.
    pub fn files_summary(&self) -> String {
        if self.files.is_empty() {
            return "No files selected".to_string();
        }

        let names: Vec<String> = self
            .files
            .iter()
            .take(SUMMARY_NAMES)
            .map(|path| display_name(path))
            .collect();
        let mut summary = format!(
            "{} file(s) selected:\n{}",
            self.files.len(),
            names.join("\n")
        );
        if self.files.len() > SUMMARY_NAMES {
            summary.push_str(&format!(
                "\n... and {} more",
                self.files.len() - SUMMARY_NAMES
            ));
        }
        summary
    }

    pub fn output_summary(&self) -> String {
        match &self.output_dir {
            Some(dir) => format!("Saving to:\n{}", dir.display()),
            None => "Same as source folder".to_string(),
        }
    }

    /// Equivalent invocation of the command-line front-end.
    pub fn to_cli_command(&self) -> String {
        let mut cmd = String::from("esrgup");

        for file in &self.files {
            cmd.push_str(&format!(" --input {:?}", file));
        }
        if let Some(dir) = &self.output_dir {
            cmd.push_str(&format!(" --output-dir {:?}", dir));
        }

        cmd.push_str(&format!(" --model {}", self.params.model()));
        cmd.push_str(&format!(" --scale {}", self.params.scale()));
        cmd.push_str(&format!(" --format {}", self.params.format()));
        // we always want to log
        cmd.push_str(" --log");

        cmd
    }
}

/// `{dir}/{stem}_upscaled.{ext}` where `dir` defaults to the input's own folder.
///
/// Two inputs sharing a stem map to the same target when `output_dir` is set;
/// the later one overwrites the earlier result.
pub fn target_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    dir.join(format!("{}{}.{}", stem, OUTPUT_SUFFIX, format.extension()))
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScaleFactor;

    fn selection(files: &[&str]) -> Selection {
        Selection::new(
            files.iter().map(PathBuf::from).collect(),
            None,
            UpscaleParams::default(),
        )
    }

    #[test]
    fn target_sits_next_to_input_by_default() {
        let target = target_path(Path::new("/photos/cats/catA.jpg"), None, OutputFormat::Png);
        assert_eq!(target, PathBuf::from("/photos/cats/catA_upscaled.png"));
    }

    #[test]
    fn target_uses_output_dir_when_set() {
        let target = target_path(
            Path::new("/photos/cats/catA.jpeg"),
            Some(Path::new("/out")),
            OutputFormat::Webp,
        );
        assert_eq!(target, PathBuf::from("/out/catA_upscaled.webp"));
    }

    #[test]
    fn only_last_extension_is_replaced() {
        let target = target_path(Path::new("/a/scan.final.bmp"), None, OutputFormat::Jpg);
        assert_eq!(target, PathBuf::from("/a/scan.final_upscaled.jpg"));
    }

    #[test]
    fn colliding_stems_are_not_renamed() {
        let out = Some(Path::new("/out"));
        let first = target_path(Path::new("/a/cat.jpg"), out, OutputFormat::Png);
        let second = target_path(Path::new("/b/cat.png"), out, OutputFormat::Png);
        assert_eq!(first, second);
    }

    #[test]
    fn summary_lists_first_three_names() {
        assert_eq!(selection(&[]).files_summary(), "No files selected");
        assert_eq!(
            selection(&["/x/a.png", "/x/b.png"]).files_summary(),
            "2 file(s) selected:\na.png\nb.png"
        );
        assert_eq!(
            selection(&["/x/a.png", "/x/b.png", "/x/c.png", "/x/d.png", "/x/e.png"])
                .files_summary(),
            "5 file(s) selected:\na.png\nb.png\nc.png\n... and 2 more"
        );
    }

    #[test]
    fn output_summary_reflects_directory() {
        let mut sel = selection(&["/x/a.png"]);
        assert_eq!(sel.output_summary(), "Same as source folder");
        sel.set_output_dir(Some(PathBuf::from("/out")));
        assert_eq!(sel.output_summary(), "Saving to:\n/out");
    }

    #[test]
    fn model_change_goes_through_params() {
        let mut sel = selection(&["/x/a.png"]);
        sel.params.set_scale(ScaleFactor::X2).unwrap();
        sel.set_model(ModelId::RealesrnetX4plus);
        assert_eq!(sel.params.scale(), ScaleFactor::X4);
    }

    #[test]
    fn cli_command_carries_options() {
        let mut sel = selection(&["/x/a.png"]);
        sel.set_output_dir(Some(PathBuf::from("/out")));
        sel.params.set_format(OutputFormat::Webp);
        assert_eq!(
            sel.to_cli_command(),
            "esrgup --input \"/x/a.png\" --output-dir \"/out\" --model realesrgan-x4plus --scale 4 --format webp --log"
        );
    }
}
