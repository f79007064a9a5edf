use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{ModelId, OutputFormat, ScaleFactor};

/// Upscaling options shared by every file of a batch.
///
/// Fields are private so the scale factor can never leave the permitted set of
/// the selected model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpscaleParams {
    model: ModelId,
    scale: ScaleFactor,
    format: OutputFormat,
}

impl Default for UpscaleParams {
    fn default() -> Self {
        Self {
            model: ModelId::RealesrganX4plus,
            scale: ScaleFactor::X4,
            format: OutputFormat::Png,
        }
    }
}

impl UpscaleParams {
    pub fn new(model: ModelId, scale: ScaleFactor, format: OutputFormat) -> Result<Self> {
        if !model.supports(scale) {
            return Err(Error::UnsupportedScale { model, scale });
        }
        Ok(Self {
            model,
            scale,
            format,
        })
    }

    /// Parameters for `model` at its default (largest) scale.
    pub fn for_model(model: ModelId, format: OutputFormat) -> Self {
        Self {
            model,
            scale: model.default_scale(),
            format,
        }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Switch model; the scale snaps to the new model's default factor.
    pub fn set_model(&mut self, model: ModelId) {
        if model == self.model {
            return;
        }
        self.model = model;
        self.scale = model.default_scale();
    }

    pub fn set_scale(&mut self, scale: ScaleFactor) -> Result<()> {
        if !self.model.supports(scale) {
            return Err(Error::UnsupportedScale {
                model: self.model,
                scale,
            });
        }
        self.scale = scale;
        Ok(())
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_picker() {
        let params = UpscaleParams::default();
        assert_eq!(params.model(), ModelId::RealesrganX4plus);
        assert_eq!(params.scale(), ScaleFactor::X4);
        assert_eq!(params.format(), OutputFormat::Png);
    }

    #[test]
    fn switching_model_keeps_scale_permitted() {
        for from in ModelId::ALL {
            for to in ModelId::ALL {
                for &scale in from.scales() {
                    let mut params = UpscaleParams::new(from, scale, OutputFormat::Png).unwrap();
                    params.set_model(to);
                    assert!(to.supports(params.scale()), "{from} -> {to} at {scale}x");
                }
            }
        }
    }

    #[test]
    fn switching_to_esrnet_forces_x4() {
        let mut params =
            UpscaleParams::new(ModelId::RealesrganX4plus, ScaleFactor::X2, OutputFormat::Jpg)
                .unwrap();
        params.set_model(ModelId::RealesrnetX4plus);
        assert_eq!(params.scale(), ScaleFactor::X4);
        assert_eq!(params.format(), OutputFormat::Jpg);
    }

    #[test]
    fn reselecting_same_model_keeps_scale() {
        let mut params =
            UpscaleParams::new(ModelId::RealesrganX4plus, ScaleFactor::X3, OutputFormat::Png)
                .unwrap();
        params.set_model(ModelId::RealesrganX4plus);
        assert_eq!(params.scale(), ScaleFactor::X3);
    }

    #[test]
    fn unsupported_scale_is_rejected() {
        let mut params = UpscaleParams::for_model(ModelId::RealesrnetX4plus, OutputFormat::Png);
        assert!(matches!(
            params.set_scale(ScaleFactor::X2),
            Err(Error::UnsupportedScale { .. })
        ));
        assert_eq!(params.scale(), ScaleFactor::X4);
        assert!(
            UpscaleParams::new(ModelId::RealesrnetX4plus, ScaleFactor::X3, OutputFormat::Png)
                .is_err()
        );
    }

    #[test]
    fn params_serialize_with_upscaler_spelling() {
        let params =
            UpscaleParams::new(ModelId::RealesrAnimevideoV3, ScaleFactor::X2, OutputFormat::Webp)
                .unwrap();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(
            json,
            r#"{"model":"realesr-animevideov3","scale":2,"format":"webp"}"#
        );
    }
}
