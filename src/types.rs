//! Shared types and enums used across the crate.
//! Includes `ModelId`, `ScaleFactor` and `OutputFormat`, each with the exact
//! spelling the external upscaler expects on its command line.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum ModelId {
    #[value(name = "realesrgan-x4plus")]
    #[serde(rename = "realesrgan-x4plus")]
    RealesrganX4plus,
    #[value(name = "realesrgan-x4plus-anime")]
    #[serde(rename = "realesrgan-x4plus-anime")]
    RealesrganX4plusAnime,
    #[value(name = "realesr-animevideov3")]
    #[serde(rename = "realesr-animevideov3")]
    RealesrAnimevideoV3,
    #[value(name = "realesrnet-x4plus")]
    #[serde(rename = "realesrnet-x4plus")]
    RealesrnetX4plus,
}

impl ModelId {
    pub const ALL: [ModelId; 4] = [
        ModelId::RealesrganX4plus,
        ModelId::RealesrganX4plusAnime,
        ModelId::RealesrAnimevideoV3,
        ModelId::RealesrnetX4plus,
    ];

    /// Identifier passed to the upscaler's `-n` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::RealesrganX4plus => "realesrgan-x4plus",
            ModelId::RealesrganX4plusAnime => "realesrgan-x4plus-anime",
            ModelId::RealesrAnimevideoV3 => "realesr-animevideov3",
            ModelId::RealesrnetX4plus => "realesrnet-x4plus",
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| Error::UnknownModel { id: s.to_string() })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum ScaleFactor {
    #[value(name = "2")]
    X2,
    #[value(name = "3")]
    X3,
    #[value(name = "4")]
    X4,
}

impl ScaleFactor {
    pub fn as_u32(&self) -> u32 {
        match self {
            ScaleFactor::X2 => 2,
            ScaleFactor::X3 => 3,
            ScaleFactor::X4 => 4,
        }
    }
}

impl From<ScaleFactor> for u32 {
    fn from(scale: ScaleFactor) -> Self {
        scale.as_u32()
    }
}

impl TryFrom<u32> for ScaleFactor {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ScaleFactor::X2),
            3 => Ok(ScaleFactor::X3),
            4 => Ok(ScaleFactor::X4),
            other => Err(Error::InvalidArgument {
                arg: "scale",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpg,
    Webp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpg, OutputFormat::Webp];

    /// File extension and `-f` value understood by the upscaler.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Extensions offered by the image picker.
pub const INPUT_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];
