//! Option catalog: which scale factors each upscaling model accepts.
//!
//! The table is fixed at compile time. Every lookup is total over [`ModelId`];
//! only the string-keyed entry point can fail, for identifiers outside the set.
use crate::error::Result;
use crate::types::{ModelId, ScaleFactor};

const FULL_RANGE: &[ScaleFactor] = &[ScaleFactor::X2, ScaleFactor::X3, ScaleFactor::X4];
const NATIVE_X4: &[ScaleFactor] = &[ScaleFactor::X4];

/// One row of the catalog. `scales` is ordered ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub model: ModelId,
    pub label: &'static str,
    pub scales: &'static [ScaleFactor],
}

pub const CATALOG: [CatalogEntry; 4] = [
    CatalogEntry {
        model: ModelId::RealesrganX4plus,
        label: "Real-ESRGAN x4plus (General)",
        scales: FULL_RANGE,
    },
    CatalogEntry {
        model: ModelId::RealesrganX4plusAnime,
        label: "Real-ESRGAN x4plus Anime",
        scales: FULL_RANGE,
    },
    CatalogEntry {
        model: ModelId::RealesrAnimevideoV3,
        label: "Real-ESR AnimeVideo v3",
        scales: FULL_RANGE,
    },
    CatalogEntry {
        model: ModelId::RealesrnetX4plus,
        label: "Real-ESRNet x4plus",
        scales: NATIVE_X4,
    },
];

impl ModelId {
    pub fn entry(&self) -> &'static CatalogEntry {
        match self {
            ModelId::RealesrganX4plus => &CATALOG[0],
            ModelId::RealesrganX4plusAnime => &CATALOG[1],
            ModelId::RealesrAnimevideoV3 => &CATALOG[2],
            ModelId::RealesrnetX4plus => &CATALOG[3],
        }
    }

    pub fn label(&self) -> &'static str {
        self.entry().label
    }

    pub fn scales(&self) -> &'static [ScaleFactor] {
        self.entry().scales
    }

    pub fn supports(&self, scale: ScaleFactor) -> bool {
        self.scales().contains(&scale)
    }

    /// Largest permitted factor; used whenever the model changes.
    pub fn default_scale(&self) -> ScaleFactor {
        self.scales()
            .iter()
            .copied()
            .max()
            .unwrap_or(ScaleFactor::X4)
    }
}

/// Label and permitted scales for a raw model identifier.
pub fn label_and_scales(model_id: &str) -> Result<(&'static str, &'static [ScaleFactor])> {
    let model: ModelId = model_id.parse()?;
    Ok((model.label(), model.scales()))
}

pub fn default_scale(model: ModelId) -> ScaleFactor {
    model.default_scale()
}
