//! Control snapshots — every control value in one serializable struct.
//!
//! Used to hand a complete control state across an API boundary (JSON
//! strings or, through `serde-wasm-bindgen`, plain JS objects). Missing
//! fields of a [`GraphSettings`] fall back to the defaults. A
//! [`SettingsPatch`] instead carries only the fields a document names,
//! and leaves every other control as it is.

use serde::{Deserialize, Serialize};

use crate::controls::{DEFAULT_SWEEP, DEFAULT_VOLUME, DEFAULT_WIDTH};
use crate::dsp::equalizer::BAND_COUNT;
use crate::dsp::noise::NoiseType;
use crate::error::EngineError;

/// A full set of control values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettings {
    /// Requested transport state.
    pub playing: bool,
    pub noise_type: NoiseType,
    /// Sweep control value in [0, 100].
    pub sweep: f64,
    /// Per-band gains in dB, low band first.
    pub eq_gains_db: [f64; BAND_COUNT],
    /// Stereo width factor.
    pub width: f64,
    /// Master volume in [0, 100].
    pub volume: f64,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            playing: false,
            noise_type: NoiseType::default(),
            sweep: DEFAULT_SWEEP,
            eq_gains_db: [0.0; BAND_COUNT],
            width: DEFAULT_WIDTH,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl GraphSettings {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A partial settings document. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub playing: Option<bool>,
    pub noise_type: Option<NoiseType>,
    pub sweep: Option<f64>,
    pub eq_gains_db: Option<[f64; BAND_COUNT]>,
    pub width: Option<f64>,
    pub volume: Option<f64>,
}

impl SettingsPatch {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay the supplied fields onto `base`.
    pub fn merge_into(&self, base: &GraphSettings) -> GraphSettings {
        GraphSettings {
            playing: self.playing.unwrap_or(base.playing),
            noise_type: self.noise_type.unwrap_or(base.noise_type),
            sweep: self.sweep.unwrap_or(base.sweep),
            eq_gains_db: self.eq_gains_db.unwrap_or(base.eq_gains_db),
            width: self.width.unwrap_or(base.width),
            volume: self.volume.unwrap_or(base.volume),
        }
    }
}

impl From<GraphSettings> for SettingsPatch {
    fn from(s: GraphSettings) -> Self {
        SettingsPatch {
            playing: Some(s.playing),
            noise_type: Some(s.noise_type),
            sweep: Some(s.sweep),
            eq_gains_db: Some(s.eq_gains_db),
            width: Some(s.width),
            volume: Some(s.volume),
        }
    }
}
