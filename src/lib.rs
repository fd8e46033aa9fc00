pub mod controls;
pub mod dsp;
pub mod error;
pub mod settings;

use std::sync::Arc;

use crate::controls::GraphControls;
use crate::dsp::equalizer::BAND_FREQUENCIES;
use crate::dsp::graph::SignalGraph;
use crate::dsp::noise::NoiseType;
use crate::dsp::stereo::WidthPreset;
use crate::settings::SettingsPatch;
use wasm_bindgen::prelude::*;

pub use crate::error::EngineError;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the noisedeck-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: display labels for the 16 EQ bands ("20" … "20k").
#[wasm_bindgen]
pub fn eq_band_labels() -> Vec<String> {
    BAND_FREQUENCIES
        .iter()
        .map(|&f| controls::format_eq_label(f))
        .collect()
}

/// WASM-exposed: names of the discrete width presets, narrowest first.
#[wasm_bindgen]
pub fn width_preset_names() -> Vec<String> {
    WidthPreset::ALL.iter().map(|p| p.to_string()).collect()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// WASM-exposed: a signal graph plus its controls, for AudioWorklet hosts.
///
/// The worklet calls `process` once per render quantum; control calls
/// come from the same JS object and only touch atomics.
#[wasm_bindgen]
pub struct NoiseEngine {
    graph: SignalGraph,
}

#[wasm_bindgen]
impl NoiseEngine {
    /// Generate the noise buffers for `sample_rate`. `seed` comes from the
    /// host (e.g. `Math.random() * 2**32`) since WASM has no OS entropy.
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64, seed: u32) -> Result<NoiseEngine, JsValue> {
        let graph = SignalGraph::with_seed(sample_rate, Arc::new(GraphControls::new()), seed as u64)
            .map_err(js_err)?;
        Ok(NoiseEngine { graph })
    }

    /// Render one block of planar stereo output.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.graph.process(left, right);
    }

    pub fn play(&self) {
        self.graph.controls().play();
    }

    pub fn stop(&self) {
        self.graph.controls().stop();
    }

    /// Flip play/stop, returning the new state.
    pub fn toggle(&self) -> bool {
        self.graph.controls().toggle()
    }

    pub fn is_playing(&self) -> bool {
        self.graph.controls().is_playing()
    }

    /// Select "white", "pink" or "brown".
    pub fn set_noise_type(&self, name: &str) -> Result<(), JsValue> {
        let noise_type: NoiseType = name.parse().map_err(js_err)?;
        self.graph.controls().set_noise_type(noise_type);
        Ok(())
    }

    /// Sweep control in [0, 100].
    pub fn set_sweep(&self, value: f64) {
        self.graph.controls().set_sweep(value);
    }

    /// Readout for the current sweep target, e.g. "0693 HZ".
    pub fn cutoff_label(&self) -> String {
        controls::format_cutoff_display(self.graph.controls().cutoff_hz())
    }

    pub fn set_band_gain(&self, index: usize, gain_db: f64) -> Result<(), JsValue> {
        self.graph
            .controls()
            .set_band_gain(index, gain_db)
            .map_err(js_err)
    }

    pub fn reset_eq(&self) {
        self.graph.controls().reset_eq();
    }

    pub fn set_width(&self, width: f64) {
        self.graph.controls().set_width(width);
    }

    /// Select "mono", "natural", "wide" or "ultra".
    pub fn set_width_preset(&self, name: &str) -> Result<(), JsValue> {
        let preset: WidthPreset = name.parse().map_err(js_err)?;
        self.graph.controls().set_width_preset(preset);
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.graph.controls().width()
    }

    /// Master volume in [0, 100].
    pub fn set_volume(&self, volume: f64) {
        self.graph.controls().set_volume(volume);
    }

    /// Current control values as a plain JS object.
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.graph.controls().snapshot()).map_err(js_err)
    }

    /// Apply a (possibly partial) settings object. Fields it leaves out
    /// keep their current values.
    pub fn apply_settings(&self, settings: JsValue) -> Result<(), JsValue> {
        let patch: SettingsPatch = serde_wasm_bindgen::from_value(settings).map_err(js_err)?;
        self.graph.controls().apply_patch(&patch);
        Ok(())
    }

    /// Apply a (possibly partial) settings JSON string.
    pub fn apply_settings_json(&self, json: &str) -> Result<(), JsValue> {
        let patch = SettingsPatch::from_json(json).map_err(js_err)?;
        self.graph.controls().apply_patch(&patch);
        Ok(())
    }
}
