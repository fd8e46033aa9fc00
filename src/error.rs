use thiserror::Error;

/// Errors surfaced by the control surface and graph construction.
///
/// Numeric parameter values are never reported here: they are clamped
/// at the boundary so the audio path stays error-free.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid sample rate {0} Hz (must be finite and at least {min} Hz)", min = crate::dsp::graph::MIN_SAMPLE_RATE)]
    InvalidSampleRate(f64),

    #[error("EQ band index {index} out of range (bank has {bands} bands)", bands = crate::dsp::equalizer::BAND_COUNT)]
    BandOutOfRange { index: usize },

    #[error("Unknown noise type '{0}' (expected white, pink or brown)")]
    UnknownNoiseType(String),

    #[error("Unknown width preset '{0}' (expected mono, natural, wide or ultra)")]
    UnknownWidthPreset(String),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}
