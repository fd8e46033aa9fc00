//! DSP — noise synthesis and the fixed processing chain.
//!
//! All processing runs in Rust, one sample frame at a time, so the same
//! code serves native audio callbacks and the WebAudio AudioWorklet (via
//! WASM).

pub mod equalizer;
pub mod filter;
pub mod gain;
pub mod graph;
pub mod noise;
pub mod smoothing;
pub mod stereo;
pub mod sweep;
pub mod transport;
