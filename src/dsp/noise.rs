//! Noise synthesis — white, pink and brown stereo buffers.
//!
//! Every variant is driven by the same uniform white source. Pink noise
//! uses Paul Kellet's seven-pole weighted filter bank; brown noise is a
//! leaky integrator. Each channel has its own state and its own random
//! draws, so the left and right buffers are decorrelated.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Length of each generated buffer, in seconds.
pub const BUFFER_SECONDS: f64 = 5.0;

/// Loudness compensation applied to Kellet pink noise.
const PINK_GAIN: f64 = 0.11;
/// Loudness compensation applied to the brown integrator output.
const BROWN_GAIN: f64 = 3.5;
/// Leak divisor of the brown integrator.
const BROWN_LEAK: f64 = 1.02;
/// Step size of each white sample fed into the brown integrator.
const BROWN_STEP: f64 = 0.02;

/// The three noise colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseType {
    #[default]
    White,
    Pink,
    Brown,
}

impl NoiseType {
    pub const ALL: [NoiseType; 3] = [NoiseType::White, NoiseType::Pink, NoiseType::Brown];

    pub fn as_str(self) -> &'static str {
        match self {
            NoiseType::White => "white",
            NoiseType::Pink => "pink",
            NoiseType::Brown => "brown",
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(v: u8) -> NoiseType {
        match v {
            1 => NoiseType::Pink,
            2 => NoiseType::Brown,
            _ => NoiseType::White,
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(NoiseType::White),
            "pink" => Ok(NoiseType::Pink),
            "brown" | "brownian" | "red" => Ok(NoiseType::Brown),
            _ => Err(EngineError::UnknownNoiseType(s.to_string())),
        }
    }
}

/// Kellet pink filter memory for one channel.
#[derive(Debug, Clone, Default)]
pub struct PinkState {
    b: [f64; 7],
}

impl PinkState {
    /// Feed one white sample, return one pink sample.
    #[inline]
    pub fn step(&mut self, white: f64) -> f64 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.0555179;
        b[1] = 0.99332 * b[1] + white * 0.0750759;
        b[2] = 0.96900 * b[2] + white * 0.1538520;
        b[3] = 0.86650 * b[3] + white * 0.3104856;
        b[4] = 0.55000 * b[4] + white * 0.5329522;
        b[5] = -0.7616 * b[5] - white * 0.0168980;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        // b6 is one sample late by construction
        b[6] = white * 0.115926;
        pink * PINK_GAIN
    }
}

/// Leaky integrator memory for one channel.
#[derive(Debug, Clone, Default)]
pub struct BrownState {
    last: f64,
}

impl BrownState {
    /// Feed one white sample, return one brown sample.
    ///
    /// The integrator keeps the uncompensated value; only the returned
    /// sample carries the loudness gain.
    #[inline]
    pub fn step(&mut self, white: f64) -> f64 {
        self.last = (self.last + BROWN_STEP * white) / BROWN_LEAK;
        self.last * BROWN_GAIN
    }
}

/// A two-channel buffer of generated noise, looped during playback.
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    left: Vec<f32>,
    right: Vec<f32>,
    sample_rate: f64,
}

impl NoiseBuffer {
    fn with_len(len: usize, sample_rate: f64) -> Self {
        NoiseBuffer {
            left: vec![0.0; len],
            right: vec![0.0; len],
            sample_rate,
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    /// One stereo frame, or silence past the end.
    #[inline]
    pub fn frame(&self, index: usize) -> (f32, f32) {
        match (self.left.get(index), self.right.get(index)) {
            (Some(&l), Some(&r)) => (l, r),
            _ => (0.0, 0.0),
        }
    }

    pub fn rms(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .left
            .iter()
            .chain(self.right.iter())
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        (sum / (2 * self.len()) as f64).sqrt()
    }

    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0_f32, |m, &s| m.max(s.abs()))
    }
}

/// The three buffers produced by one generation pass.
#[derive(Debug, Clone)]
pub struct NoiseBuffers {
    pub white: NoiseBuffer,
    pub pink: NoiseBuffer,
    pub brown: NoiseBuffer,
}

impl NoiseBuffers {
    pub fn get(&self, noise_type: NoiseType) -> &NoiseBuffer {
        match noise_type {
            NoiseType::White => &self.white,
            NoiseType::Pink => &self.pink,
            NoiseType::Brown => &self.brown,
        }
    }
}

/// Generates noise buffers from a uniform random source.
#[derive(Debug, Clone)]
pub struct NoiseSynthesizer {
    rng: SmallRng,
}

impl NoiseSynthesizer {
    /// Create a synthesizer with a seeded random sequence.
    ///
    /// The same seed gives the same buffers on the same platform only.
    /// `SmallRng` picks a different algorithm on 32-bit targets (WASM
    /// included), so a seed passed to a WASM host and to a native build
    /// produces different noise.
    pub fn with_seed(seed: u64) -> Self {
        NoiseSynthesizer {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a synthesizer seeded from OS entropy.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_entropy() -> Self {
        NoiseSynthesizer {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Next uniform white sample in [-1, 1).
    #[inline]
    fn white(&mut self) -> f64 {
        self.rng.random_range(-1.0..1.0)
    }

    /// Generate white, pink and brown stereo buffers of
    /// `duration_seconds` at `sample_rate`.
    pub fn generate(&mut self, duration_seconds: f64, sample_rate: f64) -> NoiseBuffers {
        let len = (duration_seconds.max(0.0) * sample_rate.max(0.0)).round() as usize;

        let mut white = NoiseBuffer::with_len(len, sample_rate);
        let mut pink = NoiseBuffer::with_len(len, sample_rate);
        let mut brown = NoiseBuffer::with_len(len, sample_rate);

        for channel in 0..2 {
            let mut pink_state = PinkState::default();
            let mut brown_state = BrownState::default();

            let (white_out, pink_out, brown_out) = if channel == 0 {
                (&mut white.left, &mut pink.left, &mut brown.left)
            } else {
                (&mut white.right, &mut pink.right, &mut brown.right)
            };

            for i in 0..len {
                let w = self.white();
                white_out[i] = w as f32;
                pink_out[i] = pink_state.step(w) as f32;
                brown_out[i] = brown_state.step(w) as f32;
            }
        }

        log::debug!(
            "generated noise buffers: {len} frames x 2 channels at {sample_rate} Hz ({:.2}s)",
            duration_seconds
        );

        NoiseBuffers { white, pink, brown }
    }
}
