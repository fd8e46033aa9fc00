//! Stereo width — mid/side matrix with a smoothed side gain.
//!
//! `mid = (L + R) / 2`, `side = (L - R) / 2`, then
//! `L' = mid + w * side` and `R' = mid - w * side`.
//! Expanded, each output is a direct term plus a cross-fed term:
//! `L' = L * (1 + w) / 2 + R * (1 - w) / 2`. The processing path uses
//! the expanded form so that `w = 1` returns the input bit-for-bit and
//! `w = 0` yields two identical channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::smoothing::{ParamTarget, Smoother};
use crate::error::EngineError;

/// Time constant for width changes, in seconds.
pub const WIDTH_TIME_CONSTANT: f64 = 0.1;

/// Discrete width choices offered by the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthPreset {
    Mono,
    Natural,
    Wide,
    Ultra,
}

impl WidthPreset {
    pub const ALL: [WidthPreset; 4] = [
        WidthPreset::Mono,
        WidthPreset::Natural,
        WidthPreset::Wide,
        WidthPreset::Ultra,
    ];

    pub fn factor(self) -> f64 {
        match self {
            WidthPreset::Mono => 0.0,
            WidthPreset::Natural => 1.0,
            WidthPreset::Wide => 1.5,
            WidthPreset::Ultra => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WidthPreset::Mono => "mono",
            WidthPreset::Natural => "natural",
            WidthPreset::Wide => "wide",
            WidthPreset::Ultra => "ultra",
        }
    }
}

impl fmt::Display for WidthPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidthPreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        WidthPreset::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| EngineError::UnknownWidthPreset(s.to_string()))
    }
}

/// Clamp a width factor: negative becomes 0, no upper ceiling,
/// non-finite values become `None`.
pub fn clamp_width(width: f64) -> Option<f64> {
    width.is_finite().then(|| width.max(0.0))
}

/// Split a stereo pair into (mid, side).
#[inline]
pub fn decompose(left: f64, right: f64) -> (f64, f64) {
    (0.5 * (left + right), 0.5 * (left - right))
}

/// Rebuild a stereo pair from (mid, side) with the side scaled by `width`.
#[inline]
pub fn recombine(mid: f64, side: f64, width: f64) -> (f64, f64) {
    (mid + width * side, mid - width * side)
}

/// The mid/side width matrix with a smoothed width factor.
#[derive(Debug, Clone)]
pub struct StereoWidthMatrix {
    width: Smoother,
}

impl StereoWidthMatrix {
    pub fn new(width: f64, sample_rate: f64) -> Self {
        StereoWidthMatrix {
            width: Smoother::new(width, WIDTH_TIME_CONSTANT, sample_rate),
        }
    }

    pub fn snap_width(&mut self, width: f64) {
        self.width.snap(width);
    }

    /// Advance the width smoother one sample and return the new width.
    #[inline]
    pub fn tick(&mut self, target: &ParamTarget) -> f64 {
        self.width.follow(target)
    }

    pub fn width(&self) -> f64 {
        self.width.current()
    }

    /// Apply the matrix at the current smoothed width.
    #[inline]
    pub fn process_frame(&self, left: f64, right: f64) -> (f64, f64) {
        Self::process(left, right, self.width.current())
    }

    /// Apply the matrix at an explicit width.
    #[inline]
    pub fn process(left: f64, right: f64, width: f64) -> (f64, f64) {
        let direct = 0.5 * (1.0 + width);
        let cross = 0.5 * (1.0 - width);
        (direct * left + cross * right, direct * right + cross * left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_parse_by_name() {
        for preset in WidthPreset::ALL {
            assert_eq!(preset.as_str().parse::<WidthPreset>().unwrap(), preset);
        }
        assert_eq!(" Wide ".parse::<WidthPreset>().unwrap(), WidthPreset::Wide);
        assert!(matches!(
            "huge".parse::<WidthPreset>(),
            Err(EngineError::UnknownWidthPreset(_))
        ));
    }

    fn pairs() -> impl Iterator<Item = (f64, f64)> {
        (0..500).map(|i| {
            let l = ((i * 7919) % 2001) as f64 / 1000.0 - 1.0;
            let r = ((i * 104729 + 17) % 2001) as f64 / 1000.0 - 1.0;
            (l, r)
        })
    }

    #[test]
    fn unit_width_is_identity() {
        for (l, r) in pairs().chain([(0.1, 0.3), (1e-30, -7.5), (-0.0, 0.0)]) {
            let (ol, or) = StereoWidthMatrix::process(l, r, 1.0);
            assert_eq!(ol, l);
            assert_eq!(or, r);
        }
    }

    #[test]
    fn zero_width_collapses_to_mono() {
        for (l, r) in pairs() {
            let (ol, or) = StereoWidthMatrix::process(l, r, 0.0);
            assert_eq!(ol, or, "Channels differ for ({l}, {r})");
            assert!((ol - 0.5 * (l + r)).abs() < 1e-12);
        }
    }

    #[test]
    fn expanded_form_matches_mid_side_law() {
        for width in [0.0, 0.5, 1.0, 1.5, 2.0, 3.7] {
            for (l, r) in pairs() {
                let (mid, side) = decompose(l, r);
                let (el, er) = recombine(mid, side, width);
                let (ol, or) = StereoWidthMatrix::process(l, r, width);
                assert!((ol - el).abs() < 1e-12, "Left mismatch at width {width}");
                assert!((or - er).abs() < 1e-12, "Right mismatch at width {width}");
            }
        }
    }

    #[test]
    fn wider_increases_side_energy() {
        let (l, r) = (0.8, 0.2);
        let (nl, nr) = StereoWidthMatrix::process(l, r, 1.0);
        let (wl, wr) = StereoWidthMatrix::process(l, r, 2.0);
        assert!((wl - wr).abs() > (nl - nr).abs());
        // Mid is untouched by width.
        assert!(((wl + wr) - (l + r)).abs() < 1e-12);
    }

    #[test]
    fn width_is_smoothed() {
        let sr = 44100.0;
        let mut m = StereoWidthMatrix::new(1.0, sr);
        let target = ParamTarget::new(0.0, WIDTH_TIME_CONSTANT);
        let w = m.tick(&target);
        assert!(w > 0.999, "Width jumped to {w}");
        for _ in 0..(2 * sr as usize) {
            m.tick(&target);
        }
        assert_eq!(m.width(), 0.0);
        let (l, r) = m.process_frame(0.9, -0.3);
        assert_eq!(l, r);
    }

    #[test]
    fn presets_and_clamping() {
        let factors: Vec<f64> = WidthPreset::ALL.iter().map(|p| p.factor()).collect();
        assert_eq!(factors, vec![0.0, 1.0, 1.5, 2.0]);
        assert_eq!(clamp_width(-1.0), Some(0.0));
        assert_eq!(clamp_width(4.0), Some(4.0));
        assert_eq!(clamp_width(f64::INFINITY), None);
    }
}
