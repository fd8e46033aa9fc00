//! Sweep filter — log-mapped lowpass after the equalizer chain.

use super::filter::BiquadFilter;
use super::smoothing::{ParamTarget, Smoother, DEFAULT_TIME_CONSTANT};

pub const MIN_CUTOFF_HZ: f64 = 60.0;
pub const MAX_CUTOFF_HZ: f64 = 8000.0;

/// Near-Butterworth, no resonant bump.
pub const SWEEP_Q: f64 = 0.5;

/// Map a linear control value in [0, 100] onto [60, 8000] Hz logarithmically.
///
/// Out-of-range control values are clamped.
pub fn control_to_cutoff(value: f64) -> f64 {
    let v = if value.is_finite() { value.clamp(0.0, 100.0) } else { 100.0 };
    let min_log = MIN_CUTOFF_HZ.ln();
    let max_log = MAX_CUTOFF_HZ.ln();
    let scale = (max_log - min_log) / 100.0;
    (min_log + scale * v).exp()
}

/// Inverse of [`control_to_cutoff`].
pub fn cutoff_to_control(cutoff_hz: f64) -> f64 {
    let hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    let min_log = MIN_CUTOFF_HZ.ln();
    let max_log = MAX_CUTOFF_HZ.ln();
    (hz.ln() - min_log) * 100.0 / (max_log - min_log)
}

/// A stereo lowpass whose cutoff follows a smoothed target.
#[derive(Debug, Clone)]
pub struct SweepFilter {
    filter: BiquadFilter,
    cutoff: Smoother,
}

impl SweepFilter {
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Self {
        SweepFilter {
            filter: BiquadFilter::lowpass(cutoff_hz, SWEEP_Q, sample_rate),
            cutoff: Smoother::new(cutoff_hz, DEFAULT_TIME_CONSTANT, sample_rate),
        }
    }

    pub fn snap_cutoff(&mut self, cutoff_hz: f64) {
        self.cutoff.snap(cutoff_hz);
        self.filter.set_frequency(cutoff_hz);
    }

    /// Advance the cutoff smoother one sample.
    #[inline]
    pub fn tick(&mut self, target: &ParamTarget) {
        let hz = self.cutoff.follow(target);
        self.filter.set_frequency(hz);
    }

    #[inline]
    pub fn process_frame(&mut self, left: f64, right: f64) -> (f64, f64) {
        self.filter.process_frame(left, right)
    }

    /// Current smoothed cutoff in Hz.
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn mapping_endpoints_and_midpoint() {
        assert!((control_to_cutoff(0.0) - 60.0).abs() < 1e-9);
        assert!((control_to_cutoff(100.0) - 8000.0).abs() < 1e-6);
        // Geometric mean of 60 and 8000
        let mid = control_to_cutoff(50.0);
        assert!((mid - (60.0_f64 * 8000.0).sqrt()).abs() < 1e-6, "Midpoint {mid}");
        assert!((mid - 692.82).abs() < 0.01);
    }

    #[test]
    fn mapping_clamps_out_of_range() {
        assert!((control_to_cutoff(-10.0) - 60.0).abs() < 1e-9);
        assert!((control_to_cutoff(250.0) - 8000.0).abs() < 1e-6);
    }

    #[test]
    fn mapping_is_monotonic_and_invertible() {
        let mut prev = 0.0;
        for v in 0..=100 {
            let hz = control_to_cutoff(v as f64);
            assert!(hz > prev);
            prev = hz;
            assert!((cutoff_to_control(hz) - v as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn cutoff_glides_to_target() {
        let sr = 44100.0;
        let mut f = SweepFilter::new(8000.0, sr);
        let target = ParamTarget::new(60.0, DEFAULT_TIME_CONSTANT);
        f.tick(&target);
        assert!(f.cutoff_hz() > 7990.0, "Cutoff jumped to {}", f.cutoff_hz());
        for _ in 0..(2 * sr as usize) {
            f.tick(&target);
        }
        assert_eq!(f.cutoff_hz(), 60.0);
    }

    #[test]
    fn low_cutoff_attenuates_treble() {
        let sr = 44100.0;
        let mut f = SweepFilter::new(control_to_cutoff(0.0), sr);
        let mut max_out = 0.0_f64;
        for i in 0..8820 {
            let x = (2.0 * PI * 5000.0 * i as f64 / sr).sin();
            let (l, _) = f.process_frame(x, x);
            if i > 2000 {
                max_out = max_out.max(l.abs());
            }
        }
        assert!(max_out < 0.01, "5 kHz through 60 Hz lowpass: {max_out}");
    }
}
