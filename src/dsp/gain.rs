//! Master gain — final smoothed scalar on the stereo output.

use super::smoothing::{ParamTarget, Smoother, DEFAULT_TIME_CONSTANT};

/// Clamp a linear gain to [0, 1]; non-finite values become `None`.
pub fn clamp_gain(gain: f64) -> Option<f64> {
    gain.is_finite().then(|| gain.clamp(0.0, 1.0))
}

/// Map a volume control in [0, 100] to a linear gain in [0, 1].
pub fn volume_to_gain(volume: f64) -> Option<f64> {
    volume
        .is_finite()
        .then(|| volume.clamp(0.0, 100.0) / 100.0)
}

/// A single smoothed gain applied to both channels.
#[derive(Debug, Clone)]
pub struct MasterGain {
    gain: Smoother,
}

impl MasterGain {
    pub fn new(gain: f64, sample_rate: f64) -> Self {
        MasterGain {
            gain: Smoother::new(gain, DEFAULT_TIME_CONSTANT, sample_rate),
        }
    }

    pub fn snap_gain(&mut self, gain: f64) {
        self.gain.snap(gain);
    }

    /// Advance the gain smoother one sample.
    #[inline]
    pub fn tick(&mut self, target: &ParamTarget) -> f64 {
        self.gain.follow(target)
    }

    pub fn gain(&self) -> f64 {
        self.gain.current()
    }

    #[inline]
    pub fn process(sample: f64, gain: f64) -> f64 {
        sample * gain
    }

    #[inline]
    pub fn process_frame(&self, left: f64, right: f64) -> (f64, f64) {
        let g = self.gain.current();
        (Self::process(left, g), Self::process(right, g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_both_channels() {
        let g = MasterGain::new(0.5, 44100.0);
        let (l, r) = g.process_frame(0.8, -0.4);
        assert!((l - 0.4).abs() < 1e-12);
        assert!((r + 0.2).abs() < 1e-12);
    }

    #[test]
    fn zero_gain_is_silent() {
        assert_eq!(MasterGain::process(0.9, 0.0), 0.0);
    }

    #[test]
    fn volume_mapping_clamps() {
        assert_eq!(volume_to_gain(50.0), Some(0.5));
        assert_eq!(volume_to_gain(150.0), Some(1.0));
        assert_eq!(volume_to_gain(-5.0), Some(0.0));
        assert_eq!(volume_to_gain(f64::NAN), None);
        assert_eq!(clamp_gain(1.2), Some(1.0));
        assert_eq!(clamp_gain(-0.1), Some(0.0));
    }

    #[test]
    fn gain_ramps_without_steps() {
        let sr = 44100.0;
        let mut g = MasterGain::new(0.0, sr);
        let target = ParamTarget::new(1.0, DEFAULT_TIME_CONSTANT);
        let mut prev = g.gain();
        for _ in 0..(sr as usize) {
            let v = g.tick(&target);
            assert!(v - prev < 0.001, "Gain stepped by {}", v - prev);
            prev = v;
        }
        assert_eq!(g.gain(), 1.0);
    }
}
