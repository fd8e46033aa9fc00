//! Equalizer bank — 16 peaking biquads in series.

use super::filter::{BiquadFilter, Channel};
use super::smoothing::{ParamTarget, Smoother, DEFAULT_TIME_CONSTANT};

/// Number of bands in the bank.
pub const BAND_COUNT: usize = 16;

/// Fixed band center frequencies in Hz, low to high.
pub const BAND_FREQUENCIES: [f64; BAND_COUNT] = [
    20.0, 31.0, 50.0, 80.0, 125.0, 200.0, 315.0, 500.0, 800.0, 1200.0, 2000.0, 3150.0, 5000.0,
    8000.0, 12500.0, 20000.0,
];

/// Q of every band, roughly one octave wide.
pub const BAND_Q: f64 = 1.4;

pub const MIN_GAIN_DB: f64 = -15.0;
pub const MAX_GAIN_DB: f64 = 15.0;

/// Time constant used when every band is reset to flat.
pub const RESET_TIME_CONSTANT: f64 = 0.1;

/// Clamp a band gain to the allowed range; non-finite values become `None`.
pub fn clamp_gain_db(gain_db: f64) -> Option<f64> {
    gain_db
        .is_finite()
        .then(|| gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB))
}

/// One band: a stereo peaking filter plus its gain smoother.
#[derive(Debug, Clone)]
struct EqBand {
    filter: BiquadFilter,
    gain: Smoother,
}

/// Sixteen peaking filters at fixed frequencies, processed in series.
#[derive(Debug, Clone)]
pub struct EqualizerBank {
    bands: Vec<EqBand>,
}

impl EqualizerBank {
    pub fn new(sample_rate: f64) -> Self {
        let bands = BAND_FREQUENCIES
            .iter()
            .map(|&freq| EqBand {
                filter: BiquadFilter::peaking(freq, BAND_Q, sample_rate),
                gain: Smoother::new(0.0, DEFAULT_TIME_CONSTANT, sample_rate),
            })
            .collect();
        EqualizerBank { bands }
    }

    /// Jump every band straight to the given gains, without smoothing.
    pub fn snap_gains(&mut self, gains_db: &[f64; BAND_COUNT]) {
        for (band, &g) in self.bands.iter_mut().zip(gains_db) {
            band.gain.snap(g);
            band.filter.set_gain_db(g);
        }
    }

    /// Advance every band's gain smoother one sample toward its target.
    #[inline]
    pub fn tick(&mut self, targets: &[ParamTarget; BAND_COUNT]) {
        for (band, target) in self.bands.iter_mut().zip(targets) {
            let g = band.gain.follow(target);
            band.filter.set_gain_db(g);
        }
    }

    /// Run one sample through a single band.
    #[inline]
    pub fn process(&mut self, sample: f64, band_index: usize, channel: Channel) -> f64 {
        match self.bands.get_mut(band_index) {
            Some(band) => band.filter.process(channel, sample),
            None => sample,
        }
    }

    /// Run one stereo frame through all bands in order.
    #[inline]
    pub fn process_frame(&mut self, left: f64, right: f64) -> (f64, f64) {
        let (mut l, mut r) = (left, right);
        for band in self.bands.iter_mut() {
            (l, r) = band.filter.process_frame(l, r);
        }
        (l, r)
    }

    /// Current (smoothed) gain of a band in dB.
    pub fn band_gain_db(&self, band_index: usize) -> Option<f64> {
        self.bands.get(band_index).map(|b| b.gain.current())
    }

    /// True once every band sits exactly at 0 dB.
    pub fn is_flat(&self) -> bool {
        self.bands.iter().all(|b| b.filter.gain_db() == 0.0)
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::filter::magnitude_at;

    const SR: f64 = 44100.0;

    fn targets(gains: [f64; BAND_COUNT], tc: f64) -> [ParamTarget; BAND_COUNT] {
        gains.map(|g| ParamTarget::new(g, tc))
    }

    fn test_signal(i: usize) -> f64 {
        ((i * 7919 + 13) % 2001) as f64 / 1000.0 - 1.0
    }

    #[test]
    fn frequencies_ascend_over_audible_range() {
        assert_eq!(BAND_FREQUENCIES[0], 20.0);
        assert_eq!(BAND_FREQUENCIES[BAND_COUNT - 1], 20000.0);
        assert!(BAND_FREQUENCIES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn flat_bank_is_transparent() {
        let mut eq = EqualizerBank::new(SR);
        let t = targets([0.0; BAND_COUNT], DEFAULT_TIME_CONSTANT);
        for i in 0..4096 {
            eq.tick(&t);
            let x = test_signal(i);
            let (l, r) = eq.process_frame(x, -x);
            assert!((l - x).abs() < 1e-12, "Left changed at {i}: {l} vs {x}");
            assert!((r + x).abs() < 1e-12, "Right changed at {i}");
        }
        assert!(eq.is_flat());
    }

    #[test]
    fn single_band_process_matches_chain_slot() {
        let mut eq = EqualizerBank::new(SR);
        for band in 0..BAND_COUNT {
            assert_eq!(eq.process(0.25, band, Channel::Left), 0.25);
        }
        // Out-of-range index passes through.
        assert_eq!(eq.process(0.25, BAND_COUNT, Channel::Left), 0.25);
    }

    #[test]
    fn gain_changes_are_smoothed() {
        let mut eq = EqualizerBank::new(SR);
        let mut gains = [0.0; BAND_COUNT];
        gains[8] = 12.0;
        let t = targets(gains, DEFAULT_TIME_CONSTANT);

        eq.tick(&t);
        let first = eq.band_gain_db(8).unwrap();
        assert!(first > 0.0 && first < 0.1, "First step too large: {first}");

        for _ in 0..(0.05 * SR) as usize {
            eq.tick(&t);
        }
        let after_tau = eq.band_gain_db(8).unwrap();
        assert!(
            (after_tau - 12.0 * (1.0 - (-1.0_f64).exp())).abs() < 0.1,
            "After one time constant: {after_tau}"
        );
    }

    #[test]
    fn boosted_band_raises_its_center() {
        let mut eq = EqualizerBank::new(SR);
        let mut gains = [0.0; BAND_COUNT];
        gains[8] = 12.0;
        eq.snap_gains(&gains);
        eq.tick(&targets(gains, DEFAULT_TIME_CONSTANT));
        let band = &mut eq.bands[8].filter;
        band.update_coefficients();
        let center_db = 20.0 * magnitude_at(band, 800.0).log10();
        assert!((center_db - 12.0).abs() < 0.01, "Center gain {center_db}");
    }

    #[test]
    fn bands_past_nyquist_are_transparent() {
        // 12.5 kHz and 20 kHz both sit above Nyquist at 22.05 kHz.
        let sr = 22050.0;
        let mut gains = [0.0; BAND_COUNT];
        gains[14] = 15.0;
        gains[15] = 15.0;
        let mut boosted = EqualizerBank::new(sr);
        boosted.snap_gains(&gains);
        let mut flat = EqualizerBank::new(sr);

        for band in [14, 15] {
            let filter = &mut boosted.bands[band].filter;
            filter.update_coefficients();
            assert_eq!(magnitude_at(filter, 10800.0), 1.0, "Band {band}");
        }
        for i in 0..4096 {
            let x = test_signal(i);
            assert_eq!(boosted.process_frame(x, -x), flat.process_frame(x, -x));
        }
    }

    #[test]
    fn reset_all_converges_to_transparent() {
        let mut eq = EqualizerBank::new(SR);
        let boosted: [f64; BAND_COUNT] =
            std::array::from_fn(|i| if i % 2 == 0 { 15.0 } else { -15.0 });
        eq.snap_gains(&boosted);
        assert!(!eq.is_flat());

        let reset = targets([0.0; BAND_COUNT], RESET_TIME_CONSTANT);
        // ~16.5 time constants bring 15 dB within the snap threshold.
        for i in 0..(2 * SR as usize) {
            eq.tick(&reset);
            eq.process_frame(test_signal(i), test_signal(i + 1));
        }
        assert!(eq.is_flat(), "Bands did not settle at 0 dB");

        // Flat coefficients are an identity; settled state decays away.
        for _ in 0..(SR as usize) {
            eq.tick(&reset);
            eq.process_frame(0.0, 0.0);
        }
        for i in 0..1024 {
            eq.tick(&reset);
            let x = test_signal(i);
            let (l, _) = eq.process_frame(x, x);
            assert!((l - x).abs() < 1e-6, "Not transparent after reset: {l} vs {x}");
        }
    }

    #[test]
    fn clamps_gain_range() {
        assert_eq!(clamp_gain_db(20.0), Some(15.0));
        assert_eq!(clamp_gain_db(-40.0), Some(-15.0));
        assert_eq!(clamp_gain_db(3.0), Some(3.0));
        assert_eq!(clamp_gain_db(f64::NAN), None);
    }
}
