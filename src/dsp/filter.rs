//! Biquad filter — matches WebAudio BiquadFilterNode coefficients.

use std::f64::consts::PI;

/// Filter type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    Lowpass,
    Peaking,
}

/// Stereo channel selector for per-channel filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

/// Recursive memory of one biquad on one channel (Direct Form II Transposed).
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    z1: f64,
    z2: f64,
}

/// A biquad IIR filter (2nd order) with independent left/right state.
///
/// Implements the standard Direct Form II Transposed structure.
/// Coefficient formulas from the Audio EQ Cookbook (Robert Bristow-Johnson).
/// Both channels share one coefficient set; their recursive state is
/// never shared.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    pub filter_type: FilterType,
    frequency: f64,
    q: f64,
    gain_db: f64, // only used for Peaking

    // Coefficients
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    // Cached trig terms, only depend on frequency
    cos_w0: f64,
    sin_w0: f64,

    left: BiquadState,
    right: BiquadState,

    sample_rate: f64,
    dirty: bool,
    trig_dirty: bool,
}

impl BiquadFilter {
    pub fn new(filter_type: FilterType, sample_rate: f64) -> Self {
        let mut f = BiquadFilter {
            filter_type,
            frequency: 1000.0,
            q: 0.707, // Butterworth
            gain_db: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            cos_w0: 1.0,
            sin_w0: 0.0,
            left: BiquadState::default(),
            right: BiquadState::default(),
            sample_rate,
            dirty: true,
            trig_dirty: true,
        };
        f.update_coefficients();
        f
    }

    /// A peaking (bell) filter at `frequency` with fixed `q`, flat at 0 dB.
    pub fn peaking(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let mut f = Self::new(FilterType::Peaking, sample_rate);
        f.set_frequency(frequency);
        f.set_q(q);
        f.update_coefficients();
        f
    }

    /// A lowpass filter at `frequency` with the given `q`.
    pub fn lowpass(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let mut f = Self::new(FilterType::Lowpass, sample_rate);
        f.set_frequency(frequency);
        f.set_q(q);
        f.update_coefficients();
        f
    }

    /// Recompute filter coefficients from current parameters.
    ///
    /// At or above Nyquist the stage passes audio through unchanged, as
    /// WebAudio's BiquadFilterNode does for lowpass and peaking.
    pub fn update_coefficients(&mut self) {
        if self.frequency >= self.sample_rate / 2.0 {
            (self.b0, self.b1, self.b2, self.a1, self.a2) = (1.0, 0.0, 0.0, 0.0, 0.0);
            self.dirty = false;
            return;
        }

        if self.trig_dirty {
            let freq = self.frequency.max(1.0);
            let w0 = 2.0 * PI * freq / self.sample_rate;
            self.cos_w0 = w0.cos();
            self.sin_w0 = w0.sin();
            self.trig_dirty = false;
        }

        let cos_w0 = self.cos_w0;
        let alpha = self.sin_w0 / (2.0 * self.q);

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::Lowpass => {
                let b1 = 1.0 - cos_w0;
                let b0 = b1 / 2.0;
                let b2 = b0;
                let a0 = 1.0 + alpha;
                let a1 = -2.0 * cos_w0;
                let a2 = 1.0 - alpha;
                (b0, b1, b2, a0, a1, a2)
            }
            FilterType::Peaking => {
                // At 0 dB a_lin is exactly 1, so b == a and the stage is an identity.
                let a_lin = (10.0_f64).powf(self.gain_db / 40.0);
                let b0 = 1.0 + alpha * a_lin;
                let b1 = -2.0 * cos_w0;
                let b2 = 1.0 - alpha * a_lin;
                let a0 = 1.0 + alpha / a_lin;
                let a1 = -2.0 * cos_w0;
                let a2 = 1.0 - alpha / a_lin;
                (b0, b1, b2, a0, a1, a2)
            }
        };

        // Normalize by a0
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
        self.dirty = false;
    }

    /// Process a single sample through the given channel's state.
    #[inline]
    pub fn process(&mut self, channel: Channel, input: f64) -> f64 {
        if self.dirty {
            self.update_coefficients();
        }

        let (b0, b1, b2, a1, a2) = (self.b0, self.b1, self.b2, self.a1, self.a2);
        let state = match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        };

        let output = b0 * input + state.z1;
        state.z1 = b1 * input - a1 * output + state.z2;
        state.z2 = b2 * input - a2 * output;
        output
    }

    /// Process one stereo frame.
    #[inline]
    pub fn process_frame(&mut self, left: f64, right: f64) -> (f64, f64) {
        let l = self.process(Channel::Left, left);
        let r = self.process(Channel::Right, right);
        (l, r)
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.left = BiquadState::default();
        self.right = BiquadState::default();
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// Set frequency and mark coefficients dirty.
    #[inline]
    pub fn set_frequency(&mut self, freq: f64) {
        if freq != self.frequency {
            self.frequency = freq;
            self.dirty = true;
            self.trig_dirty = true;
        }
    }

    /// Set Q and mark coefficients dirty.
    pub fn set_q(&mut self, q: f64) {
        if q != self.q {
            self.q = q;
            self.dirty = true;
        }
    }

    /// Set peaking gain in dB and mark coefficients dirty.
    #[inline]
    pub fn set_gain_db(&mut self, gain_db: f64) {
        if gain_db != self.gain_db {
            self.gain_db = gain_db;
            self.dirty = true;
        }
    }
}

/// Magnitude response of a biquad's current coefficients at `freq` Hz.
#[cfg(test)]
pub(crate) fn magnitude_at(filter: &BiquadFilter, freq: f64) -> f64 {
    let w = 2.0 * PI * freq / filter.sample_rate;
    let (c1, s1) = (w.cos(), w.sin());
    let (c2, s2) = ((2.0 * w).cos(), (2.0 * w).sin());
    let num_re = filter.b0 + filter.b1 * c1 + filter.b2 * c2;
    let num_im = -(filter.b1 * s1 + filter.b2 * s2);
    let den_re = 1.0 + filter.a1 * c1 + filter.a2 * c2;
    let den_im = -(filter.a1 * s1 + filter.a2 * s2);
    ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
}
