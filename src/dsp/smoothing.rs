//! Parameter smoothing — lock-free targets and per-sample exponential approach.
//!
//! The control thread writes a [`ParamTarget`]; the audio thread owns a
//! [`Smoother`] that follows it every sample, equivalent to WebAudio's
//! `setTargetAtTime`. A racy update only moves the target, never the
//! signal, so no handoff can produce a step.

use std::sync::atomic::{AtomicU64, Ordering};

/// Time constant for live control changes, in seconds.
pub const DEFAULT_TIME_CONSTANT: f64 = 0.05;

/// Once a smoother is this close to its target it lands on it exactly.
const SNAP_EPSILON: f64 = 1e-6;

/// A target value and the time constant to approach it with.
///
/// Both halves are stored as `f64` bits in atomics so the audio thread
/// can read them without locking.
#[derive(Debug)]
pub struct ParamTarget {
    value: AtomicU64,
    time_constant: AtomicU64,
}

impl ParamTarget {
    pub fn new(value: f64, time_constant: f64) -> Self {
        ParamTarget {
            value: AtomicU64::new(value.to_bits()),
            time_constant: AtomicU64::new(time_constant.to_bits()),
        }
    }

    /// Set a new target (thread-safe, call from the control side).
    #[inline]
    pub fn set(&self, value: f64, time_constant: f64) {
        self.time_constant
            .store(time_constant.to_bits(), Ordering::Relaxed);
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn time_constant(&self) -> f64 {
        f64::from_bits(self.time_constant.load(Ordering::Relaxed))
    }
}

/// Audio-thread state of one smoothed parameter.
#[derive(Debug, Clone)]
pub struct Smoother {
    current: f64,
    sample_rate: f64,
    time_constant: f64,
    coeff: f64,
}

impl Smoother {
    pub fn new(initial: f64, time_constant: f64, sample_rate: f64) -> Self {
        Smoother {
            current: initial,
            sample_rate,
            time_constant,
            coeff: Self::coeff_for(time_constant, sample_rate),
        }
    }

    /// Per-sample approach coefficient: after `time_constant` seconds the
    /// remaining distance has shrunk to 1/e.
    fn coeff_for(time_constant: f64, sample_rate: f64) -> f64 {
        let samples = time_constant * sample_rate;
        if samples <= 0.0 {
            1.0
        } else {
            1.0 - (-1.0 / samples).exp()
        }
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Jump straight to `value` (construction-time sync only).
    pub fn snap(&mut self, value: f64) {
        self.current = value;
    }

    pub fn is_settled(&self, target: f64) -> bool {
        self.current == target
    }

    /// Advance one sample toward `target`.
    #[inline]
    pub fn next(&mut self, target: f64, time_constant: f64) -> f64 {
        if time_constant != self.time_constant {
            self.time_constant = time_constant;
            self.coeff = Self::coeff_for(time_constant, self.sample_rate);
        }

        let diff = target - self.current;
        if diff.abs() <= SNAP_EPSILON {
            self.current = target;
        } else {
            self.current += self.coeff * diff;
        }
        self.current
    }

    /// Advance one sample toward a shared target.
    #[inline]
    pub fn follow(&mut self, target: &ParamTarget) -> f64 {
        self.next(target.value(), target.time_constant())
    }
}
