//! Control surface — the lock-free handle a UI thread writes into.
//!
//! `GraphControls` is shared through an `Arc` between the control side
//! and the [`SignalGraph`](crate::dsp::graph::SignalGraph). Every setter
//! takes `&self` and only stores atomics; the audio path reads them once
//! per sample (smoothed targets) or once per block (transport, noise
//! type). Numeric values are clamped here, at the boundary.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::dsp::equalizer::{self, BAND_COUNT, RESET_TIME_CONSTANT};
use crate::dsp::gain;
use crate::dsp::noise::NoiseType;
use crate::dsp::smoothing::{ParamTarget, DEFAULT_TIME_CONSTANT};
use crate::dsp::stereo::{self, WidthPreset, WIDTH_TIME_CONSTANT};
use crate::dsp::sweep::{self, control_to_cutoff, cutoff_to_control};
use crate::error::EngineError;
use crate::settings::{GraphSettings, SettingsPatch};

pub const DEFAULT_SWEEP: f64 = 100.0;
pub const DEFAULT_VOLUME: f64 = 50.0;
pub const DEFAULT_WIDTH: f64 = 1.0;

/// Shared control state for one signal graph.
#[derive(Debug)]
pub struct GraphControls {
    playing: AtomicBool,
    noise_type: AtomicU8,
    cutoff: ParamTarget,
    band_gains: [ParamTarget; BAND_COUNT],
    width: ParamTarget,
    master_gain: ParamTarget,
}

impl Default for GraphControls {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphControls {
    pub fn new() -> Self {
        GraphControls {
            playing: AtomicBool::new(false),
            noise_type: AtomicU8::new(NoiseType::default().to_u8()),
            cutoff: ParamTarget::new(control_to_cutoff(DEFAULT_SWEEP), DEFAULT_TIME_CONSTANT),
            band_gains: std::array::from_fn(|_| ParamTarget::new(0.0, DEFAULT_TIME_CONSTANT)),
            width: ParamTarget::new(DEFAULT_WIDTH, WIDTH_TIME_CONSTANT),
            master_gain: ParamTarget::new(DEFAULT_VOLUME / 100.0, DEFAULT_TIME_CONSTANT),
        }
    }

    // ── Transport ───────────────────────────────────────────

    pub fn play(&self) {
        log::debug!("transport: play requested");
        self.playing.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        log::debug!("transport: stop requested");
        self.playing.store(false, Ordering::Relaxed);
    }

    /// Flip play/stop and return the new requested state.
    pub fn toggle(&self) -> bool {
        let playing = !self.playing.fetch_xor(true, Ordering::Relaxed);
        log::debug!("transport: toggled, playing={playing}");
        playing
    }

    /// The requested transport state (the graph may still be fading).
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    // ── Source ──────────────────────────────────────────────

    pub fn set_noise_type(&self, noise_type: NoiseType) {
        log::debug!("source: noise type {noise_type} selected");
        self.noise_type.store(noise_type.to_u8(), Ordering::Relaxed);
    }

    pub fn noise_type(&self) -> NoiseType {
        NoiseType::from_u8(self.noise_type.load(Ordering::Relaxed))
    }

    // ── Sweep filter ────────────────────────────────────────

    /// Set the sweep control in [0, 100]; mapped logarithmically to 60–8000 Hz.
    pub fn set_sweep(&self, value: f64) {
        if value.is_finite() {
            self.cutoff
                .set(control_to_cutoff(value), DEFAULT_TIME_CONSTANT);
        }
    }

    /// Current sweep control value in [0, 100].
    pub fn sweep(&self) -> f64 {
        cutoff_to_control(self.cutoff.value())
    }

    /// Target cutoff in Hz.
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff.value()
    }

    /// Set the target cutoff directly in Hz, clamped to 60–8000.
    pub fn set_cutoff_hz(&self, hz: f64) {
        if hz.is_finite() {
            self.cutoff.set(
                hz.clamp(sweep::MIN_CUTOFF_HZ, sweep::MAX_CUTOFF_HZ),
                DEFAULT_TIME_CONSTANT,
            );
        }
    }

    // ── Equalizer ───────────────────────────────────────────

    /// Set one band's gain in dB, clamped to ±15.
    pub fn set_band_gain(&self, index: usize, gain_db: f64) -> Result<(), EngineError> {
        let target = self
            .band_gains
            .get(index)
            .ok_or(EngineError::BandOutOfRange { index })?;
        if let Some(g) = equalizer::clamp_gain_db(gain_db) {
            target.set(g, DEFAULT_TIME_CONSTANT);
        }
        Ok(())
    }

    pub fn band_gain(&self, index: usize) -> Result<f64, EngineError> {
        self.band_gains
            .get(index)
            .map(ParamTarget::value)
            .ok_or(EngineError::BandOutOfRange { index })
    }

    pub fn band_gains(&self) -> [f64; BAND_COUNT] {
        std::array::from_fn(|i| self.band_gains[i].value())
    }

    /// Send every band back to 0 dB on the slower reset glide.
    pub fn reset_eq(&self) {
        log::debug!("equalizer: reset all bands");
        for target in &self.band_gains {
            target.set(0.0, RESET_TIME_CONSTANT);
        }
    }

    // ── Stereo width ────────────────────────────────────────

    /// Set the width factor; negative values clamp to 0, no upper limit.
    pub fn set_width(&self, width: f64) {
        if let Some(w) = stereo::clamp_width(width) {
            self.width.set(w, WIDTH_TIME_CONSTANT);
        }
    }

    pub fn set_width_preset(&self, preset: WidthPreset) {
        self.set_width(preset.factor());
    }

    pub fn width(&self) -> f64 {
        self.width.value()
    }

    // ── Master gain ─────────────────────────────────────────

    /// Set the volume control in [0, 100].
    pub fn set_volume(&self, volume: f64) {
        if let Some(g) = gain::volume_to_gain(volume) {
            self.master_gain.set(g, DEFAULT_TIME_CONSTANT);
        }
    }

    pub fn volume(&self) -> f64 {
        self.master_gain.value() * 100.0
    }

    /// Set the linear master gain, clamped to [0, 1].
    pub fn set_master_gain(&self, gain: f64) {
        if let Some(g) = gain::clamp_gain(gain) {
            self.master_gain.set(g, DEFAULT_TIME_CONSTANT);
        }
    }

    pub fn master_gain(&self) -> f64 {
        self.master_gain.value()
    }

    // ── Snapshots ───────────────────────────────────────────

    pub fn snapshot(&self) -> GraphSettings {
        GraphSettings {
            playing: self.is_playing(),
            noise_type: self.noise_type(),
            sweep: self.sweep(),
            eq_gains_db: self.band_gains(),
            width: self.width(),
            volume: self.volume(),
        }
    }

    /// Apply every value of a full snapshot through the regular setters.
    pub fn apply(&self, settings: &GraphSettings) {
        self.set_noise_type(settings.noise_type);
        self.set_sweep(settings.sweep);
        self.set_band_gains(&settings.eq_gains_db);
        self.set_width(settings.width);
        self.set_volume(settings.volume);
        if settings.playing {
            self.play();
        } else {
            self.stop();
        }
    }

    /// Apply only the fields a patch carries; every other control keeps
    /// its current value.
    pub fn apply_patch(&self, patch: &SettingsPatch) {
        if let Some(noise_type) = patch.noise_type {
            self.set_noise_type(noise_type);
        }
        if let Some(sweep) = patch.sweep {
            self.set_sweep(sweep);
        }
        if let Some(gains) = &patch.eq_gains_db {
            self.set_band_gains(gains);
        }
        if let Some(width) = patch.width {
            self.set_width(width);
        }
        if let Some(volume) = patch.volume {
            self.set_volume(volume);
        }
        match patch.playing {
            Some(true) => self.play(),
            Some(false) => self.stop(),
            None => {}
        }
    }

    fn set_band_gains(&self, gains_db: &[f64; BAND_COUNT]) {
        for (target, &g) in self.band_gains.iter().zip(gains_db) {
            if let Some(g) = equalizer::clamp_gain_db(g) {
                target.set(g, DEFAULT_TIME_CONSTANT);
            }
        }
    }

    // ── Audio-thread accessors ──────────────────────────────

    pub(crate) fn cutoff_target(&self) -> &ParamTarget {
        &self.cutoff
    }

    pub(crate) fn band_targets(&self) -> &[ParamTarget; BAND_COUNT] {
        &self.band_gains
    }

    pub(crate) fn width_target(&self) -> &ParamTarget {
        &self.width
    }

    pub(crate) fn gain_target(&self) -> &ParamTarget {
        &self.master_gain
    }
}

/// Short label for an EQ band: "20", "800", "1.2k", "12.5k", "20k".
pub fn format_eq_label(freq_hz: f64) -> String {
    if freq_hz >= 1000.0 {
        let khz = format!("{:.1}", freq_hz / 1000.0);
        format!("{}k", khz.replacen(".0", "", 1))
    } else {
        format!("{}", freq_hz.round())
    }
}

/// Zero-padded cutoff readout, e.g. "0060 HZ".
pub fn format_cutoff_display(cutoff_hz: f64) -> String {
    format!("{:04} HZ", cutoff_hz.max(0.0).round() as u64)
}
