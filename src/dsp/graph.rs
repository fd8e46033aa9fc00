//! Signal graph — owns every stage and pulls stereo frames through them.
//!
//! Fixed topology:
//! noise buffer → equalizer (16 bands) → sweep lowpass → stereo width →
//! master gain → transport fade → output.
//!
//! The graph is driven by an external backend calling [`SignalGraph::process`]
//! (planar) or [`SignalGraph::process_interleaved`] once per block. Both
//! paths run without allocating, locking or logging. Control changes
//! arrive through the shared [`GraphControls`].
//!
//! Switching noise type while playing rewinds the source to the first
//! frame of the new buffer and fades in again. That switch is not
//! sample-continuous; it is the one known seam in the output.

use std::sync::Arc;

use crate::controls::GraphControls;
use crate::error::EngineError;

use super::equalizer::{EqualizerBank, BAND_COUNT};
use super::gain::MasterGain;
use super::noise::{NoiseBuffers, NoiseSynthesizer, NoiseType, BUFFER_SECONDS};
use super::stereo::StereoWidthMatrix;
use super::sweep::SweepFilter;
use super::transport::{Transport, TransportState};

/// Lowest sample rate the graph accepts, in Hz.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;

/// The complete noise-to-output chain.
pub struct SignalGraph {
    sample_rate: f64,
    controls: Arc<GraphControls>,
    buffers: NoiseBuffers,
    /// Latest noise type seen on the control surface.
    selected_noise: NoiseType,
    /// Noise type the source is currently reading.
    source_noise: NoiseType,
    cursor: usize,
    transport: Transport,
    equalizer: EqualizerBank,
    sweep: SweepFilter,
    stereo: StereoWidthMatrix,
    master: MasterGain,
}

impl SignalGraph {
    /// Build a graph with fresh default controls and entropy-seeded noise.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(sample_rate: f64) -> Result<Self, EngineError> {
        Self::with_controls(sample_rate, Arc::new(GraphControls::new()))
    }

    /// Build a graph around existing controls with entropy-seeded noise.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_controls(
        sample_rate: f64,
        controls: Arc<GraphControls>,
    ) -> Result<Self, EngineError> {
        Self::build(sample_rate, controls, &mut NoiseSynthesizer::from_entropy())
    }

    /// Build a graph with reproducible noise buffers.
    pub fn with_seed(
        sample_rate: f64,
        controls: Arc<GraphControls>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::build(sample_rate, controls, &mut NoiseSynthesizer::with_seed(seed))
    }

    /// Validate the rate, generate the buffers and sync every stage to the
    /// current control values without any glide.
    pub fn build(
        sample_rate: f64,
        controls: Arc<GraphControls>,
        synth: &mut NoiseSynthesizer,
    ) -> Result<Self, EngineError> {
        if !sample_rate.is_finite() || sample_rate < MIN_SAMPLE_RATE {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }

        let buffers = synth.generate(BUFFER_SECONDS, sample_rate);

        let mut equalizer = EqualizerBank::new(sample_rate);
        equalizer.snap_gains(&controls.band_gains());
        let sweep = SweepFilter::new(controls.cutoff_hz(), sample_rate);
        let stereo = StereoWidthMatrix::new(controls.width(), sample_rate);
        let master = MasterGain::new(controls.master_gain(), sample_rate);
        let noise = controls.noise_type();

        log::debug!(
            "signal graph ready: {sample_rate} Hz, {} bands, {} frames per buffer, noise={noise}",
            BAND_COUNT,
            buffers.white.len()
        );

        Ok(SignalGraph {
            sample_rate,
            controls,
            buffers,
            selected_noise: noise,
            source_noise: noise,
            cursor: 0,
            transport: Transport::new(sample_rate),
            equalizer,
            sweep,
            stereo,
            master,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// The control surface feeding this graph.
    pub fn controls(&self) -> &Arc<GraphControls> {
        &self.controls
    }

    pub fn buffers(&self) -> &NoiseBuffers {
        &self.buffers
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    /// Noise type the source is reading from.
    pub fn source_noise(&self) -> NoiseType {
        self.source_noise
    }

    /// Index of the next source frame.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Smoothed cutoff of the sweep filter, in Hz.
    pub fn cutoff_hz(&self) -> f64 {
        self.sweep.cutoff_hz()
    }

    pub fn band_gain_db(&self, band_index: usize) -> Option<f64> {
        self.equalizer.band_gain_db(band_index)
    }

    pub fn width(&self) -> f64 {
        self.stereo.width()
    }

    pub fn master_gain(&self) -> f64 {
        self.master.gain()
    }

    /// Fill planar stereo output. If the slices differ in length the
    /// excess of the longer one is silenced.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.sync_controls();

        let frames = left.len().min(right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.next_frame();
        }
        left[frames..].fill(0.0);
        right[frames..].fill(0.0);
    }

    /// Fill interleaved stereo output (`L R L R ...`). A trailing odd
    /// sample is silenced.
    pub fn process_interleaved(&mut self, output: &mut [f32]) {
        self.sync_controls();

        let mut frames = output.chunks_exact_mut(2);
        for frame in &mut frames {
            (frame[0], frame[1]) = self.next_frame();
        }
        frames.into_remainder().fill(0.0);
    }

    /// Read the block-rate controls: transport request and noise type.
    fn sync_controls(&mut self) {
        let selected = self.controls.noise_type();
        if selected != self.selected_noise {
            self.selected_noise = selected;
            if selected != self.source_noise {
                self.transport.restart();
            }
        }

        if self.controls.is_playing() {
            self.transport.start();
        } else {
            self.transport.stop();
        }
    }

    /// Advance every smoother and produce one output frame.
    #[inline]
    fn next_frame(&mut self) -> (f32, f32) {
        let controls = &*self.controls;
        self.equalizer.tick(controls.band_targets());
        self.sweep.tick(controls.cutoff_target());
        self.stereo.tick(controls.width_target());
        self.master.tick(controls.gain_target());

        let level = self.transport.next_level();
        if self.transport.take_rewind() {
            self.cursor = 0;
            self.source_noise = self.selected_noise;
        }
        if self.transport.is_stopped() {
            return (0.0, 0.0);
        }

        let buffer = self.buffers.get(self.source_noise);
        let (l, r) = buffer.frame(self.cursor);
        self.cursor += 1;
        if self.cursor >= buffer.len() {
            self.cursor = 0;
        }

        let (l, r) = self.equalizer.process_frame(l as f64, r as f64);
        let (l, r) = self.sweep.process_frame(l, r);
        let (l, r) = self.stereo.process_frame(l, r);
        let (l, r) = self.master.process_frame(l, r);

        ((l * level) as f32, (r * level) as f32)
    }
}
