//! Playback transport — start/stop state machine with linear fades.

/// Fade-in and fade-out length, in seconds.
pub const FADE_SECONDS: f64 = 0.05;

/// Transport states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    /// Fading in from silence.
    Starting,
    Playing,
    /// Fading out toward silence.
    Stopping,
}

/// Output level envelope for the source, driven one sample at a time.
#[derive(Debug, Clone)]
pub struct Transport {
    state: TransportState,
    level: f64,
    ramp_samples: usize,
    ramp_counter: usize,
    /// Level at the start of the fade-out.
    start_level: f64,
    /// Start requested while fading out; restart once silent.
    start_pending: bool,
    /// Set whenever the source must rewind to its first frame.
    rewind: bool,
}

impl Transport {
    pub fn new(sample_rate: f64) -> Self {
        Transport {
            state: TransportState::Stopped,
            level: 0.0,
            ramp_samples: ((FADE_SECONDS * sample_rate).round() as usize).max(1),
            ramp_counter: 0,
            start_level: 0.0,
            start_pending: false,
            rewind: false,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_stopped(&self) -> bool {
        self.state == TransportState::Stopped
    }

    /// Starting or Playing: the source is meant to be heard.
    pub fn is_running(&self) -> bool {
        matches!(self.state, TransportState::Starting | TransportState::Playing)
    }

    /// Request playback. A no-op while already running; while fading out
    /// the fade completes first and playback restarts from silence.
    pub fn start(&mut self) {
        match self.state {
            TransportState::Stopped => self.enter_starting(),
            TransportState::Stopping => self.start_pending = true,
            TransportState::Starting | TransportState::Playing => {}
        }
    }

    /// Request a fade-out to silence.
    pub fn stop(&mut self) {
        match self.state {
            TransportState::Starting | TransportState::Playing => {
                self.state = TransportState::Stopping;
                self.ramp_counter = 0;
                self.start_level = self.level;
            }
            TransportState::Stopping => self.start_pending = false,
            TransportState::Stopped => {}
        }
    }

    /// Rewind the source and fade in again from silence. Only acts while
    /// running; the level drop is the accepted seam of a source switch.
    pub fn restart(&mut self) {
        if self.is_running() {
            self.enter_starting();
        }
    }

    /// Consume the rewind flag.
    #[inline]
    pub fn take_rewind(&mut self) -> bool {
        std::mem::take(&mut self.rewind)
    }

    /// Generate the next level sample [0, 1].
    #[inline]
    pub fn next_level(&mut self) -> f64 {
        match self.state {
            TransportState::Stopped => {
                self.level = 0.0;
            }
            TransportState::Starting => {
                self.level = self.ramp_counter as f64 / self.ramp_samples as f64;
                self.ramp_counter += 1;
                if self.ramp_counter > self.ramp_samples {
                    self.level = 1.0;
                    self.state = TransportState::Playing;
                }
            }
            TransportState::Playing => {
                self.level = 1.0;
            }
            TransportState::Stopping => {
                let t = self.ramp_counter as f64 / self.ramp_samples as f64;
                self.level = self.start_level * (1.0 - t);
                self.ramp_counter += 1;
                if self.ramp_counter > self.ramp_samples {
                    self.level = 0.0;
                    self.state = TransportState::Stopped;
                    if std::mem::take(&mut self.start_pending) {
                        self.enter_starting();
                    }
                }
            }
        }
        self.level
    }

    fn enter_starting(&mut self) {
        self.state = TransportState::Starting;
        self.level = 0.0;
        self.ramp_counter = 0;
        self.rewind = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44100.0;

    fn run(t: &mut Transport, n: usize) -> Vec<f64> {
        (0..n).map(|_| t.next_level()).collect()
    }

    #[test]
    fn starts_stopped_and_silent() {
        let mut t = Transport::new(SR);
        assert!(t.is_stopped());
        assert!(!t.take_rewind());
        assert!(run(&mut t, 100).iter().all(|&l| l == 0.0));
    }

    #[test]
    fn fade_in_reaches_playing() {
        let mut t = Transport::new(SR);
        t.start();
        assert_eq!(t.state(), TransportState::Starting);
        assert!(t.take_rewind());
        let levels = run(&mut t, 2205 + 10);
        assert_eq!(levels[0], 0.0);
        assert!((levels[1] - 1.0 / 2205.0).abs() < 1e-12);
        assert_eq!(t.state(), TransportState::Playing);
        assert_eq!(*levels.last().unwrap(), 1.0);
    }

    #[test]
    fn fade_out_reaches_stopped() {
        let mut t = Transport::new(SR);
        t.start();
        run(&mut t, 3000);
        t.stop();
        assert_eq!(t.state(), TransportState::Stopping);
        let levels = run(&mut t, 2205 + 10);
        assert_eq!(levels[0], 1.0);
        assert!(t.is_stopped());
        assert_eq!(*levels.last().unwrap(), 0.0);
    }

    #[test]
    fn start_stop_start_has_no_level_jump() {
        let mut t = Transport::new(SR);
        let max_step = 1.0 / 2205.0 + 1e-12;
        let mut levels = Vec::new();
        t.start();
        levels.extend(run(&mut t, 1000)); // stop mid fade-in
        t.stop();
        levels.extend(run(&mut t, 500)); // start mid fade-out
        t.start();
        levels.extend(run(&mut t, 6000));
        t.stop();
        levels.extend(run(&mut t, 3000));
        t.start();
        levels.extend(run(&mut t, 3000));

        for (i, w) in levels.windows(2).enumerate() {
            assert!(
                (w[1] - w[0]).abs() <= max_step,
                "Level jump {} at sample {i}",
                (w[1] - w[0]).abs()
            );
        }
        assert_eq!(t.state(), TransportState::Playing);
    }

    #[test]
    fn start_during_fade_out_waits_for_silence() {
        let mut t = Transport::new(SR);
        t.start();
        run(&mut t, 3000);
        t.take_rewind();
        t.stop();
        run(&mut t, 100);
        t.start();
        assert_eq!(t.state(), TransportState::Stopping);
        assert!(!t.take_rewind());
        run(&mut t, 2205);
        assert_eq!(t.state(), TransportState::Starting);
        assert!(t.take_rewind());
    }

    #[test]
    fn stop_cancels_pending_start() {
        let mut t = Transport::new(SR);
        t.start();
        run(&mut t, 3000);
        t.stop();
        t.start();
        t.stop();
        run(&mut t, 3000);
        assert!(t.is_stopped());
    }

    #[test]
    fn restart_rewinds_only_while_running() {
        let mut t = Transport::new(SR);
        t.restart();
        assert!(t.is_stopped());
        assert!(!t.take_rewind());

        t.start();
        run(&mut t, 3000);
        t.take_rewind();
        t.restart();
        assert_eq!(t.state(), TransportState::Starting);
        assert!(t.take_rewind());
        assert_eq!(t.next_level(), 0.0);
    }
}
