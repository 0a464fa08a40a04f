#[cfg(feature = "sound")]
use std::time::Duration;

use super::brown_noise::{BrownNoise, OnePole, SAMPLE_RATE};

const CRICKET_HZ: f32 = 4500.0;
/// One chirp pulse, in samples (~25 ms).
const PULSE_LEN: u32 = SAMPLE_RATE / 40;

/// Night forest: soft wind through leaves plus distant crickets.
pub struct ForestNight {
    noise: BrownNoise,
    wind: OnePole,
    cricket_phase: f32,
    /// Samples left in the current chirp pulse
    pulse_left: u32,
    /// Pulses left in the current chirp train
    pulses_left: u32,
    /// Silence before the next pulse
    gap_left: u32,
}

impl ForestNight {
    pub fn new() -> Self {
        Self::from_noise(BrownNoise::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_noise(BrownNoise::with_seed(seed))
    }

    fn from_noise(noise: BrownNoise) -> Self {
        Self {
            noise,
            wind: OnePole::default(),
            cricket_phase: 0.0,
            pulse_left: 0,
            pulses_left: 0,
            gap_left: SAMPLE_RATE / 2,
        }
    }

    fn cricket(&mut self) -> f32 {
        if self.pulse_left > 0 {
            self.pulse_left -= 1;
            self.cricket_phase += std::f32::consts::TAU * CRICKET_HZ / SAMPLE_RATE as f32;
            if self.cricket_phase > std::f32::consts::TAU {
                self.cricket_phase -= std::f32::consts::TAU;
            }
            // Fade each pulse in and out
            let t = self.pulse_left as f32 / PULSE_LEN as f32;
            let envelope = (t * std::f32::consts::PI).sin();
            return self.cricket_phase.sin() * envelope * 0.08;
        }

        if self.gap_left > 0 {
            self.gap_left -= 1;
            return 0.0;
        }

        if self.pulses_left == 0 {
            // New train of 3-5 pulses after 0.5-2.5 s of quiet
            self.pulses_left = 3 + (self.noise.chance() * 3.0) as u32;
            self.gap_left = SAMPLE_RATE / 2 + (self.noise.chance() * 2.0 * SAMPLE_RATE as f32) as u32;
            return 0.0;
        }

        self.pulses_left -= 1;
        self.pulse_left = PULSE_LEN;
        self.gap_left = if self.pulses_left == 0 { 0 } else { PULSE_LEN };
        0.0
    }
}

impl Default for ForestNight {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for ForestNight {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let wind = self.wind.process(self.noise.sample(), 0.08) * 0.6;
        let crickets = self.cricket();
        Some((wind + crickets).clamp(-1.0, 1.0))
    }
}

#[cfg(feature = "sound")]
impl rodio::Source for ForestNight {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
