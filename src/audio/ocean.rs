#[cfg(feature = "sound")]
use std::time::Duration;

use super::brown_noise::{BrownNoise, OnePole, SAMPLE_RATE};

/// Seconds per wave.
const SWELL_PERIOD_SECS: f32 = 9.0;

/// Low-passed brown noise swelling in and out like waves on a beach.
pub struct OceanWaves {
    noise: BrownNoise,
    lowpass: OnePole,
    swell_phase: f32,
}

impl OceanWaves {
    pub fn new() -> Self {
        Self::from_noise(BrownNoise::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_noise(BrownNoise::with_seed(seed))
    }

    fn from_noise(noise: BrownNoise) -> Self {
        Self {
            noise,
            lowpass: OnePole::default(),
            swell_phase: 0.0,
        }
    }
}

impl Default for OceanWaves {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for OceanWaves {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.swell_phase += std::f32::consts::TAU / (SWELL_PERIOD_SECS * SAMPLE_RATE as f32);
        if self.swell_phase > std::f32::consts::TAU {
            self.swell_phase -= std::f32::consts::TAU;
        }
        // Squared sine: long quiet trough, short crest
        let swell = 0.5 + 0.5 * self.swell_phase.sin();
        let envelope = 0.15 + 0.85 * swell * swell;

        // Brighter wash on the crest
        let cutoff = 0.05 + 0.25 * swell;
        let body = self.lowpass.process(self.noise.sample(), cutoff);
        let foam = self.noise.white() * 0.03 * swell;

        Some(((body * 2.0 + foam) * envelope * 0.5).clamp(-1.0, 1.0))
    }
}

#[cfg(feature = "sound")]
impl rodio::Source for OceanWaves {
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
