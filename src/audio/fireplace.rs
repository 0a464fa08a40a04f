#[cfg(feature = "sound")]
use std::time::Duration;

use super::brown_noise::{BrownNoise, OnePole, SAMPLE_RATE};

/// Average crackles per second.
const CRACKLE_RATE: f32 = 6.0;

/// Low fire rumble with random crackles and pops.
pub struct Fireplace {
    noise: BrownNoise,
    rumble: OnePole,
    /// Current crackle amplitude, decays every sample
    crackle: f32,
}

impl Fireplace {
    pub fn new() -> Self {
        Self::from_noise(BrownNoise::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_noise(BrownNoise::with_seed(seed))
    }

    fn from_noise(noise: BrownNoise) -> Self {
        Self {
            noise,
            rumble: OnePole::default(),
            crackle: 0.0,
        }
    }
}

impl Default for Fireplace {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Fireplace {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let rumble = self.rumble.process(self.noise.sample(), 0.02) * 1.5;

        if self.noise.chance() < CRACKLE_RATE / SAMPLE_RATE as f32 {
            self.crackle = 0.2 + self.noise.chance() * 0.4;
        }
        let pop = self.noise.white() * self.crackle;
        // ~5 ms decay
        self.crackle *= 0.995;

        Some((rumble + pop).clamp(-1.0, 1.0))
    }
}

#[cfg(feature = "sound")]
impl rodio::Source for Fireplace {
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
