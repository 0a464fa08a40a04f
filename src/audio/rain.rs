#[cfg(feature = "sound")]
use std::time::Duration;

use super::brown_noise::{BrownNoise, SAMPLE_RATE};

/// Rain sound generator
/// Band-passed brown noise with slow amplitude modulation
pub struct GentleRain {
    noise: BrownNoise,
    // 2nd order bandpass filter state
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
    modulation_phase: f32,
}

impl GentleRain {
    pub fn new() -> Self {
        Self::from_noise(BrownNoise::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_noise(BrownNoise::with_seed(seed))
    }

    fn from_noise(noise: BrownNoise) -> Self {
        Self {
            noise,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            modulation_phase: 0.0,
        }
    }

    // Centre ~3 kHz, Q ~0.7 (approximated coefficients)
    fn bandpass(&mut self, input: f32) -> f32 {
        let (b0, b2) = (0.1, -0.1);
        let (a1, a2) = (-1.8, 0.85);

        let output = b0 * input + b2 * self.x2 - a1 * self.y1 - a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

impl Default for GentleRain {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for GentleRain {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let brown = self.noise.sample();
        let filtered = self.bandpass(brown);

        self.modulation_phase += 0.3 / SAMPLE_RATE as f32;
        if self.modulation_phase > std::f32::consts::TAU {
            self.modulation_phase -= std::f32::consts::TAU;
        }
        let modulation = 0.7 + 0.3 * self.modulation_phase.sin();

        let mix = filtered * 0.8 + brown * 0.2;
        Some((mix * modulation * 0.4).clamp(-1.0, 1.0))
    }
}

#[cfg(feature = "sound")]
impl rodio::Source for GentleRain {
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
