use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SAMPLE_RATE: u32 = 44100;

/// Brown (red) noise: integrated white noise, -6 dB per octave.
/// Base layer for the ocean, rain and fireplace loops.
pub struct BrownNoise {
    last_value: f32,
    rng: StdRng,
}

impl BrownNoise {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            last_value: 0.0,
            rng,
        }
    }

    /// Raw white noise sample in `[-1, 1)` from the same generator.
    pub fn white(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn chance(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    pub fn sample(&mut self) -> f32 {
        let white = self.white();
        // Small steps, clamped, with a slight decay against DC drift
        self.last_value += white * 0.02;
        self.last_value = self.last_value.clamp(-1.0, 1.0);
        self.last_value *= 0.9999;
        self.last_value
    }
}

impl Default for BrownNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// Tiny one-pole low-pass used to soften the noise layers.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnePole {
    state: f32,
}

impl OnePole {
    pub fn process(&mut self, input: f32, coefficient: f32) -> f32 {
        self.state += coefficient * (input - self.state);
        self.state
    }
}
