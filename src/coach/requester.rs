use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error};

use super::client::TextGenerator;
use super::prompts::{moon_phase_prompt, sleep_coaching_prompt};
use crate::models::SessionSummary;

pub const FALLBACK_TIP: &str =
    "I'm having a little trouble thinking right now. Please try again in a moment.";

pub const MOON_TIP_PLACEHOLDER: &str = "Embrace the quiet of the cosmos...";

/// Produces coaching tips and never fails.
///
/// Sleep tips and moon tips keep separate generation counters. A result is
/// only handed back if no newer request of the same kind started while it
/// was in flight.
pub struct CoachingTipRequester<G> {
    generator: G,
    sleep_generation: AtomicU64,
    moon_generation: AtomicU64,
}

impl<G: TextGenerator> CoachingTipRequester<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            sleep_generation: AtomicU64::new(0),
            moon_generation: AtomicU64::new(0),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Tip for a finished night, or the fallback on any failure.
    pub async fn sleep_tip(&self, summary: &SessionSummary) -> String {
        self.ask(&sleep_coaching_prompt(summary)).await
    }

    pub async fn moon_tip(&self, phase_name: &str) -> String {
        self.ask(&moon_phase_prompt(phase_name)).await
    }

    /// Like [`sleep_tip`](Self::sleep_tip) but `None` when superseded.
    pub async fn request_sleep_tip(&self, summary: &SessionSummary) -> Option<String> {
        let generation = self.sleep_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let tip = self.sleep_tip(summary).await;
        current_or_none(&self.sleep_generation, generation, tip, "sleep")
    }

    pub async fn request_moon_tip(&self, phase_name: &str) -> Option<String> {
        let generation = self.moon_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let tip = self.moon_tip(phase_name).await;
        current_or_none(&self.moon_generation, generation, tip, "moon")
    }

    async fn ask(&self, prompt: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("Error calling text generation API: {}", e);
                FALLBACK_TIP.to_string()
            }
        }
    }
}

fn current_or_none(counter: &AtomicU64, generation: u64, tip: String, kind: &str) -> Option<String> {
    if counter.load(Ordering::SeqCst) == generation {
        Some(tip)
    } else {
        debug!("Dropping stale {} tip from request {}", kind, generation);
        None
    }
}
