pub mod client;
pub mod error;
pub mod prompts;
pub mod requester;

mod http;

pub use client::{GeminiClient, TextGenerator};
pub use error::CoachError;
pub use requester::{CoachingTipRequester, FALLBACK_TIP, MOON_TIP_PLACEHOLDER};
