pub mod journal;
pub mod sleep;

pub use journal::DreamEntry;
pub use sleep::{SessionSummary, SleepStage, StageSegment};
