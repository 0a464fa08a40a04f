pub mod controller;
pub mod state;

pub use controller::{SessionHandle, SleepTracker, TrackerSnapshot};
pub use state::{TrackerConfig, TrackerState, TrackerStatus};
