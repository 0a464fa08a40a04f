pub mod config;
pub mod generator;
pub mod random;
pub mod scoring;

pub use config::SimulationConfig;
pub use generator::generate_session;
pub use random::{RandomSource, StdRandom};
pub use scoring::sleep_score;
