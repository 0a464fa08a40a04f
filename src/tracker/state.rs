use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TrackerStatus {
    #[default]
    Idle,
    Running,
}

/// Wall-clock pacing of the "Dreaming..." animation. Independent of how
/// long the generated night is.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub tick_interval: Duration,
    pub run_duration: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            run_duration: Duration::from_millis(5000),
        }
    }
}

impl TrackerConfig {
    /// Short run used when `MOONI_DEBUG` is set.
    pub fn debug() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            run_duration: Duration::from_millis(500),
        }
    }

    pub fn total_steps(&self) -> u32 {
        let interval = self.tick_interval.as_millis().max(1);
        let steps = self.run_duration.as_millis() / interval;
        steps.clamp(1, u32::MAX as u128) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub status: TrackerStatus,
    /// Increments on every start; ticker tasks only touch the state of their own run.
    pub run_id: u64,
    /// 0.0 ..= 100.0
    pub progress: f64,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub steps_done: u32,
    #[serde(skip)]
    pub total_steps: u32,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_run(&mut self, run_id: u64, total_steps: u32, started_at: DateTime<Utc>) {
        *self = Self {
            status: TrackerStatus::Running,
            run_id,
            progress: 0.0,
            started_at: Some(started_at),
            steps_done: 0,
            total_steps: total_steps.max(1),
        };
    }

    /// Advance one tick and return the new progress percentage.
    pub fn advance(&mut self) -> f64 {
        if self.status != TrackerStatus::Running {
            return self.progress;
        }
        self.steps_done = (self.steps_done + 1).min(self.total_steps);
        self.progress = if self.is_complete() {
            100.0
        } else {
            self.steps_done as f64 / self.total_steps as f64 * 100.0
        };
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.steps_done >= self.total_steps
    }

    pub fn remaining_steps(&self) -> u32 {
        match self.status {
            TrackerStatus::Idle => 0,
            TrackerStatus::Running => self.total_steps.saturating_sub(self.steps_done),
        }
    }

    /// Back to idle, keeping the run counter.
    pub fn reset(&mut self) {
        let run_id = self.run_id;
        *self = Self {
            run_id,
            ..Self::default()
        };
    }
}
