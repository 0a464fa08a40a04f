use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SleepStage {
    Awake,
    Light,
    Deep,
    Rem,
}

impl SleepStage {
    /// Single-letter label used on the stage bar chart.
    pub fn initial(&self) -> char {
        match self {
            SleepStage::Awake => 'A',
            SleepStage::Light => 'L',
            SleepStage::Deep => 'D',
            SleepStage::Rem => 'R',
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StageSegment {
    pub stage: SleepStage,
    /// Minutes, always > 0.
    pub duration: u32,
}

impl StageSegment {
    pub fn new(stage: SleepStage, duration: u32) -> Self {
        Self { stage, duration }
    }
}

/// Result of one simulated night.
///
/// `total_sleep_time` counts every segment, awake interruptions included,
/// so it reads as time in bed rather than time asleep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_sleep_time: u32,
    pub stages: Vec<StageSegment>,
    pub sleep_score: u8,
    pub awakenings: u32,
}

impl SessionSummary {
    pub fn minutes_in(&self, stage: SleepStage) -> u32 {
        self.stages
            .iter()
            .filter(|s| s.stage == stage)
            .map(|s| s.duration)
            .sum()
    }

    pub fn ratio_of(&self, stage: SleepStage) -> f64 {
        if self.total_sleep_time == 0 {
            return 0.0;
        }
        self.minutes_in(stage) as f64 / self.total_sleep_time as f64
    }

    /// `"7h 32m"` style rendering of the total time.
    pub fn formatted_duration(&self) -> String {
        format!(
            "{}h {}m",
            self.total_sleep_time / 60,
            self.total_sleep_time % 60
        )
    }
}
