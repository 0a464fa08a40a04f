use crate::models::{SessionSummary, SleepStage};

pub fn sleep_coaching_prompt(summary: &SessionSummary) -> String {
    let deep = summary.minutes_in(SleepStage::Deep);
    let rem = summary.minutes_in(SleepStage::Rem);
    let light = summary.minutes_in(SleepStage::Light);

    format!(
        "Act as a friendly, empathetic, and knowledgeable AI sleep coach named Mooni.
Analyze the following sleep data for a user and give one short, encouraging, actionable suggestion (2-3 sentences max) to improve their sleep quality.
Do not repeat the data back to the user. Focus on one key insight.

Sleep Data:
- Overall Sleep Score: {score}/100
- Total Sleep Time: {hours} hours and {minutes} minutes
- Deep Sleep: {deep} minutes
- REM Sleep: {rem} minutes
- Light Sleep: {light} minutes
- Awakenings: {awakenings}

Keep it gentle and positive. If deep sleep is low, suggest a relaxing pre-bed activity. If awakenings are high, suggest limiting liquids before bed.",
        score = summary.sleep_score,
        hours = summary.total_sleep_time / 60,
        minutes = summary.total_sleep_time % 60,
        awakenings = summary.awakenings,
    )
}

pub fn moon_phase_prompt(phase_name: &str) -> String {
    format!(
        "Give a very short (one sentence) and soothing sleep tip related to the current moon phase: {phase_name}.
The tone should be calm and mystical, like a gentle whisper from the moon itself."
    )
}
