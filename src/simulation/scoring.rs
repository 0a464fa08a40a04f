use crate::simulation::config::SimulationConfig;

/// Sleep quality score in `0..=100`.
///
/// Each term can overshoot its nominal share (a 9h night is worth more than
/// 50 points) before the final clamp.
pub fn sleep_score(
    total_minutes: u32,
    deep_ratio: f64,
    rem_ratio: f64,
    awakenings: u32,
    config: &SimulationConfig,
) -> u8 {
    let duration_score = config.weight_duration * (total_minutes as f64 / config.ideal_total_minutes);
    let deep_score = config.weight_deep * (deep_ratio / config.deep_proportion);
    let rem_score = config.weight_rem * (rem_ratio / config.rem_proportion);
    let penalty = config.awakening_penalty * awakenings as f64;

    let raw = duration_score + deep_score + rem_score - penalty;
    raw.round().clamp(0.0, 100.0) as u8
}
