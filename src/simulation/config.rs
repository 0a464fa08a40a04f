/// Tunable constants for the night generator and the score.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Shortest night in minutes (7h)
    pub min_total_minutes: u32,
    /// Number of distinct totals above the minimum (420 + 0..120 => 7h to 8h59)
    pub total_minutes_span: u32,

    /// Segment length draw: min + 0..span
    pub min_segment_minutes: u32,
    pub segment_minutes_span: u32,

    /// Awake interruption length draw: min + 0..span
    pub min_awake_minutes: u32,
    pub awake_minutes_span: u32,
    /// Draws above this value insert an awakening (0.95 => 5%)
    pub awakening_threshold: f64,

    /// Stage pick thresholds, compared cumulatively: Deep, then REM, else Light
    pub deep_proportion: f64,
    pub rem_proportion: f64,

    /// Score targets and weights
    pub ideal_total_minutes: f64,
    pub weight_duration: f64,
    pub weight_deep: f64,
    pub weight_rem: f64,
    pub awakening_penalty: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_total_minutes: 420,
            total_minutes_span: 120,
            min_segment_minutes: 30,
            segment_minutes_span: 60,
            min_awake_minutes: 2,
            awake_minutes_span: 5,
            awakening_threshold: 0.95,
            deep_proportion: 0.20,
            rem_proportion: 0.25,
            ideal_total_minutes: 480.0,
            weight_duration: 50.0,
            weight_deep: 25.0,
            weight_rem: 25.0,
            awakening_penalty: 5.0,
        }
    }
}
