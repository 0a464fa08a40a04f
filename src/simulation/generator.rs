use crate::models::{SessionSummary, SleepStage, StageSegment};
use crate::simulation::config::SimulationConfig;
use crate::simulation::random::RandomSource;
use crate::simulation::scoring::sleep_score;

/// Generate one simulated night.
///
/// Draw order per iteration is stage, duration, awakening check and, only
/// when the check fires, the awake length. Scripted sources in tests rely
/// on this order.
pub fn generate_session<R: RandomSource + ?Sized>(
    rng: &mut R,
    config: &SimulationConfig,
) -> SessionSummary {
    let total_minutes = config.min_total_minutes + rng.next_below(config.total_minutes_span);
    let mut remaining = total_minutes;
    let mut stages = Vec::new();
    let mut awakenings = 0;

    while remaining > 0 {
        let stage = pick_stage(rng.next_unit(), config);

        let drawn = config.min_segment_minutes + rng.next_below(config.segment_minutes_span);
        let duration = drawn.min(remaining);

        if rng.next_unit() > config.awakening_threshold && remaining > duration {
            let awake = config.min_awake_minutes + rng.next_below(config.awake_minutes_span);
            // Only interrupt if sleep time is still left after both blocks
            if remaining - duration > awake {
                stages.push(StageSegment::new(SleepStage::Awake, awake));
                remaining -= awake;
                awakenings += 1;
            }
        }

        stages.push(StageSegment::new(stage, duration));
        remaining -= duration;
    }

    summarize(total_minutes, stages, awakenings, config)
}

fn pick_stage(draw: f64, config: &SimulationConfig) -> SleepStage {
    if draw < config.deep_proportion {
        SleepStage::Deep
    } else if draw < config.deep_proportion + config.rem_proportion {
        SleepStage::Rem
    } else {
        SleepStage::Light
    }
}

fn summarize(
    total_minutes: u32,
    stages: Vec<StageSegment>,
    awakenings: u32,
    config: &SimulationConfig,
) -> SessionSummary {
    let mut summary = SessionSummary {
        total_sleep_time: total_minutes,
        stages,
        sleep_score: 0,
        awakenings,
    };
    summary.sleep_score = sleep_score(
        total_minutes,
        summary.ratio_of(SleepStage::Deep),
        summary.ratio_of(SleepStage::Rem),
        awakenings,
        config,
    );
    summary
}
