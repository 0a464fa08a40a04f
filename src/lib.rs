pub mod audio;
pub mod coach;
pub mod config;
pub mod journal;
pub mod models;
pub mod moon;
pub mod routine;
pub mod router;
pub mod simulation;
pub mod tracker;

use anyhow::Result;
use chrono::Utc;
use log::info;

use audio::AudioMixer;
use coach::{CoachingTipRequester, GeminiClient};
use config::AppConfig;
use router::AppController;
use tracker::SleepTracker;

pub type MooniApp = AppController<GeminiClient>;

/// Wire up the controller from configuration.
pub fn build_app(config: &AppConfig) -> Result<MooniApp> {
    let client = GeminiClient::new(config)?;
    Ok(AppController::new(
        SleepTracker::with_entropy(config.tracker_config()),
        CoachingTipRequester::new(client),
        AudioMixer::new(),
    ))
}

/// Headless night: moon tip, one simulated session, coaching tip.
pub async fn run_night(app: &MooniApp) -> Result<()> {
    let phase = app.refresh_moon_tip(Utc::now()).await;
    info!("{} {}: {}", phase.emoji(), phase.name(), app.moon_tip().await);

    let run_id = app.start_sleep().await?;
    if let Some(mut progress) = app.sleep_progress().await {
        tokio::spawn(async move {
            let mut next_mark = 25.0;
            while progress.changed().await.is_ok() {
                let value = *progress.borrow_and_update();
                if value >= next_mark {
                    log::debug!("Sleep session {} at {:.0}%", run_id, value);
                    next_mark += 25.0;
                }
            }
        });
    }

    let Some(summary) = app.finish_sleep().await else {
        info!("Sleep session {} was cancelled", run_id);
        return Ok(());
    };

    let chart: String = summary
        .stages
        .iter()
        .map(|s| format!("{}{}", s.stage.initial(), s.duration))
        .collect::<Vec<_>>()
        .join(" ");
    info!(
        "Last night: {} | score {} | {} awakenings | {}",
        summary.formatted_duration(),
        summary.sleep_score,
        summary.awakenings,
        chart
    );
    info!("Mooni's memo: {:?}", app.coach_panel().await);
    Ok(())
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Mooni starting up...");

    let config = AppConfig::load()?;
    log::debug!("Loaded {:?}", config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let app = build_app(&config)?;
        run_night(&app).await
    })
}
