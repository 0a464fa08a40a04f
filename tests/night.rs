//! End-to-end flows through the root controller with a scripted text
//! generator and silent audio output.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::Notify;
use mooni_lib::audio::{AudioMixer, SilentOutput};
use mooni_lib::coach::{CoachError, CoachingTipRequester, TextGenerator, FALLBACK_TIP};
use mooni_lib::models::{SessionSummary, SleepStage, StageSegment};
use mooni_lib::router::{AppController, CoachPanel, NavView};
use mooni_lib::simulation::{SimulationConfig, StdRandom};
use mooni_lib::tracker::{SleepTracker, TrackerConfig, TrackerStatus};

#[derive(Default)]
struct CannedCoach {
    calls: AtomicUsize,
}

impl TextGenerator for CannedCoach {
    async fn generate(&self, prompt: &str) -> Result<String, CoachError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains("moon phase") {
            Ok("Let the moonlight slow your breath.".into())
        } else {
            Ok("Try dimming the lights an hour before bed.".into())
        }
    }
}

struct Offline;

impl TextGenerator for Offline {
    async fn generate(&self, _prompt: &str) -> Result<String, CoachError> {
        Err(CoachError::MissingApiKey)
    }
}

/// Holds the first answer until released; later calls answer at once.
#[derive(Default)]
struct HeldCoach {
    calls: AtomicUsize,
    release: Notify,
}

impl TextGenerator for HeldCoach {
    async fn generate(&self, _prompt: &str) -> Result<String, CoachError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.release.notified().await;
            return Ok("tip for the first night".into());
        }
        Ok("tip for the second night".into())
    }
}

fn night(minutes: u32, score: u8) -> Arc<SessionSummary> {
    Arc::new(SessionSummary {
        total_sleep_time: minutes,
        stages: vec![StageSegment::new(SleepStage::Light, minutes)],
        sleep_score: score,
        awakenings: 0,
    })
}

fn app<G: TextGenerator>(generator: G) -> AppController<G> {
    AppController::new(
        SleepTracker::new(
            TrackerConfig::default(),
            SimulationConfig::default(),
            Box::new(StdRandom::seeded(42)),
        ),
        CoachingTipRequester::new(generator),
        AudioMixer::with_output(Box::new(SilentOutput)),
    )
}

#[tokio::test(start_paused = true)]
async fn completed_night_opens_the_coach_with_a_tip() {
    let app = app(CannedCoach::default());

    app.start_sleep().await.unwrap();
    assert_eq!(app.current_view().await, NavView::Sleep);

    let summary = app.finish_sleep().await.expect("night should complete");

    let total: u32 = summary.stages.iter().map(|s| s.duration).sum();
    assert_eq!(total, summary.total_sleep_time);
    let awake = summary
        .stages
        .iter()
        .filter(|s| s.stage == SleepStage::Awake)
        .count() as u32;
    assert_eq!(awake, summary.awakenings);

    assert_eq!(app.current_view().await, NavView::AiCoach);
    assert_eq!(
        app.coach_panel().await,
        CoachPanel::Ready("Try dimming the lights an hour before bed.".into())
    );
    assert!(Arc::ptr_eq(&app.session().await.unwrap(), &summary));

    let snapshot = app.snapshot().await.unwrap();
    assert_eq!(snapshot.tracker.state.status, TrackerStatus::Idle);
    assert_eq!(snapshot.session.as_ref(), Some(&*summary));
}

#[tokio::test(start_paused = true)]
async fn leaving_the_sleep_screen_cancels_the_night() {
    let app = Arc::new(app(CannedCoach::default()));
    app.start_sleep().await.unwrap();

    let waiter = {
        let app = app.clone();
        tokio::spawn(async move { app.finish_sleep().await })
    };
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    app.navigate(NavView::Dashboard).await.unwrap();

    assert!(waiter.await.unwrap().is_none());
    assert!(app.session().await.is_none());
    assert_eq!(app.coach_panel().await, CoachPanel::Empty);
    assert_eq!(app.current_view().await, NavView::Dashboard);

    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(
        app.tracker().get_state().await.status,
        TrackerStatus::Idle
    );
}

#[tokio::test(start_paused = true)]
async fn offline_coach_shows_the_fallback() {
    let app = app(Offline);
    app.start_sleep().await.unwrap();
    app.finish_sleep().await.unwrap();

    assert_eq!(app.coach_panel().await, CoachPanel::Ready(FALLBACK_TIP.into()));
}

#[tokio::test(start_paused = true)]
async fn second_night_replaces_the_first() {
    let app = app(CannedCoach::default());

    app.start_sleep().await.unwrap();
    let first = app.finish_sleep().await.unwrap();
    app.start_sleep().await.unwrap();
    let second = app.finish_sleep().await.unwrap();

    let current = app.session().await.unwrap();
    assert!(Arc::ptr_eq(&current, &second));
    assert!(!Arc::ptr_eq(&current, &first));
}

#[tokio::test]
async fn moon_tip_replaces_the_placeholder() {
    let app = app(CannedCoach::default());
    assert_eq!(app.moon_tip().await, "Embrace the quiet of the cosmos...");

    let full_moon = Utc.with_ymd_and_hms(2023, 2, 5, 18, 0, 0).unwrap();
    let phase = app.refresh_moon_tip(full_moon).await;

    assert_eq!(phase.name(), "Full Moon");
    assert_eq!(app.moon_tip().await, "Let the moonlight slow your breath.");
}

#[tokio::test]
async fn dreams_return_to_the_dashboard() {
    let app = app(CannedCoach::default());
    app.navigate(NavView::Journal).await.unwrap();

    assert!(app.add_dream("   ").await.is_none());
    assert_eq!(app.current_view().await, NavView::Journal);

    let entry = app.add_dream(" a lighthouse made of glass ").await.unwrap();
    assert_eq!(entry.text, "a lighthouse made of glass");
    assert_eq!(app.current_view().await, NavView::Dashboard);

    let snapshot = app.snapshot().await.unwrap();
    assert_eq!(snapshot.dreams.len(), 1);
}

#[tokio::test]
async fn leaving_sounds_stops_the_mix() {
    let app = app(CannedCoach::default());
    app.navigate(NavView::Sounds).await.unwrap();
    app.mixer().toggle("rain").unwrap();
    app.mixer().set_volume("rain", 0.8).unwrap();
    assert!(app.mixer().any_playing().unwrap());

    app.navigate(NavView::Journal).await.unwrap();

    assert!(!app.mixer().any_playing().unwrap());
}

#[tokio::test]
async fn routine_items_toggle() {
    let app = app(CannedCoach::default());
    assert_eq!(app.toggle_routine(3).await, Some(true));
    assert_eq!(app.toggle_routine(42).await, None);

    let snapshot = app.snapshot().await.unwrap();
    assert!(snapshot.routine.iter().find(|i| i.id == 3).unwrap().done);
}

#[tokio::test]
async fn late_tip_for_a_replaced_night_is_never_shown() {
    let app = Arc::new(app(HeldCoach::default()));
    let first = night(430, 70);
    let second = night(470, 80);

    let pending = {
        let app = app.clone();
        let first = first.clone();
        tokio::spawn(async move { app.complete_session(first).await })
    };
    while app.coach().generator().calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let shown = app.complete_session(second.clone()).await;
    assert_eq!(shown.as_deref(), Some("tip for the second night"));

    app.coach().generator().release.notify_one();
    assert!(pending.await.unwrap().is_none());

    assert!(Arc::ptr_eq(&app.session().await.unwrap(), &second));
    assert_eq!(
        app.coach_panel().await,
        CoachPanel::Ready("tip for the second night".into())
    );
}
