use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use tokio::sync::{watch, Mutex};

use crate::audio::{AudioMixer, TrackState};
use crate::coach::{CoachingTipRequester, TextGenerator, MOON_TIP_PLACEHOLDER};
use crate::journal::DreamJournal;
use crate::models::{DreamEntry, SessionSummary};
use crate::moon::MoonPhase;
use crate::routine::{BedtimeRoutine, RoutineItem};
use crate::tracker::{SessionHandle, SleepTracker, TrackerSnapshot};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavView {
    #[default]
    Dashboard,
    Sounds,
    Sleep,
    AiCoach,
    Journal,
}

/// What the coach screen shows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "state", content = "tip", rename_all = "camelCase")]
pub enum CoachPanel {
    /// No session yet
    #[default]
    Empty,
    Loading,
    Ready(String),
}

/// Everything the views read. Owned by [`AppController`].
#[derive(Debug)]
pub struct AppState {
    pub view: NavView,
    pub session: Option<Arc<SessionSummary>>,
    pub coach: CoachPanel,
    pub moon: Option<MoonPhase>,
    pub moon_tip: String,
    pub journal: DreamJournal,
    pub routine: BedtimeRoutine,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: NavView::default(),
            session: None,
            coach: CoachPanel::default(),
            moon: None,
            moon_tip: MOON_TIP_PLACEHOLDER.to_string(),
            journal: DreamJournal::new(),
            routine: BedtimeRoutine::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub view: NavView,
    pub session: Option<SessionSummary>,
    pub coach: CoachPanel,
    pub moon_phase: Option<String>,
    pub moon_emoji: Option<String>,
    pub moon_tip: String,
    pub dreams: Vec<DreamEntry>,
    pub routine: Vec<RoutineItem>,
    pub tracker: TrackerSnapshot,
    pub sounds: Vec<TrackState>,
}

/// Root controller: owns the app state and wires the simulator, coach,
/// mixer and journal together.
pub struct AppController<G> {
    state: Mutex<AppState>,
    tracker: SleepTracker,
    coach: CoachingTipRequester<G>,
    mixer: AudioMixer,
    active_run: Mutex<Option<SessionHandle>>,
}

impl<G: TextGenerator> AppController<G> {
    pub fn new(tracker: SleepTracker, coach: CoachingTipRequester<G>, mixer: AudioMixer) -> Self {
        Self {
            state: Mutex::new(AppState::default()),
            tracker,
            coach,
            mixer,
            active_run: Mutex::new(None),
        }
    }

    pub fn mixer(&self) -> &AudioMixer {
        &self.mixer
    }

    pub fn tracker(&self) -> &SleepTracker {
        &self.tracker
    }

    pub fn coach(&self) -> &CoachingTipRequester<G> {
        &self.coach
    }

    pub async fn current_view(&self) -> NavView {
        self.state.lock().await.view
    }

    pub async fn session(&self) -> Option<Arc<SessionSummary>> {
        self.state.lock().await.session.clone()
    }

    pub async fn coach_panel(&self) -> CoachPanel {
        self.state.lock().await.coach.clone()
    }

    pub async fn moon_tip(&self) -> String {
        self.state.lock().await.moon_tip.clone()
    }

    /// Switch screens, tearing down whatever the old screen was running.
    pub async fn navigate(&self, view: NavView) -> Result<()> {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut state.view, view)
        };
        if previous == view {
            return Ok(());
        }

        if previous == NavView::Sleep {
            self.cancel_sleep().await;
        }
        if previous == NavView::Sounds {
            self.mixer.stop_all()?;
        }
        Ok(())
    }

    /// Go to the sleep screen and start a simulated night. Returns the run id.
    pub async fn start_sleep(&self) -> Result<u64> {
        self.navigate(NavView::Sleep).await?;
        let handle = self.tracker.start().await?;
        let run_id = handle.run_id();
        *self.active_run.lock().await = Some(handle);
        Ok(run_id)
    }

    /// Progress of the active run, if any.
    pub async fn sleep_progress(&self) -> Option<watch::Receiver<f64>> {
        self.active_run.lock().await.as_ref().map(|h| h.subscribe())
    }

    /// Wait for the active run. On completion the summary is stored, the
    /// coach screen opens and a tip is requested. `None` if there was no run,
    /// it was cancelled, or the sleep screen was left before it finished.
    pub async fn finish_sleep(&self) -> Option<Arc<SessionSummary>> {
        let handle = self.active_run.lock().await.take()?;
        let summary = Arc::new(handle.completed().await?);
        if !self.open_coach(&summary, true).await {
            info!("Dropping a night that finished after leaving the sleep screen");
            return None;
        }
        self.fetch_sleep_tip(&summary).await;
        Some(summary)
    }

    pub async fn cancel_sleep(&self) -> bool {
        // Dropping the handle cancels its ticker
        let had_handle = self.active_run.lock().await.take().is_some();
        let cancelled = self.tracker.cancel().await;
        had_handle || cancelled
    }

    /// Store a finished night and fetch its coaching tip. Returns the tip if
    /// it was displayed; a tip for an older session is dropped.
    pub async fn complete_session(&self, summary: Arc<SessionSummary>) -> Option<String> {
        self.open_coach(&summary, false).await;
        self.fetch_sleep_tip(&summary).await
    }

    async fn open_coach(&self, summary: &Arc<SessionSummary>, from_sleep: bool) -> bool {
        let mut state = self.state.lock().await;
        if from_sleep && state.view != NavView::Sleep {
            return false;
        }
        state.session = Some(summary.clone());
        state.view = NavView::AiCoach;
        state.coach = CoachPanel::Loading;
        true
    }

    async fn fetch_sleep_tip(&self, summary: &Arc<SessionSummary>) -> Option<String> {
        let tip = self.coach.request_sleep_tip(summary).await?;

        let mut state = self.state.lock().await;
        let still_current = state
            .session
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, summary));
        if !still_current {
            warn!("Discarding coaching tip for a replaced session");
            return None;
        }
        state.coach = CoachPanel::Ready(tip.clone());
        Some(tip)
    }

    /// Save a dream and go back to the dashboard. Blank notes are ignored.
    pub async fn add_dream(&self, text: &str) -> Option<DreamEntry> {
        let mut state = self.state.lock().await;
        let entry = state.journal.add(text)?;
        state.view = NavView::Dashboard;
        info!("Dream journal now has {} entries", state.journal.len());
        Some(entry)
    }

    pub async fn toggle_routine(&self, id: u32) -> Option<bool> {
        self.state.lock().await.routine.toggle(id)
    }

    /// Work out tonight's moon phase and ask for a matching tip.
    pub async fn refresh_moon_tip(&self, now: DateTime<Utc>) -> MoonPhase {
        let phase = MoonPhase::at(now);
        self.state.lock().await.moon = Some(phase);

        if let Some(tip) = self.coach.request_moon_tip(phase.name()).await {
            let mut state = self.state.lock().await;
            if state.moon == Some(phase) {
                state.moon_tip = tip;
            }
        }
        phase
    }

    pub async fn snapshot(&self) -> Result<AppSnapshot> {
        let tracker = self.tracker.snapshot().await;
        let sounds = self.mixer.tracks()?;
        let state = self.state.lock().await;
        Ok(AppSnapshot {
            view: state.view,
            session: state.session.as_deref().cloned(),
            coach: state.coach.clone(),
            moon_phase: state.moon.map(|m| m.name().to_string()),
            moon_emoji: state.moon.map(|m| m.emoji().to_string()),
            moon_tip: state.moon_tip.clone(),
            dreams: state.journal.entries().to_vec(),
            routine: state.routine.items().to_vec(),
            tracker,
            sounds,
        })
    }
}
