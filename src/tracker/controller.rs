use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use tokio::{
    sync::{oneshot, watch, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::SessionSummary;
use crate::simulation::{generate_session, RandomSource, SimulationConfig, StdRandom};

use super::{TrackerConfig, TrackerState, TrackerStatus};

pub type SharedRandom = Box<dyn RandomSource + Send>;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub state: TrackerState,
    pub remaining_ms: u64,
}

struct ActiveRun {
    run_id: u64,
    token: CancellationToken,
    ticker: JoinHandle<()>,
}

/// Drives the simulated night: Idle -> Running -> Idle, delivering one
/// [`SessionSummary`] per completed run.
#[derive(Clone)]
pub struct SleepTracker {
    state: Arc<Mutex<TrackerState>>,
    active: Arc<Mutex<Option<ActiveRun>>>,
    rng: Arc<Mutex<SharedRandom>>,
    simulation: Arc<SimulationConfig>,
    config: TrackerConfig,
}

impl SleepTracker {
    pub fn new(config: TrackerConfig, simulation: SimulationConfig, rng: SharedRandom) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState::new())),
            active: Arc::new(Mutex::new(None)),
            rng: Arc::new(Mutex::new(rng)),
            simulation: Arc::new(simulation),
            config,
        }
    }

    pub fn with_entropy(config: TrackerConfig) -> Self {
        Self::new(
            config,
            SimulationConfig::default(),
            Box::new(StdRandom::from_entropy()),
        )
    }

    pub async fn get_state(&self) -> TrackerState {
        self.state.lock().await.clone()
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        let guard = self.state.lock().await;
        let remaining_ms =
            guard.remaining_steps() as u64 * self.config.tick_interval.as_millis() as u64;
        TrackerSnapshot {
            state: guard.clone(),
            remaining_ms,
        }
    }

    /// Start a run. Fails if one is already in progress.
    pub async fn start(&self) -> Result<SessionHandle> {
        let mut active = self.active.lock().await;

        if let Some(run) = active.as_ref() {
            if !run.token.is_cancelled() && !run.ticker.is_finished() {
                return Err(anyhow!("sleep session already running"));
            }
        }
        // A cancelled run may not have noticed its token yet
        if let Some(stale) = active.take() {
            stale.ticker.abort();
        }

        let total_steps = self.config.total_steps();
        let run_id = {
            let mut state = self.state.lock().await;
            let run_id = state.run_id + 1;
            state.begin_run(run_id, total_steps, Utc::now());
            run_id
        };

        let token = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(0.0);
        let (completion_tx, completion_rx) = oneshot::channel();

        let ticker = self.spawn_ticker(run_id, token.clone(), progress_tx, completion_tx);

        *active = Some(ActiveRun {
            run_id,
            token: token.clone(),
            ticker,
        });

        info!(
            "Sleep session {} started ({} ticks of {:?})",
            run_id, total_steps, self.config.tick_interval
        );

        Ok(SessionHandle {
            run_id,
            token,
            progress: progress_rx,
            completion: Some(completion_rx),
        })
    }

    /// Stop the active run without delivering a summary. Returns `false` when
    /// idle or when the run had already delivered.
    pub async fn cancel(&self) -> bool {
        let Some(run) = self.active.lock().await.take() else {
            return false;
        };

        run.token.cancel();
        run.ticker.abort();

        let mut state = self.state.lock().await;
        let was_running = state.run_id == run.run_id && state.status == TrackerStatus::Running;
        if state.run_id == run.run_id {
            state.reset();
        }
        if was_running {
            info!("Sleep session {} cancelled", run.run_id);
        }
        was_running
    }

    fn spawn_ticker(
        &self,
        run_id: u64,
        token: CancellationToken,
        progress_tx: watch::Sender<f64>,
        completion_tx: oneshot::Sender<SessionSummary>,
    ) -> JoinHandle<()> {
        let state = self.state.clone();
        let rng = self.rng.clone();
        let simulation = self.simulation.clone();
        let tick_interval = self.config.tick_interval;

        tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        release_run(&state, run_id).await;
                        debug!("Ticker for sleep session {} stopped", run_id);
                        return;
                    }
                    _ = interval.tick() => {}
                }

                let (progress, complete) = {
                    let mut guard = state.lock().await;
                    if guard.run_id != run_id || guard.status != TrackerStatus::Running {
                        return;
                    }
                    let progress = guard.advance();
                    (progress, guard.is_complete())
                };
                let _ = progress_tx.send(progress);

                if complete {
                    if token.is_cancelled() {
                        release_run(&state, run_id).await;
                        return;
                    }
                    let summary = {
                        let mut rng = rng.lock().await;
                        generate_session(&mut *rng, &simulation)
                    };

                    // Delivery and cancel() both settle the run under the
                    // state lock; only the first one counts.
                    let delivered = {
                        let mut guard = state.lock().await;
                        let live = guard.run_id == run_id
                            && guard.status == TrackerStatus::Running
                            && !token.is_cancelled();
                        if live {
                            guard.reset();
                        }
                        live
                    };
                    if !delivered {
                        debug!("Sleep session {} cancelled during generation", run_id);
                        return;
                    }

                    info!(
                        "Sleep session {} complete: {} ({} min), score {}, {} awakenings",
                        run_id,
                        summary.formatted_duration(),
                        summary.total_sleep_time,
                        summary.sleep_score,
                        summary.awakenings
                    );
                    let _ = completion_tx.send(summary);
                    return;
                }
            }
        })
    }
}

async fn release_run(state: &Mutex<TrackerState>, run_id: u64) {
    let mut guard = state.lock().await;
    if guard.run_id == run_id {
        guard.reset();
    }
}

/// Owner-side view of a running session.
///
/// Dropping the handle cancels the run: the ticker stops and no summary is
/// delivered.
pub struct SessionHandle {
    run_id: u64,
    token: CancellationToken,
    progress: watch::Receiver<f64>,
    completion: Option<oneshot::Receiver<SessionSummary>>,
}

impl SessionHandle {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn progress(&self) -> f64 {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.progress.clone()
    }

    /// Wait for the run to finish. `None` if it was cancelled.
    pub async fn completed(mut self) -> Option<SessionSummary> {
        let completion = self.completion.take()?;
        completion.await.ok()
    }

    pub fn cancel(self) {
        self.token.cancel();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Counting {
        inner: StdRandom,
        draws: Arc<AtomicUsize>,
    }

    impl RandomSource for Counting {
        fn next_unit(&mut self) -> f64 {
            self.draws.fetch_add(1, Ordering::SeqCst);
            self.inner.next_unit()
        }
    }

    fn tracker() -> (SleepTracker, Arc<AtomicUsize>) {
        let draws = Arc::new(AtomicUsize::new(0));
        let rng = Counting {
            inner: StdRandom::seeded(11),
            draws: draws.clone(),
        };
        let tracker = SleepTracker::new(
            TrackerConfig::default(),
            SimulationConfig::default(),
            Box::new(rng),
        );
        (tracker, draws)
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_delivers_one_summary_and_goes_idle() {
        let (tracker, draws) = tracker();
        let handle = tracker.start().await.unwrap();
        let progress = handle.subscribe();
        assert_eq!(tracker.get_state().await.status, TrackerStatus::Running);

        let summary = handle.completed().await.expect("run should complete");

        assert!((420..=539).contains(&summary.total_sleep_time));
        assert_eq!(*progress.borrow(), 100.0);
        assert!(draws.load(Ordering::SeqCst) > 0);

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.state.status, TrackerStatus::Idle);
        assert_eq!(snapshot.remaining_ms, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_takes_the_configured_wall_time() {
        let (tracker, _) = tracker();
        let started = time::Instant::now();
        let handle = tracker.start().await.unwrap();

        handle.completed().await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(5000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(5100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_running_fails() {
        let (tracker, _) = tracker();
        let _handle = tracker.start().await.unwrap();

        let err = tracker.start().await.err().expect("should refuse");
        assert!(err.to_string().contains("already running"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_never_generates() {
        let (tracker, draws) = tracker();
        let handle = tracker.start().await.unwrap();
        let progress = handle.subscribe();

        time::sleep(Duration::from_millis(1000)).await;
        let midway = *progress.borrow();
        assert!(midway > 0.0 && midway < 100.0);

        handle.cancel();
        time::sleep(Duration::from_millis(10_000)).await;

        assert_eq!(*progress.borrow(), midway);
        assert_eq!(draws.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.get_state().await.status, TrackerStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoning_the_wait_cancels_the_run() {
        let (tracker, draws) = tracker();
        let handle = tracker.start().await.unwrap();

        let waited = time::timeout(Duration::from_millis(500), handle.completed()).await;
        assert!(waited.is_err());

        time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(draws.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.get_state().await.status, TrackerStatus::Idle);

        // And the tracker can start again
        let again = tracker.start().await.unwrap();
        assert_eq!(again.run_id(), 2);
        assert!(again.completed().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn controller_cancel_stops_active_run() {
        let (tracker, draws) = tracker();
        let handle = tracker.start().await.unwrap();
        time::sleep(Duration::from_millis(200)).await;

        assert!(tracker.cancel().await);
        assert!(!tracker.cancel().await);
        assert!(handle.completed().await.is_none());
        assert_eq!(draws.load(Ordering::SeqCst), 0);
    }

    /// Holds the first draw until the test releases it.
    struct Gated {
        inner: StdRandom,
        entered: Arc<Notify>,
        release: std::sync::mpsc::Receiver<()>,
        held: bool,
    }

    impl RandomSource for Gated {
        fn next_unit(&mut self) -> f64 {
            if !self.held {
                self.held = true;
                self.entered.notify_one();
                let _ = self.release.recv();
            }
            self.inner.next_unit()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cancel_during_generation_drops_the_summary() {
        let entered = Arc::new(Notify::new());
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let rng = Gated {
            inner: StdRandom::seeded(5),
            entered: entered.clone(),
            release: release_rx,
            held: false,
        };
        let config = TrackerConfig {
            tick_interval: Duration::from_millis(1),
            run_duration: Duration::from_millis(5),
        };
        let tracker = SleepTracker::new(config, SimulationConfig::default(), Box::new(rng));

        let handle = tracker.start().await.unwrap();
        let waiter = tokio::spawn(handle.completed());

        entered.notified().await;
        assert_eq!(tracker.get_state().await.status, TrackerStatus::Running);
        assert!(tracker.cancel().await);
        release_tx.send(()).unwrap();

        assert!(waiter.await.unwrap().is_none());
        assert_eq!(tracker.get_state().await.status, TrackerStatus::Idle);

        // The next run is unaffected
        let again = tracker.start().await.unwrap();
        assert!(again.completed().await.is_some());
    }
}
