//! The release countdown: a cancellable background task that broadcasts the
//! remaining seconds to every participant, then announces the release.
//!
//! A [`CountdownTimer`] is a single slot. Starting a countdown while one is
//! already running cancels the old one first, so at most one countdown per
//! slot is ever [`CountdownState::Running`].
//!
//! The state lives in a `watch` channel shared between the slot and the
//! task. It doubles as the cancellation flag: the task checks it before
//! every tick and races it against every wait.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use doghunt_host::{Broadcast, Messenger};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::scheduler::{TickConfig, TickPolicy, TickScheduler};

/// Text of the final broadcast.
pub const RELEASE_TEXT: &str = "The dog has been released!";

/// Text of the per-second broadcast.
pub fn tick_text(remaining_secs: u32) -> String {
    format!("The dog will be released in {remaining_secs} seconds!")
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Number of ticks before release.
    pub duration_secs: u32,
    /// Time between ticks. One second outside of tests.
    pub interval: Duration,
    pub policy: TickPolicy,
    /// On-screen time of each tick broadcast.
    pub tick_display: Duration,
    /// On-screen time of the release broadcast.
    pub release_display: Duration,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            duration_secs: 120,
            interval: TickConfig::DEFAULT_INTERVAL,
            policy: TickPolicy::Skip,
            tick_display: Duration::from_secs(1),
            release_display: Duration::from_secs(5),
        }
    }
}

impl CountdownConfig {
    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            ..Default::default()
        }
    }

    /// Clamps the interval the same way the tick scheduler does, so
    /// [`total`](Self::total) matches what the task actually waits.
    pub fn validated(self) -> Self {
        let tick = TickConfig {
            interval: self.interval,
            policy: self.policy,
        }
        .validated();
        Self {
            interval: tick.interval,
            ..self
        }
    }

    /// Wall time from start to release.
    pub fn total(&self) -> Duration {
        self.interval * self.duration_secs
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of one countdown.
///
/// ```text
/// Idle → Running → Expired
///              ↘ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownState {
    Idle,
    Running,
    /// Reached zero and sent the release broadcast.
    Expired,
    /// Stopped early. No release broadcast was sent.
    Cancelled,
}

impl CountdownState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }
}

impl std::fmt::Display for CountdownState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Expired => write!(f, "Expired"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Identifies one countdown run within a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountdownId(pub u64);

impl std::fmt::Display for CountdownId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Progress {
    ticks: AtomicU32,
    remaining: AtomicU32,
}

// ---------------------------------------------------------------------------
// Status (observer side)
// ---------------------------------------------------------------------------

/// Read-only view of one countdown run.
///
/// Cheap to clone; every clone observes the same run.
#[derive(Debug, Clone)]
pub struct CountdownStatus {
    id: CountdownId,
    state: watch::Receiver<CountdownState>,
    progress: Arc<Progress>,
}

impl CountdownStatus {
    pub fn id(&self) -> CountdownId {
        self.id
    }

    pub fn state(&self) -> CountdownState {
        *self.state.borrow()
    }

    /// Tick broadcasts sent so far (each tick counts once, however many
    /// participants received it).
    pub fn ticks_sent(&self) -> u32 {
        self.progress.ticks.load(Ordering::Acquire)
    }

    /// Seconds left as of the last tick.
    pub fn remaining_secs(&self) -> u32 {
        self.progress.remaining.load(Ordering::Acquire)
    }

    /// Resolves once the run is Expired or Cancelled.
    pub async fn finished(&mut self) -> CountdownState {
        match self.state.wait_for(|s| s.is_terminal()).await.map(|s| *s) {
            Ok(state) => state,
            Err(_) => *self.state.borrow(),
        }
    }
}

// ---------------------------------------------------------------------------
// Slot (owner side)
// ---------------------------------------------------------------------------

struct ActiveCountdown {
    state: Arc<watch::Sender<CountdownState>>,
    status: CountdownStatus,
    task: JoinHandle<()>,
}

impl ActiveCountdown {
    /// Running → Cancelled. Returns `false` if the run already ended.
    fn cancel(&self) -> bool {
        self.state.send_if_modified(|s| {
            if *s == CountdownState::Running {
                *s = CountdownState::Cancelled;
                true
            } else {
                false
            }
        })
    }
}

#[derive(Default)]
struct Slot {
    current: Option<ActiveCountdown>,
    /// Tasks of cancelled runs that may not have observed it yet.
    retired: Vec<JoinHandle<()>>,
}

/// A single countdown slot.
///
/// Owned by the round orchestrator. Spawns its task on the runtime handle
/// it was created with, so `start` may be called from synchronous code.
pub struct CountdownTimer {
    runtime: Handle,
    slot: Mutex<Slot>,
    next_id: AtomicU64,
}

impl CountdownTimer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            slot: Mutex::new(Slot::default()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a countdown and returns immediately.
    ///
    /// Cancels the countdown currently in the slot, if any.
    pub fn start<M: Messenger>(&self, messenger: Arc<M>, config: CountdownConfig) -> CountdownStatus {
        let config = config.validated();
        let id = CountdownId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (state_tx, state_rx) = watch::channel(CountdownState::Running);
        let state_tx = Arc::new(state_tx);
        let progress = Arc::new(Progress {
            ticks: AtomicU32::new(0),
            remaining: AtomicU32::new(config.duration_secs),
        });
        let status = CountdownStatus {
            id,
            state: state_rx,
            progress: Arc::clone(&progress),
        };

        let mut slot = self.lock();
        slot.retired.retain(|task| !task.is_finished());
        if let Some(previous) = slot.current.take() {
            if previous.cancel() {
                tracing::info!(
                    countdown = %previous.status.id,
                    replaced_by = %id,
                    "countdown cancelled by a new round"
                );
            }
            slot.retired.push(previous.task);
        }

        let task = self.runtime.spawn(run_countdown(
            id,
            messenger,
            config,
            Arc::clone(&state_tx),
            progress,
        ));
        tracing::info!(
            countdown = %id,
            duration_secs = config.duration_secs,
            "countdown started"
        );

        slot.current = Some(ActiveCountdown {
            state: state_tx,
            status: status.clone(),
            task,
        });
        status
    }

    /// Cancels the running countdown. Returns `true` if one was running.
    ///
    /// No-op when idle or when the last run already ended.
    pub fn cancel(&self) -> bool {
        let slot = self.lock();
        match &slot.current {
            Some(active) if active.cancel() => {
                tracing::info!(countdown = %active.status.id, "countdown cancelled");
                true
            }
            _ => false,
        }
    }

    /// State of the most recent run, or `Idle` if none was ever started.
    pub fn state(&self) -> CountdownState {
        self.lock()
            .current
            .as_ref()
            .map_or(CountdownState::Idle, |active| active.status.state())
    }

    pub fn is_running(&self) -> bool {
        self.state() == CountdownState::Running
    }

    /// Observer for the most recent run.
    pub fn current(&self) -> Option<CountdownStatus> {
        self.lock().current.as_ref().map(|active| active.status.clone())
    }

    /// Cancels the running countdown and waits for every task this slot
    /// spawned to exit.
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = {
            let mut slot = self.lock();
            let mut tasks = std::mem::take(&mut slot.retired);
            if let Some(active) = slot.current.take() {
                active.cancel();
                tasks.push(active.task);
            }
            tasks
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "countdown task did not exit cleanly");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

async fn run_countdown<M: Messenger>(
    id: CountdownId,
    messenger: Arc<M>,
    config: CountdownConfig,
    state: Arc<watch::Sender<CountdownState>>,
    progress: Arc<Progress>,
) {
    let mut state_rx = state.subscribe();
    let mut scheduler = TickScheduler::new(TickConfig {
        interval: config.interval,
        policy: config.policy,
    });

    for remaining in (1..=config.duration_secs).rev() {
        if *state_rx.borrow() != CountdownState::Running {
            tracing::debug!(countdown = %id, remaining, "countdown stopped before tick");
            return;
        }

        progress.remaining.store(remaining, Ordering::Release);
        let message = Broadcast::new(tick_text(remaining), config.tick_display);
        let delivered = broadcast_all(messenger.as_ref(), &message);
        progress.ticks.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(countdown = %id, remaining, delivered, "countdown tick");

        tokio::select! {
            biased;
            () = stopped(&mut state_rx) => {
                tracing::debug!(countdown = %id, remaining, "countdown stopped during wait");
                return;
            }
            _ = scheduler.wait_for_tick() => {}
        }
    }

    let expired = state.send_if_modified(|s| {
        if *s == CountdownState::Running {
            *s = CountdownState::Expired;
            true
        } else {
            false
        }
    });
    if !expired {
        return;
    }

    progress.remaining.store(0, Ordering::Release);
    let release = Broadcast::new(RELEASE_TEXT, config.release_display);
    let delivered = broadcast_all(messenger.as_ref(), &release);
    tracing::info!(countdown = %id, delivered, "hunter released");
}

/// Resolves once the state leaves `Running`.
async fn stopped(state: &mut watch::Receiver<CountdownState>) {
    // An error means every sender is gone, which also ends the run.
    let _ = state
        .wait_for(|s| *s != CountdownState::Running)
        .await
        .map(|_| ());
}

/// Sends `message` to everyone on the roster right now.
///
/// Returns how many participants received it. A failed delivery is logged
/// and skipped.
fn broadcast_all<M: Messenger + ?Sized>(messenger: &M, message: &Broadcast) -> usize {
    let mut delivered = 0;
    for player in messenger.participants() {
        match messenger.broadcast(player, message) {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::debug!(%player, error = %e, "broadcast not delivered");
            }
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_text() {
        assert_eq!(tick_text(120), "The dog will be released in 120 seconds!");
    }

    #[test]
    fn test_default_config_matches_round_length() {
        let cfg = CountdownConfig::default();
        assert_eq!(cfg.duration_secs, 120);
        assert_eq!(cfg.total(), Duration::from_secs(120));
        assert_eq!(cfg.tick_display, Duration::from_secs(1));
        assert_eq!(cfg.release_display, Duration::from_secs(5));
    }

    #[test]
    fn test_validated_clamps_zero_interval() {
        let cfg = CountdownConfig {
            interval: Duration::ZERO,
            ..CountdownConfig::with_duration(10)
        }
        .validated();
        assert_eq!(cfg.interval, TickConfig::MIN_INTERVAL);
        assert_eq!(cfg.total(), Duration::from_millis(10));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CountdownState::Idle.is_terminal());
        assert!(!CountdownState::Running.is_terminal());
        assert!(CountdownState::Expired.is_terminal());
        assert!(CountdownState::Cancelled.is_terminal());
    }

    #[tokio::test]
    async fn test_new_timer_is_idle() {
        let timer = CountdownTimer::new(Handle::current());
        assert_eq!(timer.state(), CountdownState::Idle);
        assert!(!timer.cancel());
        assert!(timer.current().is_none());
    }
}
