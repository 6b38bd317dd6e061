//! Session controller: the one stateful piece of the dashboard.
//!
//! The controller owns the unit preference, the last snapshot, the last error,
//! the recent-search list, the loading flag and the auto-refresh timer. Views
//! read the state through [`SessionController::state`] or subscribe to changes
//! with [`SessionController::subscribe`]; they never mutate it directly.
//!
//! Overlapping fetches are not sequenced. Whichever response lands last
//! overwrites the snapshot and error message.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    RecentSearches, Units, WeatherClient, WeatherSnapshot,
    store::{KeyValueStore, RECENT_SEARCHES_KEY, UNITS_KEY},
};

/// Shown when a failure carries no message of its own.
pub const FETCH_FALLBACK_ERROR: &str = "Failed to fetch weather";

/// Everything the views need to draw the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub units: Units,
    pub snapshot: Option<WeatherSnapshot>,
    pub last_city: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub recent: RecentSearches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing queried yet.
    Idle,
    /// Explicit fetch in flight.
    Loading,
    /// Snapshot available and the last fetch succeeded.
    Ready,
    /// Last fetch failed; any earlier snapshot is still present.
    Errored,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.error.is_some() {
            SessionPhase::Errored
        } else if self.snapshot.is_some() {
            SessionPhase::Ready
        } else {
            SessionPhase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// User asked for it; drives the loading flag.
    Explicit,
    /// Timer tick; leaves the loading flag alone.
    Silent,
}

/// Live auto-refresh task. Dropping it stops the task.
#[derive(Debug)]
struct RefreshTimer {
    id: u64,
    task: JoinHandle<()>,
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
struct Inner {
    client: Arc<dyn WeatherClient>,
    store: Arc<dyn KeyValueStore>,
    refresh_every: Duration,
    state: watch::Sender<SessionState>,
    timer: Mutex<Option<RefreshTimer>>,
    timer_ids: AtomicU64,
    disposed: AtomicBool,
}

/// Cheap clonable handle; all clones drive the same session.
#[derive(Debug, Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Build a controller, restoring units and recent searches from `store`.
    pub fn new(
        client: Arc<dyn WeatherClient>,
        store: Arc<dyn KeyValueStore>,
        refresh_every: Duration,
    ) -> Self {
        let initial = SessionState {
            units: Units::from_stored(store.get(UNITS_KEY).as_deref()),
            recent: RecentSearches::from_stored(store.get(RECENT_SEARCHES_KEY).as_deref()),
            ..SessionState::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                client,
                store,
                refresh_every,
                state,
                timer: Mutex::new(None),
                timer_ids: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_every
    }

    /// Id of the live auto-refresh timer, if one is armed.
    pub fn armed_timer(&self) -> Option<u64> {
        self.inner.timer.lock().as_ref().map(|t| t.id)
    }

    /// Fetch `city` as typed by the user. The caller trims; empty input is ignored.
    pub async fn search(&self, city: &str) {
        self.inner.fetch(city, FetchMode::Explicit).await;
    }

    pub async fn select_recent(&self, city: &str) {
        self.search(city).await;
    }

    /// Re-fetch the last queried city. Does nothing before the first success.
    pub async fn manual_refresh(&self) {
        let Some(city) = self.inner.last_city() else {
            debug!("refresh requested before any city was queried");
            return;
        };
        self.inner.fetch(&city, FetchMode::Explicit).await;
    }

    /// Persist a new unit preference and re-arm the timer. The snapshot is kept
    /// as-is until the next fetch.
    pub fn change_units(&self, units: Units) {
        if let Err(e) = self.inner.store.set(UNITS_KEY, units.as_str()) {
            warn!("Failed to persist unit preference: {:#}", e);
        }
        self.inner.state.send_modify(|s| s.units = units);
        self.inner.rearm();
    }

    /// Stop auto-refresh for good. Fetches still in flight complete but never
    /// arm a new timer. Safe to call more than once.
    pub fn dispose(&self) {
        let mut slot = self.inner.timer.lock();
        self.inner.disposed.store(true, Ordering::SeqCst);
        if let Some(timer) = slot.take() {
            debug!(timer = timer.id, "auto-refresh cancelled");
        }
    }
}

impl Inner {
    fn last_city(&self) -> Option<String> {
        self.state.borrow().last_city.clone()
    }

    fn units(&self) -> Units {
        self.state.borrow().units
    }

    async fn fetch(self: &Arc<Self>, city: &str, mode: FetchMode) {
        self.state.send_modify(|s| s.error = None);
        if city.is_empty() {
            return;
        }

        if mode == FetchMode::Explicit {
            self.state.send_modify(|s| s.loading = true);
        }

        let units = self.units();
        match self.client.fetch_current_weather(city, units).await {
            Ok(snapshot) => {
                info!(%city, ?mode, temperature = snapshot.temperature, "weather updated");

                let mut recent = RecentSearches::default();
                self.state.send_modify(|s| {
                    s.snapshot = Some(snapshot);
                    s.last_city = Some(city.to_owned());
                    s.recent.record(city);
                    recent = s.recent.clone();
                });

                if let Err(e) = self.store.set(RECENT_SEARCHES_KEY, &recent.to_stored()) {
                    warn!("Failed to persist recent searches: {:#}", e);
                }

                self.rearm();
            }
            Err(e) => {
                warn!(%city, ?mode, "weather fetch failed: {}", e);
                let mut message = e.to_string();
                if message.is_empty() {
                    message = FETCH_FALLBACK_ERROR.to_string();
                }
                self.state.send_modify(|s| s.error = Some(message));
            }
        }

        if mode == FetchMode::Explicit {
            self.state.send_modify(|s| s.loading = false);
        }
    }

    /// Cancel the current timer and, if a city has been queried, start a new one.
    fn rearm(self: &Arc<Self>) {
        let mut slot = self.timer.lock();
        // Dropping the old handle aborts its task.
        slot.take();

        if self.disposed.load(Ordering::SeqCst) || self.last_city().is_none() {
            return;
        }

        let id = self.timer_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let task = tokio::spawn(refresh_loop(Arc::downgrade(self), self.refresh_every, id));
        debug!(timer = id, every = ?self.refresh_every, "auto-refresh armed");

        *slot = Some(RefreshTimer { id, task });
    }
}

async fn refresh_loop(session: Weak<Inner>, every: Duration, id: u64) {
    let mut ticks = time::interval_at(Instant::now() + every, every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;

        let Some(inner) = session.upgrade() else {
            break;
        };
        let Some(city) = inner.last_city() else {
            continue;
        };

        debug!(timer = id, %city, "auto-refresh tick");
        // Own task: a successful fetch re-arms, which aborts this loop.
        tokio::spawn(async move {
            inner.fetch(&city, FetchMode::Silent).await;
        });
    }
}
