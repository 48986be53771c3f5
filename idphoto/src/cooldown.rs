//! Client-side cooldown after quota exhaustion.
//!
//! The coordinator is either Idle (`remaining_seconds == 0`) or Cooling.
//! While Cooling, [`CooldownCoordinator::check`] rejects new requests. A
//! background ticker decrements the remaining time once per second and stops
//! when it reaches zero or the coordinator is dropped.

use crate::error::GenerationError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const TICK: Duration = Duration::from_secs(1);

struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Gates new requests for a fixed period after a terminal quota failure.
pub struct CooldownCoordinator {
    period_seconds: u64,
    auto_tick: bool,
    state: Arc<watch::Sender<u64>>,
    ticker: Mutex<Option<Ticker>>,
}

impl CooldownCoordinator {
    /// Create an idle coordinator with a ticking background timer.
    pub fn new(period: Duration) -> Self {
        Self::build(period, true)
    }

    /// Create a coordinator whose countdown only advances through
    /// [`tick`](Self::tick).
    pub fn manual(period: Duration) -> Self {
        Self::build(period, false)
    }

    fn build(period: Duration, auto_tick: bool) -> Self {
        let (state, _) = watch::channel(0);
        Self {
            period_seconds: period.as_secs(),
            auto_tick,
            state: Arc::new(state),
            ticker: Mutex::new(None),
        }
    }

    /// The cooldown period.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }

    /// Seconds until requests are accepted again.
    pub fn remaining_seconds(&self) -> u64 {
        *self.state.borrow()
    }

    /// Whether requests are currently rejected.
    pub fn is_cooling(&self) -> bool {
        self.remaining_seconds() > 0
    }

    /// Pre-flight gate for a new request.
    pub fn check(&self) -> Result<(), GenerationError> {
        match self.remaining_seconds() {
            0 => Ok(()),
            remaining_seconds => Err(GenerationError::CoolingDown { remaining_seconds }),
        }
    }

    /// Enter (or restart) Cooling for the full period.
    pub fn trigger(&self) {
        if self.period_seconds == 0 {
            return;
        }

        self.state.send_replace(self.period_seconds);
        info!(remaining_seconds = self.period_seconds, "Cooldown started");

        if self.auto_tick {
            self.restart_ticker();
        }
    }

    /// Advance the countdown by one second and return what remains.
    pub fn tick(&self) -> u64 {
        tick_once(&self.state)
    }

    /// Whether the background ticker is running.
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Watch the remaining seconds, e.g. to render a countdown.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }

    fn restart_ticker(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, cooldown will not tick");
            return;
        };

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_ticker(self.state.clone(), cancel.clone()));

        if let Some(old) = self.ticker.lock().replace(Ticker { cancel, handle }) {
            old.cancel.cancel();
        }
    }
}

impl Drop for CooldownCoordinator {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for CooldownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownCoordinator")
            .field("period_seconds", &self.period_seconds)
            .field("remaining_seconds", &self.remaining_seconds())
            .field("auto_tick", &self.auto_tick)
            .finish()
    }
}

fn tick_once(state: &watch::Sender<u64>) -> u64 {
    let mut remaining = 0;
    let changed = state.send_if_modified(|value| {
        if *value == 0 {
            return false;
        }
        *value -= 1;
        remaining = *value;
        true
    });

    if changed && remaining == 0 {
        info!("Cooldown finished");
    }
    remaining
}

async fn run_ticker(state: Arc<watch::Sender<u64>>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if tick_once(&state) == 0 {
                    break;
                }
            }
        }
    }
}
