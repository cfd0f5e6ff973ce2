//! Graceful shutdown: health state plus in-flight request accounting.
//!
//! The health state lives in an `ArcSwap` so probes read it without locking.
//! Each admitted request holds an [`InFlightGuard`]; the guard that brings the
//! count back to zero wakes whoever is waiting for the drain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Server health state.
///
/// State machine: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Routes are being assembled; requests are not served yet.
    Starting,
    Ready,
    /// Shutdown requested; new requests are refused while in-flight ones finish.
    Draining,
    /// Every in-flight request has completed.
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Debug)]
struct Tracker {
    state: ArcSwap<HealthState>,
    in_flight: AtomicU64,
    idle: Notify,
}

/// Admission control and drain coordination for the HTTP server.
///
/// Probes read [`health_state`](Self::health_state); the request middleware
/// admits work through [`try_track`](Self::try_track); the serve loop calls
/// [`trigger_shutdown`](Self::trigger_shutdown) and then
/// [`wait_for_drain`](Self::wait_for_drain).
#[derive(Debug)]
pub struct ShutdownController {
    tracker: Arc<Tracker>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracker: Arc::new(Tracker {
                state: ArcSwap::from_pointee(HealthState::Starting),
                in_flight: AtomicU64::new(0),
                idle: Notify::new(),
            }),
        }
    }

    pub fn set_ready(&self) {
        self.set_state(HealthState::Ready);
    }

    /// Stops admitting requests.
    pub fn trigger_shutdown(&self) {
        self.set_state(HealthState::Draining);
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.tracker.state.load()
    }

    /// Whether new requests should be admitted.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        matches!(self.health_state(), HealthState::Starting | HealthState::Ready)
    }

    /// Counts a request regardless of state. The count drops with the guard,
    /// including during unwinding.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.tracker.in_flight.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            tracker: Arc::clone(&self.tracker),
        }
    }

    /// Counts a request unless the server is draining.
    #[must_use]
    pub fn try_track(&self) -> Option<InFlightGuard> {
        self.is_accepting().then(|| self.in_flight_guard())
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.tracker.in_flight.load(Ordering::Acquire)
    }

    /// Waits until no request is in flight, at most `timeout`.
    ///
    /// Returns `true` and moves to `Stopped` once drained; returns `false`
    /// and stays `Draining` if the timeout expires first.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            // Register before checking the count so a guard dropped in
            // between still wakes us.
            let idle = self.tracker.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();

            if self.in_flight_count() == 0 {
                self.set_state(HealthState::Stopped);
                return true;
            }
            if tokio::time::timeout_at(deadline, idle).await.is_err() {
                return false;
            }
        }
    }

    fn set_state(&self, state: HealthState) {
        self.tracker.state.store(Arc::new(state));
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// One admitted request. Dropping the last guard wakes drain waiters.
#[derive(Debug)]
pub struct InFlightGuard {
    tracker: Arc<Tracker>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.tracker.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}
