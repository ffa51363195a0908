//! Global fetch admission gate.
//!
//! All workers share one upstream rate budget: at most one job may enter the
//! fetching stage per fixed window, independent of how many jobs are being
//! dequeued concurrently. [`AdmissionGate`] is the seam: a multi-process
//! deployment binds it to a counter on the shared broker, a single process
//! uses [`FixedWindowGate`]. Cache probes happen outside the gate.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// One fetch slot per this window: 0.5 requests/second against the shared
/// upstream budget.
pub const FETCH_WINDOW: Duration = Duration::from_secs(2);

/// Admission control for the fetching stage.
#[async_trait]
pub trait AdmissionGate: Send + Sync {
    /// Wait until this caller may start an upstream fetch. Callers are
    /// admitted in the order they ask.
    async fn admit(&self);

    /// Time until the next slot would be handed out. Zero means a fetch
    /// could start immediately; used for health reporting.
    fn time_to_next_slot(&self) -> Duration;
}

/// In-process fixed-window gate.
///
/// Hands out strictly serialized start times spaced [`FETCH_WINDOW`] apart
/// (or a custom window). Reserving a slot is cheap and synchronous; waiting
/// for it is the caller's await.
pub struct FixedWindowGate {
    window: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl FixedWindowGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            next_slot: Mutex::new(None),
        }
    }

    /// Reserve the next free slot and schedule the one after it.
    fn reserve(&self) -> Instant {
        let mut next = self.next_slot.lock().expect("gate lock poisoned");
        let now = Instant::now();
        let slot = match *next {
            Some(s) if s > now => s,
            _ => now,
        };
        *next = Some(slot + self.window);
        slot
    }
}

#[async_trait]
impl AdmissionGate for FixedWindowGate {
    async fn admit(&self) {
        let slot = self.reserve();
        tokio::time::sleep_until(slot).await;
    }

    fn time_to_next_slot(&self) -> Duration {
        let next = self.next_slot.lock().expect("gate lock poisoned");
        match *next {
            Some(s) => s.saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }
}
