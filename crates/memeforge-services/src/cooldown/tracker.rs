use chrono::{DateTime, Utc};
use memeforge_core::{AppError, Clock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    Allow,
    Deny { seconds_remaining: u64 },
}

/// Decide whether a client whose last success was at `last` may generate at `now`.
///
/// Denials report whole seconds rounded up, never less than 1 and never more than the window.
pub fn evaluate(
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: chrono::Duration,
) -> CooldownDecision {
    let Some(last) = last else {
        return CooldownDecision::Allow;
    };

    let elapsed = now - last;
    if elapsed >= window {
        return CooldownDecision::Allow;
    }

    let remaining_ms = (window - elapsed).num_milliseconds().max(0) as u64;
    let window_secs = window.num_seconds().max(1) as u64;
    let seconds_remaining = remaining_ms.div_ceil(1000).clamp(1, window_secs);

    CooldownDecision::Deny { seconds_remaining }
}

/// Tracked state for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// A generation is in flight, reserved at this instant
    Pending(DateTime<Utc>),
    /// Last successful generation
    Completed(DateTime<Utc>),
}

fn into_result(client_id: &str, decision: CooldownDecision) -> Result<(), AppError> {
    match decision {
        CooldownDecision::Allow => Ok(()),
        CooldownDecision::Deny { seconds_remaining } => {
            tracing::debug!(client_id = %client_id, seconds_remaining, "Cooldown active");
            Err(AppError::CooldownActive { seconds_remaining })
        }
    }
}

/// Per-client generation cooldown
///
/// Expiry is computed lazily from the stored timestamp; [`CooldownTracker::purge_expired`] only
/// keeps the map from growing. A reservation that is never recorded or released (the request
/// future was dropped) stops blocking the client after one window.
pub struct CooldownTracker {
    entries: Mutex<HashMap<String, Slot>>,
    clock: Arc<dyn Clock>,
    window: chrono::Duration,
}

impl CooldownTracker {
    pub fn new(window: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            window,
        }
    }

    pub fn window(&self) -> chrono::Duration {
        self.window
    }

    fn decide(&self, slot: Option<Slot>, now: DateTime<Utc>) -> CooldownDecision {
        match slot {
            None => CooldownDecision::Allow,
            Some(Slot::Completed(last)) => evaluate(Some(last), now, self.window),
            Some(Slot::Pending(since)) => {
                if now - since >= self.window {
                    CooldownDecision::Allow
                } else {
                    // The window only starts once the in-flight generation succeeds
                    CooldownDecision::Deny {
                        seconds_remaining: self.window.num_seconds().max(1) as u64,
                    }
                }
            }
        }
    }

    pub async fn check(&self, client_id: &str) -> CooldownDecision {
        let slot = self.entries.lock().await.get(client_id).copied();
        self.decide(slot, self.clock.now())
    }

    /// Same as [`check`](Self::check) but as a `Result` for use with `?`
    pub async fn ensure_allowed(&self, client_id: &str) -> Result<(), AppError> {
        into_result(client_id, self.check(client_id).await)
    }

    /// Check and claim the client's slot under one lock.
    ///
    /// On success the client is denied until [`record_success`](Self::record_success) or
    /// [`release`](Self::release) is called for it.
    pub async fn reserve(&self, client_id: &str) -> Result<(), AppError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        into_result(client_id, self.decide(entries.get(client_id).copied(), now))?;
        entries.insert(client_id.to_string(), Slot::Pending(now));
        Ok(())
    }

    /// Start the cooldown for `client_id` from now, replacing any reservation
    pub async fn record_success(&self, client_id: &str) {
        let now = self.clock.now();
        self.entries
            .lock()
            .await
            .insert(client_id.to_string(), Slot::Completed(now));
    }

    /// Drop a reservation after a failed generation. A completed cooldown is left alone.
    pub async fn release(&self, client_id: &str) {
        let mut entries = self.entries.lock().await;
        if matches!(entries.get(client_id), Some(Slot::Pending(_))) {
            entries.remove(client_id);
        }
    }

    /// Drop entries that no longer block their client. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, slot| match slot {
            Slot::Pending(at) | Slot::Completed(at) => now - *at < self.window,
        });
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Spawn the periodic purge task
    pub fn start_janitor(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "Purged expired cooldown entries");
                }
            }
        })
    }
}
