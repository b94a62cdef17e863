//! Time-bounded memoization of the latest health ranking.
//!
//! A hit is decided by age alone. The instance list and `max_to_test` passed to
//! [`HealthCache::get_or_refresh`] are only used on a miss, so a caller asking
//! about a different list inside the TTL window gets the stored ranking back.
//!
//! Refreshes are single-flight. Callers that miss while a refresh is running
//! wait for it and then read what it stored instead of probing again.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::{
    clock::{Clock, SystemClock},
    performance::{rank_instances, Probe},
    HealthSnapshot, Instance,
};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Default)]
struct CacheState {
    snapshot: HealthSnapshot,
    captured_at: Option<Instant>,
}

impl CacheState {
    fn fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        self.captured_at
            .is_some_and(|captured| now.saturating_duration_since(captured) < ttl)
    }
}

pub struct HealthCache {
    state: RwLock<CacheState>,
    refresh_gate: Mutex<()>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl HealthCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            refresh_gate: Mutex::new(()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_or_refresh<P>(
        &self,
        probe: &P,
        instances: &[Instance],
        max_to_test: usize,
    ) -> HealthSnapshot
    where
        P: Probe + ?Sized,
    {
        if let Some(snapshot) = self.cached() {
            return snapshot;
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone else may have refreshed while we waited on the gate.
        if let Some(snapshot) = self.cached() {
            return snapshot;
        }

        let captured_at = self.clock.now();
        let snapshot = rank_instances(probe, instances, max_to_test).await;

        *self.state.write() = CacheState {
            snapshot: snapshot.clone(),
            captured_at: Some(captured_at),
        };

        snapshot
    }

    /// The stored snapshot if it is still inside the TTL window.
    pub fn cached(&self) -> Option<HealthSnapshot> {
        let now = self.clock.now();
        let state = self.state.read();
        if !state.fresh_at(now, self.ttl) {
            return None;
        }

        if let Some(captured) = state.captured_at {
            tracing::info!(
                age_secs = now.saturating_duration_since(captured).as_secs(),
                "Using cached health check results"
            );
        }
        Some(state.snapshot.clone())
    }

    pub fn age(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.state
            .read()
            .captured_at
            .map(|captured| now.saturating_duration_since(captured))
    }

    pub fn clear(&self) {
        *self.state.write() = CacheState::default();
        tracing::info!("Health check cache cleared");
    }
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
