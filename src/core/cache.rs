use crate::core::snapshot::RateSnapshot;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct CacheState {
    current: Option<RateSnapshot>,
    previous: Option<RateSnapshot>,
}

/// Single source of truth for the current and previous rate snapshot.
///
/// The previous snapshot only exists for delta computation between two
/// fetches of the same base currency; a base change drops it.
#[derive(Clone, Default)]
pub struct RateCache {
    inner: Arc<Mutex<CacheState>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub async fn update(&self, snapshot: RateSnapshot) {
        let mut state = self.inner.lock().await;
        match state.current.take() {
            Some(current) if current.base == snapshot.base => {
                debug!(base = %snapshot.base, "Cache roll-over");
                state.previous = Some(current);
            }
            _ => {
                debug!(base = %snapshot.base, "Cache reset for new base");
                state.previous = None;
            }
        }
        state.current = Some(snapshot);
    }

    /// Rate for `code` from the current snapshot.
    ///
    /// Unknown codes (including the base currency itself) and an empty
    /// cache fall back to `1.0` so callers always get a usable number.
    pub async fn rate(&self, code: &str) -> f64 {
        let state = self.inner.lock().await;
        state
            .current
            .as_ref()
            .and_then(|snapshot| snapshot.rate(code))
            .unwrap_or(1.0)
    }

    /// Change in `code` between the previous and current snapshot, `0.0`
    /// when either side is missing.
    pub async fn delta(&self, code: &str) -> f64 {
        let state = self.inner.lock().await;
        match (&state.current, &state.previous) {
            (Some(current), Some(previous)) => match (current.rate(code), previous.rate(code)) {
                (Some(now), Some(before)) => now - before,
                _ => 0.0,
            },
            _ => 0.0,
        }
    }

    pub async fn current(&self) -> Option<RateSnapshot> {
        self.inner.lock().await.current.clone()
    }
}
