//! Periodic rate fetching with manual refresh and freshness ordering.

use crate::core::cache::RateCache;
use crate::core::rates::RateProvider;
use crate::core::snapshot::RateSnapshot;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Observable outcome of the latest fetch attempts, published through a
/// watch channel after every attempt.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    pub snapshot: Option<RateSnapshot>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

enum Command {
    Refresh,
}

struct Worker {
    commands: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

struct FetchContext {
    provider: Arc<dyn RateProvider>,
    cache: RateCache,
    fetch_seq: AtomicU64,
    apply_lock: Mutex<()>,
    state_tx: watch::Sender<PollState>,
}

impl FetchContext {
    fn begin_fetch(self: &Arc<Self>, base: &str) {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_modify(|state| state.is_loading = true);

        let ctx = Arc::clone(self);
        let base = base.to_string();
        tokio::spawn(async move {
            let result = ctx.provider.fetch_rates(&base).await;
            ctx.apply(seq, result).await;
        });
    }

    async fn apply(&self, seq: u64, result: Result<RateSnapshot>) {
        // One response applies at a time, so the freshness check and the
        // cache write cannot interleave with a competing fetch.
        let _guard = self.apply_lock.lock().await;
        if self.fetch_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "Discarding stale rate response");
            return;
        }

        match result {
            Ok(snapshot) => {
                self.cache.update(snapshot.clone()).await;
                self.state_tx.send_modify(|state| {
                    state.snapshot = Some(snapshot);
                    state.is_loading = false;
                    state.last_error = None;
                    state.last_updated = Some(Utc::now());
                });
            }
            Err(error) => {
                warn!(%error, "Rate fetch failed, keeping previous rates");
                self.state_tx.send_modify(|state| {
                    state.is_loading = false;
                    state.last_error = Some(error.to_string());
                });
            }
        }
    }

    fn invalidate_in_flight(&self) {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps the rate cache fresh for one base currency at a time.
///
/// `start` issues an immediate fetch and then one per interval;
/// `refresh_now` fetches out of band and restarts the interval phase.
/// Responses carry a sequence number taken at initiation, and only the
/// most recently initiated fetch may update the cache, so a slow response
/// can never overwrite a newer one.
pub struct RatePoller {
    ctx: Arc<FetchContext>,
    state_rx: watch::Receiver<PollState>,
    worker: StdMutex<Option<Worker>>,
}

impl RatePoller {
    pub fn new(provider: Arc<dyn RateProvider>, cache: RateCache) -> Self {
        let (state_tx, state_rx) = watch::channel(PollState::default());
        Self {
            ctx: Arc::new(FetchContext {
                provider,
                cache,
                fetch_seq: AtomicU64::new(0),
                apply_lock: Mutex::new(()),
                state_tx,
            }),
            state_rx,
            worker: StdMutex::new(None),
        }
    }

    /// Begins polling `base`: one immediate fetch, then one per `interval`.
    /// Calling again (new base or interval) replaces the running timer.
    pub fn start(&self, base: &str, interval: Duration) {
        self.stop();

        let (commands_tx, mut commands) = mpsc::unbounded_channel();
        let ctx = Arc::clone(&self.ctx);
        let base = base.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => ctx.begin_fetch(&base),
                    command = commands.recv() => match command {
                        Some(Command::Refresh) => {
                            ticker.reset();
                            ctx.begin_fetch(&base);
                        }
                        None => break,
                    },
                }
            }
        });

        let mut worker = self.worker.lock().unwrap();
        *worker = Some(Worker {
            commands: commands_tx,
            handle,
        });
    }

    /// Fetches immediately without waiting for the next tick; the periodic
    /// timer starts counting again from this fetch.
    pub fn refresh_now(&self) {
        let worker = self.worker.lock().unwrap();
        if let Some(worker) = worker.as_ref() {
            let _ = worker.commands.send(Command::Refresh);
        }
    }

    /// Cancels the poll timer. Safe to call repeatedly. Responses still in
    /// flight are discarded when they arrive.
    pub fn stop(&self) {
        let worker = self.worker.lock().unwrap().take();
        if let Some(worker) = worker {
            worker.handle.abort();
            self.ctx.invalidate_in_flight();
            self.ctx.state_tx.send_modify(|state| state.is_loading = false);
            debug!("Rate poller stopped");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    pub fn state(&self) -> PollState {
        self.state_rx.borrow().clone()
    }
}

impl Drop for RatePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
