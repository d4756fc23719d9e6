//! Single-flight refresh and whole-value publication of snapshots.
//!
//! At most one refresh runs at a time; a trigger that arrives while one is
//! in flight is skipped rather than queued, so results are always published
//! in the order their fetches started. Subscribers see each new
//! [`Snapshot`] as a complete `Arc` swap through a `watch` channel.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::config::RefreshConfig;
use crate::error::FetchError;
use crate::fetch::{HttpClient, load_source};
use crate::pipeline::Pipeline;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A snapshot was published; `demo` is set when it is the fallback.
    Published { generation: u64, demo: bool },
    /// Another refresh was already running.
    Skipped,
}

/// Resets the in-flight flag when the refresh finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Refresher<C> {
    client: C,
    source: String,
    pipeline: Pipeline,
    settings: RefreshConfig,
    in_flight: AtomicBool,
    generation: AtomicU64,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl<C: HttpClient> Refresher<C> {
    /// Starts with a demo snapshot published until the first refresh lands.
    pub fn new(client: C, source: String, pipeline: Pipeline, settings: RefreshConfig) -> Self {
        let initial = Snapshot::demo("no data fetched yet".to_string(), Utc::now());
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            client,
            source,
            pipeline,
            settings,
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Currently published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        let secs = self.settings.fetch_timeout_secs;
        match tokio::time::timeout(
            Duration::from_secs(secs),
            load_source(&self.client, &self.source),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(secs)),
        }
    }

    /// Fetches, analyzes and publishes one snapshot unless a refresh is
    /// already running.
    #[tracing::instrument(skip(self), fields(source = %self.source))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("Refresh already in flight, skipping trigger");
            return RefreshOutcome::Skipped;
        };

        let fetch_start = std::time::Instant::now();
        let fetched = self.fetch().await;
        debug!(elapsed_ms = fetch_start.elapsed().as_millis() as u64, "Fetch finished");

        let snapshot = self
            .pipeline
            .snapshot(fetched, Utc::now(), self.settings.fallback_on_empty);
        let demo = snapshot.is_demo();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        info!(
            generation,
            demo,
            valid = snapshot.summary.total_responses,
            raw = snapshot.summary.total_raw,
            "Snapshot published"
        );
        self.tx.send_replace(Arc::new(snapshot));

        RefreshOutcome::Published { generation, demo }
    }

    /// Refreshes every `interval` until `samples` refreshes have been
    /// attempted (0 = forever).
    pub async fn run_periodic(&self, interval: Duration, samples: usize) {
        let mut count = 0;

        loop {
            if samples > 0 && count >= samples {
                break;
            }
            count += 1;

            info!(
                sample = count,
                total = if samples == 0 { None } else { Some(samples) },
                "Starting scheduled refresh"
            );
            if self.refresh().await == RefreshOutcome::Skipped {
                info!("Scheduled refresh skipped, manual refresh in flight");
            }

            if samples == 0 || count < samples {
                tokio::time::sleep(interval).await;
            }
        }
    }

    /// Like [`run_periodic`](Self::run_periodic), but also refreshes on every
    /// message from `triggers`. Returns when the schedule completes, even if
    /// the trigger channel is still open.
    pub async fn run_with_triggers(
        &self,
        interval: Duration,
        samples: usize,
        mut triggers: mpsc::Receiver<()>,
    ) {
        let scheduled = self.run_periodic(interval, samples);
        tokio::pin!(scheduled);
        let mut triggers_open = true;

        loop {
            tokio::select! {
                biased;
                msg = triggers.recv(), if triggers_open => match msg {
                    Some(()) => {
                        info!("Manual refresh requested");
                        if self.refresh().await == RefreshOutcome::Skipped {
                            info!("Refresh already running, trigger ignored");
                        }
                    }
                    None => triggers_open = false,
                },
                _ = &mut scheduled => break,
            }
        }
    }
}
