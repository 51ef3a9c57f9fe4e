//! Fire-and-forget delivery to the ledger and broadcasters.
//!
//! Callers never wait on, or hear about, an integration failure. Ledger
//! writes are applied in submission order by a single worker; each
//! broadcast runs in its own task. Every call is bounded by a timeout,
//! and shutdown gives pending work one grace period to finish.

use pollcast_core::{
    event::VoteRecord,
    traits::{Broadcaster, VoteLedger},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Pending ledger writes before new ones are dropped.
const LEDGER_QUEUE: usize = 256;

/// Handle for queuing outbound notifications.
pub struct Relay {
    ledger_tx: Option<mpsc::Sender<VoteRecord>>,
    ledger_worker: Option<JoinHandle<()>>,
    broadcasters: Vec<Arc<dyn Broadcaster>>,
    /// In-flight broadcasts, drained on shutdown.
    broadcasts: JoinSet<()>,
    timeout: Duration,
}

impl Relay {
    /// Build a relay. Spawns the ledger worker, so call inside a runtime.
    pub fn new(
        ledger: Option<Arc<dyn VoteLedger>>,
        broadcasters: Vec<Arc<dyn Broadcaster>>,
        timeout: Duration,
    ) -> Self {
        let (ledger_tx, ledger_worker) = match ledger {
            Some(ledger) => {
                let (tx, rx) = mpsc::channel(LEDGER_QUEUE);
                let handle = tokio::spawn(ledger_worker(ledger, rx, timeout));
                (Some(tx), Some(handle))
            }
            None => (None, None),
        };

        Self {
            ledger_tx,
            ledger_worker,
            broadcasters,
            broadcasts: JoinSet::new(),
            timeout,
        }
    }

    /// Queue a ledger write. Never blocks.
    pub fn record(&self, record: VoteRecord) {
        let Some(tx) = &self.ledger_tx else {
            return;
        };
        match tx.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => {
                warn!("ledger queue full, dropping update for {}", record.voter);
            }
            Err(TrySendError::Closed(record)) => {
                error!("ledger worker gone, dropping update for {}", record.voter);
            }
        }
    }

    /// Send `text` to every broadcaster in the background.
    pub fn broadcast(&mut self, text: &str) {
        // Reap tasks that already finished.
        while self.broadcasts.try_join_next().is_some() {}

        let text: Arc<str> = Arc::from(text);
        for broadcaster in &self.broadcasters {
            let broadcaster = broadcaster.clone();
            let text = text.clone();
            let timeout = self.timeout;
            self.broadcasts.spawn(async move {
                match tokio::time::timeout(timeout, broadcaster.broadcast(&text)).await {
                    Ok(Ok(())) => info!("results relayed to {}", broadcaster.name()),
                    Ok(Err(e)) => error!("failed to relay results to {}: {e}", broadcaster.name()),
                    Err(_) => warn!(
                        "relay to {} timed out after {}s",
                        broadcaster.name(),
                        timeout.as_secs()
                    ),
                }
            });
        }
    }

    /// Upper bound on any single outbound call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Names of the configured integrations, for the startup banner.
    pub fn describe(&self) -> String {
        let mut names: Vec<&str> = self.broadcasters.iter().map(|b| b.name()).collect();
        if self.ledger_tx.is_some() {
            names.push("ledger");
        }
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }

    /// Stop accepting ledger writes and let queued writes and in-flight
    /// broadcasts finish.
    pub async fn shutdown(mut self) {
        self.ledger_tx.take();
        let grace = self.timeout * 2;
        let worker = self.ledger_worker.take();
        let mut broadcasts = self.broadcasts;

        let drain = async move {
            if let Some(worker) = worker {
                if let Err(e) = worker.await {
                    error!("ledger worker failed: {e}");
                }
            }
            while broadcasts.join_next().await.is_some() {}
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!(
                "pending ledger writes or broadcasts did not finish within {}s",
                grace.as_secs()
            );
        }
    }
}

async fn ledger_worker(
    ledger: Arc<dyn VoteLedger>,
    mut rx: mpsc::Receiver<VoteRecord>,
    timeout: Duration,
) {
    while let Some(record) = rx.recv().await {
        match tokio::time::timeout(timeout, ledger.record(&record)).await {
            Ok(Ok(())) => debug!("{} updated for {}", ledger.name(), record.voter),
            Ok(Err(e)) => error!("failed to update {}: {e}", ledger.name()),
            Err(_) => warn!(
                "{} update for {} timed out after {}s",
                ledger.name(),
                record.voter,
                timeout.as_secs()
            ),
        }
    }
    debug!("{} worker stopped", ledger.name());
}
