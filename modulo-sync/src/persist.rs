//! Fire-and-forget persistence with revision-ordered acknowledgements.
//!
//! Every committed mutation calls [`Persister::submit`], which stamps the
//! snapshot with the next revision and spawns one task for the remote call.
//! Calls are never cancelled or retried. Completions come back over a
//! channel and are only reported by [`Persister::drain`] when they belong to
//! the most recently issued revision; anything older is stale and dropped,
//! so an out-of-order ack can never roll the reported state back.
//!
//! The remote keeps whatever was written last, so one persister's calls go
//! out one at a time and a snapshot is skipped once a newer revision from
//! the same persister has been written. Other sessions still overwrite
//! each other freely.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::remote::{Credential, RemoteError, RemoteWorkspace, Snapshot};

/// Reported outcome of the latest save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Saved { revision: u64 },
    Failed { revision: u64, error: RemoteError },
}

#[derive(Debug)]
struct Outcome {
    revision: u64,
    result: Result<(), RemoteError>,
}

pub struct Persister {
    remote: Arc<dyn RemoteWorkspace>,
    credential: Credential,
    /// Highest revision handed out so far.
    issued: u64,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
    in_flight: Vec<JoinHandle<()>>,
    /// Highest revision this persister has written to the remote.
    written: Arc<Mutex<u64>>,
}

impl Persister {
    /// `base_revision` is the revision of the snapshot the workspace was
    /// loaded from; the first submit uses the next one.
    pub fn new(remote: Arc<dyn RemoteWorkspace>, credential: Credential, base_revision: u64) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            remote,
            credential,
            issued: base_revision,
            outcome_tx,
            outcome_rx,
            in_flight: Vec::new(),
            written: Arc::new(Mutex::new(base_revision)),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn last_issued(&self) -> u64 {
        self.issued
    }

    /// Number of saves whose task has not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    /// Send the full module list as a replacement snapshot. Returns the
    /// revision assigned to it.
    pub fn submit(&mut self, modules: Vec<Value>) -> u64 {
        self.issued += 1;
        let revision = self.issued;
        self.in_flight.retain(|h| !h.is_finished());

        let snapshot = Snapshot { revision, modules };
        let remote = Arc::clone(&self.remote);
        let credential = self.credential.clone();
        let tx = self.outcome_tx.clone();
        let written = Arc::clone(&self.written);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(async move {
                    let mut written = written.lock().await;
                    let result = if revision < *written {
                        log::debug!("Revision {revision} superseded by {}", *written);
                        Ok(())
                    } else {
                        let result = remote.replace(&credential, snapshot).await;
                        if result.is_ok() {
                            *written = revision;
                        }
                        result
                    };
                    drop(written);
                    // Receiver gone means the persister was dropped.
                    let _ = tx.send(Outcome { revision, result });
                });
                self.in_flight.push(task);
            }
            Err(_) => {
                log::warn!("No async runtime; save of revision {revision} not sent");
                let _ = tx.send(Outcome {
                    revision,
                    result: Err(RemoteError::Network("no async runtime available".into())),
                });
            }
        }
        log::debug!("Submitted revision {revision}");
        revision
    }

    /// Collect completed saves, dropping stale ones.
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if outcome.revision < self.issued {
                log::debug!(
                    "Discarding stale ack for revision {} (latest {})",
                    outcome.revision,
                    self.issued
                );
                continue;
            }
            match outcome.result {
                Ok(()) => events.push(SyncEvent::Saved { revision: outcome.revision }),
                Err(error) => {
                    log::warn!("Save of revision {} failed: {error}", outcome.revision);
                    events.push(SyncEvent::Failed { revision: outcome.revision, error });
                }
            }
        }
        events
    }

    /// Wait for every in-flight save to complete.
    pub async fn flush(&mut self) {
        for task in self.in_flight.drain(..) {
            if let Err(e) = task.await {
                log::error!("Save task aborted: {e}");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
