//! # Best-Effort Persistence
//!
//! Every accepted cart change becomes one write job. A single writer task
//! drains the jobs in the order they were issued.
//!
//! ## Write Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Persistence Writer                                   │
//! │                                                                         │
//! │  mutation (under the snapshot write lock)                               │
//! │       │                                                                 │
//! │       │  WriteJob { revision: n, state, done }                          │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐                                               │
//! │  │  unbounded mpsc      │  jobs enqueued in revision order              │
//! │  └──────────┬───────────┘                                               │
//! │             │  (writer is spawned only after hydration)                 │
//! │             ▼                                                           │
//! │  revision <= last durable? ── yes ──► Superseded (no write)            │
//! │             │ no                                                        │
//! │             ▼                                                           │
//! │  encode_lines ──► store.set(key, blob)                                  │
//! │             │                                                           │
//! │       ┌─────┴──────┐                                                    │
//! │       ▼            ▼                                                    │
//! │    Written    PersistenceWriteFailed ──► warn! + warnings broadcast     │
//! │                                                                         │
//! │  Each job resolves its PendingWrite and advances the settled mark.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! The durable copy may lag the in-memory cart but never moves backwards:
//! jobs are processed one at a time, oldest first, and a job is skipped if a
//! newer revision is already durable.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, warn};

use cartkeep_core::{encode_lines, CartState};
use cartkeep_db::KeyValueStore;

use crate::error::{CartError, CartResult};

/// How a write job was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The snapshot is now in the store.
    Written,

    /// The mutation changed nothing, so nothing was written.
    Unchanged,

    /// A newer revision was already durable (or hydration replaced the
    /// state this job captured), so this one was skipped.
    Superseded,
}

/// One snapshot waiting to be written.
#[derive(Debug)]
pub(crate) struct WriteJob {
    pub(crate) revision: u64,
    pub(crate) state: Arc<CartState>,
    pub(crate) done: oneshot::Sender<CartResult<PersistOutcome>>,
}

/// Durability receipt returned by every mutation.
///
/// Dropping it is fire-and-forget: the write still happens.
#[derive(Debug)]
pub struct PendingWrite {
    revision: u64,
    receipt: Option<oneshot::Receiver<CartResult<PersistOutcome>>>,
}

impl PendingWrite {
    pub(crate) fn queued(
        revision: u64,
        receipt: oneshot::Receiver<CartResult<PersistOutcome>>,
    ) -> Self {
        PendingWrite {
            revision,
            receipt: Some(receipt),
        }
    }

    pub(crate) fn unchanged(revision: u64) -> Self {
        PendingWrite {
            revision,
            receipt: None,
        }
    }

    /// Revision of the snapshot this mutation published, or the current
    /// revision if nothing changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true if the mutation left the cart as it was.
    pub fn is_unchanged(&self) -> bool {
        self.receipt.is_none()
    }

    /// Waits until the writer has handled this mutation's snapshot.
    pub async fn settled(self) -> CartResult<PersistOutcome> {
        match self.receipt {
            None => Ok(PersistOutcome::Unchanged),
            Some(receipt) => receipt
                .await
                .unwrap_or(Err(CartError::PersistenceUnavailable)),
        }
    }
}

/// Everything the writer task owns. Holds no reference back to the engine,
/// so the task ends once the engine (the only job sender) is dropped.
pub(crate) struct Writer<S> {
    pub(crate) store: Arc<S>,
    pub(crate) key: String,
    pub(crate) jobs: mpsc::UnboundedReceiver<WriteJob>,
    pub(crate) warnings: broadcast::Sender<CartError>,
    pub(crate) settled: Arc<watch::Sender<u64>>,
    /// Newest revision known to be in the store.
    pub(crate) durable: u64,
}

impl<S: KeyValueStore> Writer<S> {
    pub(crate) async fn run(mut self) {
        debug!(key = %self.key, durable = self.durable, "Persistence writer started");

        while let Some(job) = self.jobs.recv().await {
            let revision = job.revision;
            let outcome = self.handle(&job).await;

            self.settled.send_modify(|settled| *settled = (*settled).max(revision));

            // The caller may have dropped its receipt
            let _ = job.done.send(outcome);
        }

        debug!(key = %self.key, "Persistence writer stopped");
    }

    async fn handle(&mut self, job: &WriteJob) -> CartResult<PersistOutcome> {
        if job.revision <= self.durable {
            debug!(
                revision = job.revision,
                durable = self.durable,
                "Skipping superseded cart snapshot"
            );
            return Ok(PersistOutcome::Superseded);
        }

        let written = match encode_lines(&job.state) {
            Ok(blob) => self
                .store
                .set(&self.key, &blob)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match written {
            Ok(()) => {
                self.durable = job.revision;
                debug!(
                    revision = job.revision,
                    lines = job.state.len(),
                    "Cart snapshot persisted"
                );
                Ok(PersistOutcome::Written)
            }
            Err(reason) => {
                let err = CartError::PersistenceWriteFailed {
                    revision: job.revision,
                    reason,
                };
                warn!(error = %err, "Cart snapshot not persisted");
                // No subscribers is fine
                let _ = self.warnings.send(err.clone());
                Err(err)
            }
        }
    }
}
