//! Background persistence queue.
//!
//! Every store mutation enqueues a snapshot of the state. A single worker
//! task drains the queue in order and writes the newest snapshot it can see,
//! so the durable value always converges on the last mutation.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::storage::{KeyValueStorage, StorageError};

use super::state::RouteState;

/// Result of one write performed by the persist worker.
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    /// Mutation counter of the snapshot that was written. Snapshots that
    /// were superseded before the worker reached them are never written
    /// and produce no outcome of their own.
    pub generation: u64,
    pub result: Result<(), StorageError>,
}

impl PersistOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub(crate) enum PersistJob {
    Write { generation: u64, state: RouteState },
    Flush(oneshot::Sender<Result<(), StorageError>>),
}

pub(crate) struct PersistWorker {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    outcomes: broadcast::Sender<PersistOutcome>,
    last_result: Result<(), StorageError>,
}

impl PersistWorker {
    pub(crate) fn new(
        storage: Arc<dyn KeyValueStorage>,
        key: String,
        outcomes: broadcast::Sender<PersistOutcome>,
    ) -> Self {
        Self {
            storage,
            key,
            outcomes,
            last_result: Ok(()),
        }
    }

    /// Process jobs until every sender has been dropped.
    pub(crate) async fn run(mut self, mut jobs: mpsc::UnboundedReceiver<PersistJob>) {
        while let Some(job) = jobs.recv().await {
            match job {
                PersistJob::Write {
                    mut generation,
                    mut state,
                } => {
                    // Coalesce writes that are already queued; stop at a
                    // flush so it is answered after this write lands.
                    let mut flush = None;
                    loop {
                        match jobs.try_recv() {
                            Ok(PersistJob::Write {
                                generation: g,
                                state: s,
                            }) => {
                                generation = g;
                                state = s;
                            }
                            Ok(PersistJob::Flush(reply)) => {
                                flush = Some(reply);
                                break;
                            }
                            Err(_) => break,
                        }
                    }

                    self.write(generation, &state).await;

                    if let Some(reply) = flush {
                        let _ = reply.send(self.last_result.clone());
                    }
                }
                PersistJob::Flush(reply) => {
                    let _ = reply.send(self.last_result.clone());
                }
            }
        }

        debug!(key = %self.key, "persist queue closed");
    }

    async fn write(&mut self, generation: u64, state: &RouteState) {
        let result = match state.encode() {
            Ok(text) => self.storage.write(&self.key, &text).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => debug!(key = %self.key, generation, "persisted state"),
            Err(e) => warn!(
                key = %self.key,
                generation,
                error = %e,
                "failed to persist state; in-memory state is kept"
            ),
        }

        self.last_result = result.clone();

        // No subscribers is fine
        let _ = self.outcomes.send(PersistOutcome { generation, result });
    }
}
