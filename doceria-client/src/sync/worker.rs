//! SyncWorker: background task that owns the [`Synchronizer`]
//!
//! Periodic refreshes and user-initiated writes arrive on the same task, so
//! a create/update/delete never interleaves with a refresh cycle.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use shared::{Collection, RecordId, Snapshot};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{RefreshOutcome, SyncEvent, Synchronizer};
use crate::config::MIN_PERIOD;
use crate::gateway::DataGateway;
use crate::{ClientError, ClientResult};

/// Pending command buffer
const COMMAND_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<ClientResult<T>>;

enum SyncCommand {
    Refresh(oneshot::Sender<RefreshOutcome>),
    Create {
        collection: Collection,
        payload: Value,
        reply: Reply<Value>,
    },
    Update {
        collection: Collection,
        id: RecordId,
        payload: Value,
        reply: Reply<Value>,
    },
    Delete {
        collection: Collection,
        id: RecordId,
        reply: Reply<()>,
    },
}

pub struct SyncWorker<G> {
    synchronizer: Synchronizer<G>,
    interval: Duration,
    commands: mpsc::Receiver<SyncCommand>,
    shutdown: CancellationToken,
}

impl<G: DataGateway> SyncWorker<G> {
    /// Spawn the polling loop.
    ///
    /// The first refresh runs immediately. Dropping the returned guard stops
    /// the timer; no refresh cycle starts after cancellation. Intervals
    /// shorter than [`MIN_PERIOD`] are raised to it.
    pub fn spawn(synchronizer: Synchronizer<G>, interval: Duration) -> (SyncHandle, PollingGuard) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let shutdown = CancellationToken::new();
        let handle = SyncHandle {
            commands: tx,
            snapshot: synchronizer.watch_snapshot(),
            events: synchronizer.event_sender(),
        };
        let worker = Self {
            synchronizer,
            interval: interval.max(MIN_PERIOD),
            commands: rx,
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(worker.run());
        (
            handle,
            PollingGuard {
                shutdown,
                task: Some(task),
            },
        )
    }

    async fn run(mut self) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "SyncWorker started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    tracing::info!("SyncWorker shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    let outcome = self.synchronizer.refresh().await;
                    tracing::debug!(
                        pending = outcome.pending_after,
                        failed = outcome.failed_collections,
                        "Periodic refresh completed"
                    );
                }

                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.handle(command).await,
                        None => {
                            tracing::info!("All sync handles dropped, SyncWorker stopping");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("SyncWorker stopped");
    }

    async fn handle(&mut self, command: SyncCommand) {
        // A dropped reply receiver means the caller stopped waiting
        match command {
            SyncCommand::Refresh(reply) => {
                let _ = reply.send(self.synchronizer.refresh().await);
            }
            SyncCommand::Create {
                collection,
                payload,
                reply,
            } => {
                let _ = reply.send(self.synchronizer.create_item(collection, payload).await);
            }
            SyncCommand::Update {
                collection,
                id,
                payload,
                reply,
            } => {
                let result = self.synchronizer.update_item(collection, &id, payload).await;
                let _ = reply.send(result);
            }
            SyncCommand::Delete {
                collection,
                id,
                reply,
            } => {
                let _ = reply.send(self.synchronizer.delete_item(collection, &id).await);
            }
        }
    }
}

/// Cloneable front-end to a running [`SyncWorker`]
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::Sender<SyncCommand>,
    snapshot: watch::Receiver<Arc<Snapshot>>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncHandle {
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Run a refresh cycle now and wait for it
    pub async fn refresh(&self) -> ClientResult<RefreshOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::Refresh(reply)).await?;
        rx.await.map_err(|_| ClientError::WorkerStopped)
    }

    pub async fn create_item(&self, collection: Collection, payload: Value) -> ClientResult<Value> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::Create {
            collection,
            payload,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ClientError::WorkerStopped)?
    }

    pub async fn update_item(
        &self,
        collection: Collection,
        id: RecordId,
        payload: Value,
    ) -> ClientResult<Value> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::Update {
            collection,
            id,
            payload,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ClientError::WorkerStopped)?
    }

    pub async fn delete_item(&self, collection: Collection, id: RecordId) -> ClientResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::Delete {
            collection,
            id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ClientError::WorkerStopped)?
    }

    async fn send(&self, command: SyncCommand) -> ClientResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::WorkerStopped)
    }
}

/// Stops the polling loop when shut down or dropped
pub struct PollingGuard {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollingGuard {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancel the loop and wait for an in-flight cycle to finish
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::error!(error = %e, "SyncWorker task failed");
        }
    }
}

impl Drop for PollingGuard {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
