use std::sync::Arc;

use serde_json::Value;
use shared::models::OrderDraft;
use shared::{Collection, RecordId, Snapshot};
use tokio::sync::{broadcast, watch};

use crate::ClientResult;
use crate::gateway::DataGateway;

/// Broadcast buffer for sync events
const EVENT_CAPACITY: usize = 64;

/// Whether a refresh has established the baseline for change detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncLifecycle {
    Uninitialized,
    Initialized,
}

/// Events published after refresh cycles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The pending-order count grew since the previous cycle
    NewOrderDetected { previous: usize, current: usize },
    /// A refresh cycle completed and the snapshot was replaced
    Refreshed { pending: usize },
}

/// Result of one refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub pending_before: usize,
    pub pending_after: usize,
    pub new_orders_detected: bool,
    /// Collections that failed and were degraded to empty
    pub failed_collections: usize,
}

/// Owner of the canonical snapshot.
///
/// Readers get the snapshot through a `watch` channel; it is replaced as a
/// single value once all four fetches of a cycle have resolved, so the
/// pending comparison always sees the previous completed cycle.
pub struct Synchronizer<G> {
    gateway: G,
    lifecycle: SyncLifecycle,
    snapshot: watch::Sender<Arc<Snapshot>>,
    events: broadcast::Sender<SyncEvent>,
}

impl<G: DataGateway> Synchronizer<G> {
    pub fn new(gateway: G) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            lifecycle: SyncLifecycle::Uninitialized,
            snapshot,
            events,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn lifecycle(&self) -> SyncLifecycle {
        self.lifecycle
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<SyncEvent> {
        self.events.clone()
    }

    /// Fetch all collections concurrently and replace the snapshot.
    ///
    /// A failed collection degrades to empty without affecting the others.
    /// `NewOrderDetected` is emitted at most once per cycle, and never before
    /// the first cycle in which orders were fetched successfully.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let (customers, orders, products, expenses) = tokio::join!(
            self.fetch(Collection::Customers),
            self.fetch(Collection::Orders),
            self.fetch(Collection::Products),
            self.fetch(Collection::Expenses),
        );

        let orders_fetched = orders.is_some();
        let mut next = Snapshot::default();
        let mut failed_collections = 0;
        for (collection, raw) in [
            (Collection::Customers, customers),
            (Collection::Orders, orders),
            (Collection::Products, products),
            (Collection::Expenses, expenses),
        ] {
            let raw = raw.unwrap_or_else(|| {
                failed_collections += 1;
                Vec::new()
            });
            next.set_raw(collection, raw);
        }

        let pending_before = self.snapshot.borrow().pending_count();
        let pending_after = next.pending_count();
        let new_orders_detected =
            self.lifecycle == SyncLifecycle::Initialized && pending_after > pending_before;

        self.snapshot.send_replace(Arc::new(next));
        if orders_fetched && self.lifecycle == SyncLifecycle::Uninitialized {
            tracing::debug!(pending = pending_after, "Initial snapshot loaded");
            self.lifecycle = SyncLifecycle::Initialized;
        }

        if new_orders_detected {
            tracing::info!(
                previous = pending_before,
                current = pending_after,
                "New pending order detected"
            );
            // No subscribers is fine
            let _ = self.events.send(SyncEvent::NewOrderDetected {
                previous: pending_before,
                current: pending_after,
            });
        }
        let _ = self.events.send(SyncEvent::Refreshed {
            pending: pending_after,
        });

        RefreshOutcome {
            pending_before,
            pending_after,
            new_orders_detected,
            failed_collections,
        }
    }

    async fn fetch(&self, collection: Collection) -> Option<Vec<Value>> {
        match self.gateway.fetch_collection(collection).await {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "Collection fetch failed, using an empty collection"
                );
                None
            }
        }
    }

    /// Create remotely, then refresh everything
    pub async fn create_item(&mut self, collection: Collection, payload: Value) -> ClientResult<Value> {
        let created = self.gateway.create_record(collection, payload).await?;
        self.refresh().await;
        Ok(created)
    }

    /// Update remotely, then refresh everything
    pub async fn update_item(
        &mut self,
        collection: Collection,
        id: &RecordId,
        payload: Value,
    ) -> ClientResult<Value> {
        let updated = self.gateway.update_record(collection, id, payload).await?;
        self.refresh().await;
        Ok(updated)
    }

    /// Delete remotely, then drop the record locally without refetching
    pub async fn delete_item(&mut self, collection: Collection, id: &RecordId) -> ClientResult<()> {
        self.gateway.delete_record(collection, id).await?;
        self.snapshot.send_modify(|snapshot| {
            if !Arc::make_mut(snapshot).remove(collection, id) {
                tracing::debug!(collection = %collection, id = %id, "Deleted record was not in the snapshot");
            }
        });
        Ok(())
    }

    /// Create an order with its total recomputed from the lines
    pub async fn create_order(&mut self, draft: &OrderDraft) -> ClientResult<Value> {
        let payload = draft.to_payload()?;
        self.create_item(Collection::Orders, payload).await
    }

    /// Update an order with its total recomputed from the lines
    pub async fn update_order(&mut self, id: &RecordId, draft: &OrderDraft) -> ClientResult<Value> {
        let payload = draft.to_payload()?;
        self.update_item(Collection::Orders, id, payload).await
    }
}
