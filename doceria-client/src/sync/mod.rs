//! Snapshot synchronization
//!
//! [`Synchronizer`] owns the canonical [`Snapshot`](shared::Snapshot) and the
//! new-order change detection; [`SyncWorker`] drives it from a timer and
//! serializes every write through one task.

mod synchronizer;
mod worker;

pub use synchronizer::{RefreshOutcome, SyncEvent, SyncLifecycle, Synchronizer};
pub use worker::{PollingGuard, SyncHandle, SyncWorker};
