//! Shared types for the Doceria dashboard
//!
//! Wire models for the four REST collections, the in-memory snapshot,
//! and the pure logic that derives dashboard metrics and the role-gated
//! menu from it. Shared between the client library and the monitor binary.

pub mod dashboard;
pub mod de;
pub mod error;
pub mod menu;
pub mod models;
pub mod snapshot;
pub mod util;

// Re-exports
pub use dashboard::DashboardMetrics;
pub use error::{ModelError, ModelResult};
pub use menu::{MenuEntry, View};
pub use models::{Collection, Record, RecordId, Role};
pub use serde::{Deserialize, Serialize};
pub use snapshot::Snapshot;
