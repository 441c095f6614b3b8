//! Doceria Client - data sync layer for the shop dashboard
//!
//! Talks to the REST backend, keeps a polled snapshot of the four
//! collections, raises the new-order alarm and manages the signed-in session.

pub mod alarm;
pub mod auth;
pub mod config;
pub mod copywriter;
pub mod error;
pub mod gateway;
pub mod http;
pub mod logger;
pub mod storage;
pub mod sync;

pub use alarm::{AlarmController, AlarmState, TerminalBell, ToneSink, spawn_alarm_listener};
pub use auth::{AuthAction, AuthError, Identity, Session, SessionManager};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use gateway::DataGateway;
pub use http::HttpClient;
pub use sync::{PollingGuard, SyncEvent, SyncHandle, SyncLifecycle, SyncWorker, Synchronizer};

// Re-export shared types for convenience
pub use shared::{Collection, DashboardMetrics, RecordId, Role, Snapshot, View};
