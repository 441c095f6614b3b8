// Shared fixtures for the integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use doceria_client::{ClientError, ClientResult, Collection, DataGateway, RecordId};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// In-memory gateway with scriptable failures
#[derive(Default)]
pub struct FakeGateway {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
    failing: Mutex<HashSet<Collection>>,
    latency: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, collection: Collection, records: Vec<Value>) {
        self.collections.lock().insert(collection, records);
    }

    pub fn push(&self, collection: Collection, record: Value) {
        self.collections
            .lock()
            .entry(collection)
            .or_default()
            .push(record);
    }

    pub fn fail(&self, collection: Collection) {
        self.failing.lock().insert(collection);
    }

    pub fn recover(&self, collection: Collection) {
        self.failing.lock().remove(&collection);
    }

    /// Make every collection fetch take `latency`
    pub fn slow_down(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Number of collection fetches served so far
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataGateway for FakeGateway {
    async fn fetch_collection(&self, collection: Collection) -> ClientResult<Vec<Value>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.lock().contains(&collection) {
            return Err(ClientError::request_failed(collection.path(), 503));
        }
        Ok(self
            .collections
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_record(&self, collection: Collection, mut payload: Value) -> ClientResult<Value> {
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Some(object) = payload.as_object_mut() {
            object.insert("id".into(), Value::String(id));
        }
        self.push(collection, payload.clone());
        Ok(payload)
    }

    async fn update_record(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: Value,
    ) -> ClientResult<Value> {
        let mut collections = self.collections.lock();
        let records = collections.entry(collection).or_default();
        let record = records
            .iter_mut()
            .find(|r| r["id"] == id.as_str())
            .ok_or_else(|| ClientError::request_failed(format!("{collection}/{id}"), 404))?;
        if let (Some(target), Some(fields)) = (record.as_object_mut(), payload.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(record.clone())
    }

    async fn delete_record(&self, collection: Collection, id: &RecordId) -> ClientResult<()> {
        let mut collections = self.collections.lock();
        let records = collections.entry(collection).or_default();
        let before = records.len();
        records.retain(|r| r["id"] != id.as_str());
        if records.len() == before {
            return Err(ClientError::request_failed(format!("{collection}/{id}"), 404));
        }
        Ok(())
    }
}

pub fn order(id: &str, status: &str, total: f64) -> Value {
    json!({
        "id": id,
        "clienteNome": "Cliente",
        "itens": [],
        "total": total,
        "status": status,
        "origem": "Manual",
        "createdAt": "2026-10-16T10:00:00"
    })
}

pub fn customer(id: &str, name: &str) -> Value {
    json!({ "id": id, "nome": name, "email": format!("{id}@doceria.test"), "status": "Ativo" })
}

/// Serve a router on an ephemeral local port
pub async fn serve(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
