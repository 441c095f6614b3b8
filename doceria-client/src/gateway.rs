//! Remote data gateway seam
//!
//! The synchronizer only talks to the backend through [`DataGateway`], so
//! polling logic can be exercised against an in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::{Collection, RecordId};

use crate::ClientResult;

/// CRUD access to the four resource collections
#[async_trait]
pub trait DataGateway: Send + Sync + 'static {
    /// GET /{collection}. A non-sequence body yields an empty sequence.
    async fn fetch_collection(&self, collection: Collection) -> ClientResult<Vec<Value>>;

    /// POST /{collection}
    async fn create_record(&self, collection: Collection, payload: Value) -> ClientResult<Value>;

    /// PUT /{collection}/{id}
    async fn update_record(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: Value,
    ) -> ClientResult<Value>;

    /// DELETE /{collection}/{id}
    async fn delete_record(&self, collection: Collection, id: &RecordId) -> ClientResult<()>;
}

#[async_trait]
impl<G: DataGateway + ?Sized> DataGateway for Arc<G> {
    async fn fetch_collection(&self, collection: Collection) -> ClientResult<Vec<Value>> {
        (**self).fetch_collection(collection).await
    }

    async fn create_record(&self, collection: Collection, payload: Value) -> ClientResult<Value> {
        (**self).create_record(collection, payload).await
    }

    async fn update_record(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: Value,
    ) -> ClientResult<Value> {
        (**self).update_record(collection, id, payload).await
    }

    async fn delete_record(&self, collection: Collection, id: &RecordId) -> ClientResult<()> {
        (**self).delete_record(collection, id).await
    }
}
