//! Data models
//!
//! Wire records of the REST backend. Field names on the wire are the
//! backend's Portuguese keys; Rust names are English. Unknown fields are
//! ignored so backend additions never break polling.

pub mod customer;
pub mod expense;
pub mod order;
pub mod product;
pub mod role;

// Re-exports
pub use customer::*;
pub use expense::*;
pub use order::*;
pub use product::*;
pub use role::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ModelError;

/// Record identifier.
///
/// The backend hands out either numeric or string ids depending on the
/// collection; both are normalized to a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// REST resource collections polled into the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "clientes")]
    Customers,
    #[serde(rename = "pedidos")]
    Orders,
    #[serde(rename = "produtos")]
    Products,
    #[serde(rename = "despesas")]
    Expenses,
}

impl Collection {
    /// Polling order
    pub const ALL: [Collection; 4] = [
        Collection::Customers,
        Collection::Orders,
        Collection::Products,
        Collection::Expenses,
    ];

    /// URL path segment, also the collection's name in logs
    pub fn path(self) -> &'static str {
        match self {
            Collection::Customers => "clientes",
            Collection::Orders => "pedidos",
            Collection::Products => "produtos",
            Collection::Expenses => "despesas",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Collection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.path() == s)
            .ok_or_else(|| ModelError::UnknownCollection(s.to_string()))
    }
}

/// A record stored in one of the snapshot collections
pub trait Record {
    const COLLECTION: Collection;

    fn id(&self) -> &RecordId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_accepts_numbers_and_strings() {
        let a: RecordId = serde_json::from_str("42").unwrap();
        let b: RecordId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"42\"");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!("pedidos".parse::<Collection>().unwrap(), Collection::Orders);
        assert_eq!(Collection::Expenses.to_string(), "despesas");
        assert!(matches!(
            "fornecedores".parse::<Collection>(),
            Err(ModelError::UnknownCollection(_))
        ));
    }
}
