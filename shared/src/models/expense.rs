//! Expense Model

use serde::{Deserialize, Serialize};

use super::{Collection, Record, RecordId};

/// Expense entity (despesa)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(rename = "descricao", default, deserialize_with = "crate::de::null_as_default")]
    pub description: String,
    /// Amount in currency unit
    #[serde(rename = "valor", default, deserialize_with = "crate::de::amount")]
    pub amount: f64,
    #[serde(
        rename = "categoria",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub category: Option<String>,
    #[serde(
        rename = "data",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub date: Option<String>,
}

impl Record for Expense {
    const COLLECTION: Collection = Collection::Expenses;

    fn id(&self) -> &RecordId {
        &self.id
    }
}
