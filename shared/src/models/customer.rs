//! Customer Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Collection, Record, RecordId};
use crate::error::{ModelError, ModelResult};

/// Customer status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CustomerStatus {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "Inativo")]
    Inactive,
    #[serde(other)]
    Other,
}

impl CustomerStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Ativo",
            Self::Vip => "VIP",
            Self::Inactive => "Inativo",
            Self::Other => "Outro",
        }
    }
}

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(rename = "nome", default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub email: Option<String>,
    #[serde(
        rename = "telefone",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub phone: Option<String>,
    #[serde(
        rename = "endereco",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub address: Option<String>,
    #[serde(
        rename = "aniversario",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_date"
    )]
    pub birthday: Option<NaiveDate>,
    /// Aggregate purchase total in currency unit
    #[serde(rename = "totalCompras", default, deserialize_with = "crate::de::amount")]
    pub total_purchases: f64,
    #[serde(
        rename = "ultimaCompra",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub last_purchase: Option<String>,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub status: CustomerStatus,
}

impl Customer {
    /// Case-insensitive search over name and email
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&term))
    }

    /// Whether the birthday falls on `date` (month and day)
    pub fn has_birthday_on(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.birthday
            .is_some_and(|b| b.month() == date.month() && b.day() == date.day())
    }
}

impl Record for Customer {
    const COLLECTION: Collection = Collection::Customers;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Create/update customer payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "aniversario", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub status: CustomerStatus,
}

#[derive(Serialize)]
struct NewCustomerPayload<'a> {
    #[serde(flatten)]
    draft: &'a CustomerDraft,
    #[serde(rename = "totalCompras")]
    total_purchases: f64,
    #[serde(rename = "ultimaCompra")]
    last_purchase: String,
}

impl CustomerDraft {
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::invalid("nome", "required"));
        }
        Ok(())
    }

    /// Payload for a new customer: no purchases yet, last purchase = `today`
    pub fn to_create_payload(&self, today: NaiveDate) -> ModelResult<serde_json::Value> {
        self.validate()?;
        let payload = NewCustomerPayload {
            draft: self,
            total_purchases: 0.0,
            last_purchase: today.format("%Y-%m-%d").to_string(),
        };
        Ok(serde_json::to_value(payload)?)
    }

    pub fn to_update_payload(&self) -> ModelResult<serde_json::Value> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}
