//! Order Model

use chrono::{DateTime, TimeZone};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Collection, Record, RecordId};
use crate::error::{ModelError, ModelResult};
use crate::util::parse_timestamp;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;

/// Maximum allowed quantity per line
const MAX_QUANTITY: u32 = 9999;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Em Produção", alias = "Em Producao")]
    InProduction,
    #[serde(rename = "Pronto para Entrega")]
    ReadyForDelivery,
    #[serde(rename = "Finalizado")]
    Completed,
    #[serde(rename = "Cancelado")]
    Cancelled,
    /// Status written by a newer backend
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Pending in the broad sense: not yet delivered nor cancelled
    pub fn is_open(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::InProduction | OrderStatus::ReadyForDelivery
        )
    }
}

/// Channel an order came in through
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrderOrigin {
    /// Typed in by staff at the dashboard
    #[default]
    Manual,
    #[serde(rename = "Cardapio Online", alias = "Cardápio Online")]
    OnlineMenu,
    #[serde(other)]
    Other,
}

/// Order line; the unit price is captured when the order is written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(rename = "produtoId", default)]
    pub product_id: RecordId,
    #[serde(
        rename = "nome",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub name: Option<String>,
    #[serde(rename = "quantidade", default, deserialize_with = "crate::de::quantity")]
    pub quantity: u32,
    #[serde(
        rename = "precoUnitario",
        alias = "preco",
        default,
        deserialize_with = "crate::de::amount"
    )]
    pub unit_price: f64,
}

impl OrderItem {
    pub fn new(product_id: impl Into<RecordId>, quantity: u32, unit_price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            name: None,
            quantity,
            unit_price,
        }
    }

    fn validate(&self) -> ModelResult<()> {
        if self.quantity == 0 || self.quantity > MAX_QUANTITY {
            return Err(ModelError::invalid(
                "quantidade",
                format!("must be between 1 and {MAX_QUANTITY}, got {}", self.quantity),
            ));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 || self.unit_price > MAX_PRICE {
            return Err(ModelError::invalid(
                "precoUnitario",
                format!("must be between 0 and {MAX_PRICE}, got {}", self.unit_price),
            ));
        }
        Ok(())
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(alias = "_id", default)]
    pub id: RecordId,
    #[serde(rename = "clienteId", default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<RecordId>,
    #[serde(
        rename = "clienteNome",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub customer_name: Option<String>,
    #[serde(rename = "itens", default)]
    pub items: Vec<OrderItem>,
    /// Total in currency unit, two decimals
    #[serde(default, deserialize_with = "crate::de::amount")]
    pub total: f64,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub status: OrderStatus,
    #[serde(rename = "origem", default, deserialize_with = "crate::de::null_as_default")]
    pub origin: OrderOrigin,
    #[serde(
        rename = "createdAt",
        alias = "dataPedido",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::timestamp"
    )]
    pub created_at: Option<String>,
}

impl Order {
    /// Creation time in the business timezone, `None` if missing or unparseable
    pub fn created_at_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        self.created_at
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, tz))
    }
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Orders;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Editor-side order payload.
///
/// The total is never taken from the edited state: [`OrderDraft::to_payload`]
/// always writes the sum of quantity × unit price of the current lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderDraft {
    #[serde(rename = "clienteId", skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<RecordId>,
    #[serde(rename = "itens")]
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    #[serde(rename = "origem")]
    pub origin: OrderOrigin,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Serialize)]
struct OrderPayload<'a> {
    #[serde(flatten)]
    draft: &'a OrderDraft,
    total: f64,
}

impl OrderDraft {
    /// Start editing an existing order
    pub fn from_order(order: &Order) -> Self {
        Self {
            customer_id: order.customer_id.clone(),
            items: order.items.clone(),
            status: order.status,
            origin: order.origin,
            created_at: order.created_at.clone(),
        }
    }

    /// Sum of quantity × unit price, rounded half-up to two decimals
    pub fn total(&self) -> f64 {
        let sum: Decimal = self
            .items
            .iter()
            .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
            .sum();
        round_money(sum)
    }

    /// Validate the lines and encode the draft with its recomputed total
    pub fn to_payload(&self) -> ModelResult<serde_json::Value> {
        if self.items.is_empty() {
            return Err(ModelError::EmptyOrder);
        }
        for item in &self.items {
            item.validate()?;
        }
        let payload = OrderPayload {
            draft: self,
            total: self.total(),
        };
        Ok(serde_json::to_value(payload)?)
    }
}

/// f64 → Decimal; non-finite values count as zero
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Decimal → f64 at two decimals
pub(crate) fn round_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_order_parses_backend_shape() {
        let json = r#"{
            "id": 7,
            "clienteId": "c-1",
            "itens": [{"produtoId": 3, "quantidade": 2, "precoUnitario": "4.50"}],
            "total": 9,
            "status": "Em Produção",
            "origem": "Cardapio Online",
            "createdAt": "2026-10-16T12:00:00.000Z",
            "observacao": "sem açúcar"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id.as_str(), "7");
        assert_eq!(order.status, OrderStatus::InProduction);
        assert_eq!(order.origin, OrderOrigin::OnlineMenu);
        assert_eq!(order.items[0].unit_price, 4.5);
        assert!(order.status.is_open());
    }

    #[test]
    fn test_unknown_status_and_missing_fields_default() {
        let order: Order =
            serde_json::from_str(r#"{"id": "a", "status": "Arquivado"}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.origin, OrderOrigin::Manual);
        assert_eq!(order.total, 0.0);
        assert!(order.created_at.is_none());
        assert!(!order.status.is_open());
    }

    #[test]
    fn test_unparseable_creation_time_is_none() {
        let order: Order =
            serde_json::from_str(r#"{"id": "a", "createdAt": "amanhã"}"#).unwrap();
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        assert!(order.created_at_in(&tz).is_none());
    }

    #[test]
    fn test_epoch_and_timestamp_object_creation_times() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let millis: Order =
            serde_json::from_str(r#"{"id": "a", "createdAt": 1760000000000}"#).unwrap();
        let seconds: Order = serde_json::from_str(
            r#"{"id": "b", "createdAt": {"_seconds": 1760000000, "_nanoseconds": 0}}"#,
        )
        .unwrap();

        let expected = tz.timestamp_opt(1_760_000_000, 0).unwrap();
        assert_eq!(millis.created_at_in(&tz), Some(expected));
        assert_eq!(seconds.created_at_in(&tz), Some(expected));
    }

    #[test]
    fn test_null_status_and_origin_fall_back() {
        let order: Order = serde_json::from_str(
            r#"{"id": "a", "status": null, "origem": null, "createdAt": false}"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.origin, OrderOrigin::Manual);
        assert!(order.created_at.is_none());
    }

    #[test]
    fn test_form_string_quantity_keeps_the_order() {
        let order: Order = serde_json::from_str(
            r#"{"status": "Pendente", "itens": [{"produtoId": "p", "quantidade": "2", "preco": "3,50"}]}"#,
        )
        .unwrap();
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, 3.5);
        assert!(order.id.as_str().is_empty());
        assert_eq!(OrderDraft::from_order(&order).total(), 7.0);
    }

    #[test]
    fn test_draft_total_is_recomputed() {
        let draft = OrderDraft {
            items: vec![
                OrderItem::new("1", 3, 0.1),
                OrderItem::new("2", 1, 12.345),
            ],
            ..Default::default()
        };
        assert_eq!(draft.total(), 12.65);

        let payload = draft.to_payload().unwrap();
        assert_eq!(payload["total"], serde_json::json!(12.65));
        assert_eq!(payload["status"], "Pendente");
        assert_eq!(payload["origem"], "Manual");
    }

    #[test]
    fn test_edited_order_ignores_stale_total() {
        let mut order: Order = serde_json::from_str(
            r#"{"id": "9", "total": 100, "itens": [{"produtoId": "p", "quantidade": 1, "precoUnitario": 20}]}"#,
        )
        .unwrap();
        order.items[0].quantity = 3;

        let payload = OrderDraft::from_order(&order).to_payload().unwrap();
        assert_eq!(payload["total"], serde_json::json!(60.0));
    }

    #[test]
    fn test_draft_validation() {
        assert_eq!(
            OrderDraft::default().to_payload().unwrap_err(),
            ModelError::EmptyOrder
        );

        let draft = OrderDraft {
            items: vec![OrderItem::new("1", 0, 5.0)],
            ..Default::default()
        };
        assert!(matches!(
            draft.to_payload(),
            Err(ModelError::InvalidField { field: "quantidade", .. })
        ));
    }
}
