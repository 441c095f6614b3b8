//! Snapshot - the in-memory copy of all polled collections
//!
//! Replaced wholesale on every poll; the only in-place mutation is
//! removing a record after a confirmed remote delete.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{
    Collection, Customer, Expense, Order, OrderStatus, Product, Record, RecordId,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(rename = "clientes")]
    pub customers: Vec<Customer>,
    #[serde(rename = "pedidos")]
    pub orders: Vec<Order>,
    #[serde(rename = "produtos")]
    pub products: Vec<Product>,
    #[serde(rename = "despesas")]
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    /// Orders in status Pendente (the new-order alarm signal)
    pub fn pending_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count()
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Customers => self.customers.len(),
            Collection::Orders => self.orders.len(),
            Collection::Products => self.products.len(),
            Collection::Expenses => self.expenses.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|c| self.len(*c) == 0)
    }

    /// Remove a record by id. Returns whether anything was removed.
    pub fn remove(&mut self, collection: Collection, id: &RecordId) -> bool {
        match collection {
            Collection::Customers => remove_by_id(&mut self.customers, id),
            Collection::Orders => remove_by_id(&mut self.orders, id),
            Collection::Products => remove_by_id(&mut self.products, id),
            Collection::Expenses => remove_by_id(&mut self.expenses, id),
        }
    }

    /// Replace one collection from raw JSON records.
    ///
    /// Records that do not decode are skipped; returns how many were skipped.
    pub fn set_raw(&mut self, collection: Collection, raw: Vec<Value>) -> usize {
        let total = raw.len();
        let kept = match collection {
            Collection::Customers => {
                self.customers = decode_records(raw);
                self.customers.len()
            }
            Collection::Orders => {
                self.orders = decode_records(raw);
                self.orders.len()
            }
            Collection::Products => {
                self.products = decode_records(raw);
                self.products.len()
            }
            Collection::Expenses => {
                self.expenses = decode_records(raw);
                self.expenses.len()
            }
        };
        total - kept
    }
}

fn remove_by_id<T: Record>(records: &mut Vec<T>, id: &RecordId) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

/// Decode raw records of one collection, dropping the malformed ones
pub fn decode_records<T>(raw: Vec<Value>) -> Vec<T>
where
    T: Record + DeserializeOwned,
{
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    collection = %T::COLLECTION,
                    index,
                    error = %e,
                    "Skipping malformed record"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_raw_skips_malformed_records() {
        let mut snapshot = Snapshot::default();
        let skipped = snapshot.set_raw(
            Collection::Orders,
            vec![
                json!({"id": 1, "status": "Pendente"}),
                json!({"id": 3, "status": "Pendente", "itens": 5}),
                json!("not a record"),
                json!({"id": 2, "status": "Finalizado"}),
            ],
        );
        assert_eq!(skipped, 2);
        assert_eq!(snapshot.len(Collection::Orders), 2);
        assert_eq!(snapshot.pending_count(), 1);
    }

    #[test]
    fn test_orders_with_drifted_fields_still_count_as_pending() {
        let mut snapshot = Snapshot::default();
        let skipped = snapshot.set_raw(
            Collection::Orders,
            vec![
                json!({"status": "Pendente", "createdAt": 1760000000000_i64}),
                json!({
                    "status": "Pendente",
                    "itens": [{"produtoId": "p", "quantidade": "2", "precoUnitario": 5}]
                }),
                json!({"status": "Pendente", "createdAt": {"_seconds": 1760000000, "_nanoseconds": 0}}),
                json!({"id": "x", "status": null, "origem": null}),
            ],
        );
        assert_eq!(skipped, 0);
        assert_eq!(snapshot.pending_count(), 4);
        assert!(snapshot.orders[0].created_at.is_some());
        assert!(snapshot.orders[2].created_at.is_some());
    }

    #[test]
    fn test_remove_by_id() {
        let mut snapshot = Snapshot::default();
        snapshot.set_raw(
            Collection::Products,
            vec![json!({"id": "a", "nome": "Torta"}), json!({"id": "b", "nome": "Bolo"})],
        );
        assert!(snapshot.remove(Collection::Products, &RecordId::from("a")));
        assert!(!snapshot.remove(Collection::Products, &RecordId::from("a")));
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.products[0].name, "Bolo");
        assert!(!snapshot.is_empty());
    }
}
