//! Dashboard metrics
//!
//! Pure function of a snapshot and the current wall-clock time. Calendar
//! boundaries (today, the week starting Sunday 00:00) are taken in the
//! timezone of `now`.

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::order::{round_money, to_decimal};
use crate::models::{OrderOrigin, OrderStatus};
use crate::snapshot::Snapshot;
use crate::util::week_start;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Finalized orders created today
    pub sales_today: f64,
    pub count_sales_today: usize,
    /// Finalized orders from the most recent Sunday 00:00 through now
    pub sales_this_week: f64,
    pub count_sales_this_week: usize,
    /// Open orders entered by staff
    pub pending_crm_count: usize,
    /// Open orders from the online menu
    pub pending_online_count: usize,
    /// Orders in status Pendente only
    pub pending_count: usize,
    /// All order totals, any status, any time
    pub total_sales: f64,
    /// Every customer record counts
    pub active_customer_count: usize,
    /// Products with stock below `LOW_STOCK_THRESHOLD`
    pub low_stock_count: usize,
}

impl DashboardMetrics {
    pub fn compute<Tz: TimeZone>(snapshot: &Snapshot, now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let now_local = now.naive_local();
        let today = now_local.date();
        let week_from = week_start(today);

        let mut metrics = DashboardMetrics {
            active_customer_count: snapshot.customers.len(),
            pending_count: snapshot.pending_count(),
            low_stock_count: snapshot.products.iter().filter(|p| p.is_low_stock()).count(),
            ..Default::default()
        };
        let mut total = Decimal::ZERO;
        let mut today_sum = Decimal::ZERO;
        let mut week_sum = Decimal::ZERO;

        for order in &snapshot.orders {
            let amount = to_decimal(order.total);
            total += amount;

            if order.status.is_open() {
                match order.origin {
                    OrderOrigin::OnlineMenu => metrics.pending_online_count += 1,
                    _ => metrics.pending_crm_count += 1,
                }
            }

            if order.status != OrderStatus::Completed {
                continue;
            }
            // Missing or unparseable timestamps stay out of every time window
            let Some(created) = order.created_at_in(&tz) else {
                continue;
            };
            let created = created.naive_local();

            if created.date() == today {
                today_sum += amount;
                metrics.count_sales_today += 1;
            }
            if created >= week_from && created <= now_local {
                week_sum += amount;
                metrics.count_sales_this_week += 1;
            }
        }

        metrics.total_sales = round_money(total);
        metrics.sales_today = round_money(today_sum);
        metrics.sales_this_week = round_money(week_sum);
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collection;
    use chrono::FixedOffset;
    use serde_json::{Value, json};

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    /// Friday 2026-10-16 15:00 in São Paulo
    fn friday_afternoon() -> DateTime<FixedOffset> {
        brt().with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap()
    }

    fn order(id: u32, status: &str, total: f64, created_at: Value) -> Value {
        json!({"id": id, "status": status, "total": total, "createdAt": created_at})
    }

    fn snapshot_with_orders(orders: Vec<Value>) -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.set_raw(Collection::Orders, orders);
        snapshot
    }

    #[test]
    fn test_sales_today_only_counts_finalized_orders_of_today() {
        let snapshot = snapshot_with_orders(vec![
            order(1, "Finalizado", 10.10, json!("2026-10-16T09:00:00-03:00")),
            order(2, "Finalizado", 20.20, json!("2026-10-16T14:59:00-03:00")),
            order(3, "Pendente", 99.0, json!("2026-10-16T10:00:00-03:00")),
            order(4, "Finalizado", 50.0, json!("2026-10-15T23:59:00-03:00")),
        ]);

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.sales_today, 30.3);
        assert_eq!(metrics.count_sales_today, 2);
        assert_eq!(metrics.total_sales, 179.3);
    }

    #[test]
    fn test_today_boundary_is_local_midnight() {
        // 02:30 UTC on the 16th is still the 15th in São Paulo
        let snapshot = snapshot_with_orders(vec![order(
            1,
            "Finalizado",
            10.0,
            json!("2026-10-16T02:30:00Z"),
        )]);

        let on_16th = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(on_16th.count_sales_today, 0);

        let on_15th = brt().with_ymd_and_hms(2026, 10, 15, 22, 0, 0).unwrap();
        let metrics = DashboardMetrics::compute(&snapshot, &on_15th);
        assert_eq!(metrics.count_sales_today, 1);
        assert_eq!(metrics.sales_today, 10.0);
    }

    #[test]
    fn test_week_window_starts_sunday_midnight_inclusive() {
        let snapshot = snapshot_with_orders(vec![
            order(1, "Finalizado", 5.0, json!("2026-10-11T00:00:00-03:00")),
            order(2, "Finalizado", 7.0, json!("2026-10-10T23:59:00-03:00")),
            order(3, "Finalizado", 11.0, json!("2026-10-14T12:00:00-03:00")),
            order(4, "Cancelado", 13.0, json!("2026-10-14T12:00:00-03:00")),
        ]);

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.count_sales_this_week, 2);
        assert_eq!(metrics.sales_this_week, 16.0);
    }

    #[test]
    fn test_week_window_on_sunday_starts_today() {
        let snapshot = snapshot_with_orders(vec![
            order(1, "Finalizado", 5.0, json!("2026-10-18T08:00:00-03:00")),
            order(2, "Finalizado", 7.0, json!("2026-10-17T18:00:00-03:00")),
        ]);
        let sunday = brt().with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let metrics = DashboardMetrics::compute(&snapshot, &sunday);
        assert_eq!(metrics.count_sales_this_week, 1);
        assert_eq!(metrics.sales_this_week, 5.0);
    }

    #[test]
    fn test_pending_split_by_origin() {
        let mut snapshot = Snapshot::default();
        snapshot.set_raw(
            Collection::Orders,
            vec![
                json!({"id": 1, "status": "Pendente", "origem": "Manual"}),
                json!({"id": 2, "status": "Pendente", "origem": "Manual"}),
                json!({"id": 3, "status": "Pendente", "origem": "Cardapio Online"}),
                json!({"id": 4, "status": "Finalizado", "origem": "Cardapio Online"}),
                json!({"id": 5, "status": "Cancelado", "origem": "Manual"}),
            ],
        );

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.pending_crm_count, 2);
        assert_eq!(metrics.pending_online_count, 1);
        assert_eq!(metrics.pending_count, 3);
    }

    #[test]
    fn test_open_statuses_count_as_pending_for_the_split() {
        let snapshot = snapshot_with_orders(vec![
            json!({"id": 1, "status": "Em Produção"}),
            json!({"id": 2, "status": "Pronto para Entrega", "origem": "Cardapio Online"}),
        ]);

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.pending_crm_count, 1);
        assert_eq!(metrics.pending_online_count, 1);
        assert_eq!(metrics.pending_count, 0);
    }

    #[test]
    fn test_bad_timestamps_only_leave_time_windows() {
        let snapshot = snapshot_with_orders(vec![
            json!({"id": 1, "status": "Finalizado", "total": 8.0}),
            json!({"id": 2, "status": "Finalizado", "total": 4.0, "createdAt": "ontem"}),
            json!({"id": 3, "status": "Pendente", "createdAt": "???"}),
        ]);

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.count_sales_today, 0);
        assert_eq!(metrics.count_sales_this_week, 0);
        assert_eq!(metrics.total_sales, 12.0);
        assert_eq!(metrics.pending_crm_count, 1);
    }

    #[test]
    fn test_every_customer_is_active() {
        let mut snapshot = Snapshot::default();
        snapshot.set_raw(
            Collection::Customers,
            vec![
                json!({"id": 1, "nome": "Ana", "status": "Inativo"}),
                json!({"id": 2, "nome": "Bia"}),
            ],
        );

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.active_customer_count, 2);
    }

    #[test]
    fn test_low_stock_products_are_counted() {
        let mut snapshot = Snapshot::default();
        snapshot.set_raw(
            Collection::Products,
            vec![
                json!({"id": 1, "nome": "Bolo", "estoque": 3}),
                json!({"id": 2, "nome": "Torta", "estoque": "10"}),
                json!({"id": 3, "nome": "Brownie"}),
            ],
        );

        let metrics = DashboardMetrics::compute(&snapshot, &friday_afternoon());
        assert_eq!(metrics.low_stock_count, 2);
    }
}
