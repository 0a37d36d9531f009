use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use loja_core::models::DatedItem;
use loja_core::repository::ReportRepository;
use loja_core::time::DateRange;
use loja_core::{Error, Result};

#[derive(Debug, Serialize)]
pub struct OrderTotal {
    #[serde(rename = "pedidoId")]
    pub order_id: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RepurchaseRate {
    #[serde(rename = "usuarioId")]
    pub user_id: i64,
    #[serde(rename = "taxaRecompra")]
    pub rate: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BasketAverages {
    #[serde(rename = "ticketMedio")]
    pub average_ticket: Decimal,
    #[serde(rename = "itensMedio")]
    pub average_items: Decimal,
}

/// One observed sale price of a product.
#[derive(Debug, Serialize)]
pub struct PricePoint {
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
    #[serde(rename = "data")]
    pub ordered_at: DateTime<Utc>,
}

fn line_total(item: &DatedItem) -> Decimal {
    item.unit_price * Decimal::from(item.quantity)
}

/// Read-only aggregations over historical orders and line items. All
/// monetary arithmetic is `Decimal`; empty inputs yield zeroes, never a
/// division error.
pub struct ReportEngine {
    store: Arc<dyn ReportRepository>,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn ReportRepository>) -> Self {
        Self { store }
    }

    /// Sum of `unit_price * quantity` over the order's line items; `0` for
    /// an order without items, NOT_FOUND when the order id does not exist.
    pub async fn order_total(&self, order_id: i64) -> Result<OrderTotal> {
        if !self.store.order_exists(order_id).await? {
            return Err(Error::NotFound(format!("order {order_id} not found")));
        }

        let total = self
            .store
            .items_for_order(order_id)
            .await?
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum();

        Ok(OrderTotal { order_id, total })
    }

    /// `1` when the user placed more than one order in range, `0`
    /// otherwise. Deliberately binary rather than a true ratio.
    pub async fn repurchase_rate(&self, user_id: i64, range: &DateRange) -> Result<RepurchaseRate> {
        let orders = self.store.order_count_for_user(user_id, range).await?;
        let rate = if orders > 1 {
            Decimal::ONE
        } else {
            Decimal::ZERO
        };

        Ok(RepurchaseRate { user_id, rate })
    }

    /// Revenue per calendar day of the order's creation timestamp, keyed
    /// by ISO date. Days without line items are absent from the map.
    pub async fn daily_revenue(&self, range: &DateRange) -> Result<BTreeMap<NaiveDate, Decimal>> {
        let mut per_day = BTreeMap::new();
        for item in self.store.items_in_range(range).await? {
            let day = item.ordered_at.date_naive();
            *per_day.entry(day).or_insert(Decimal::ZERO) += line_total(&item);
        }

        Ok(per_day)
    }

    /// Average order value and average item count per order over the
    /// range; both `0` when no orders fall in range.
    pub async fn average_basket(&self, range: &DateRange) -> Result<BasketAverages> {
        let items = self.store.items_in_range(range).await?;
        let order_ids: BTreeSet<i64> = items.iter().map(|i| i.order_id).collect();

        if order_ids.is_empty() {
            return Ok(BasketAverages {
                average_ticket: Decimal::ZERO,
                average_items: Decimal::ZERO,
            });
        }

        let order_count = Decimal::from(order_ids.len() as u64);
        let revenue: Decimal = items.iter().map(line_total).sum();
        let item_count = Decimal::from(items.len() as u64);

        Ok(BasketAverages {
            average_ticket: revenue / order_count,
            average_items: item_count / order_count,
        })
    }

    /// Time-ordered sequence of snapshot prices for a product: one point
    /// per line item referencing it within range.
    pub async fn price_history(
        &self,
        product_id: i64,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>> {
        let mut items = self.store.items_for_product(product_id, range).await?;
        items.sort_by_key(|i| i.ordered_at);

        Ok(items
            .into_iter()
            .map(|i| PricePoint {
                unit_price: i.unit_price,
                ordered_at: i.ordered_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loja_core::models::LineItem;

    /// Fixed set of dated line items plus the orders they came from.
    #[derive(Default)]
    struct FakeStore {
        orders: Vec<(i64, i64, DateTime<Utc>)>, // (order_id, user_id, created_at)
        items: Vec<DatedItem>,
    }

    impl FakeStore {
        fn order(mut self, order_id: i64, user_id: i64, at: &str) -> Self {
            self.orders.push((order_id, user_id, at.parse().unwrap()));
            self
        }

        fn item(mut self, order_id: i64, product_id: i64, quantity: i32, price: &str) -> Self {
            let ordered_at = self
                .orders
                .iter()
                .find(|(id, _, _)| *id == order_id)
                .expect("item for unknown order")
                .2;
            self.items.push(DatedItem {
                order_id,
                product_id,
                quantity,
                unit_price: price.parse().unwrap(),
                ordered_at,
            });
            self
        }
    }

    #[async_trait]
    impl ReportRepository for FakeStore {
        async fn order_exists(&self, order_id: i64) -> Result<bool> {
            Ok(self.orders.iter().any(|(id, _, _)| *id == order_id))
        }

        async fn items_for_order(&self, order_id: i64) -> Result<Vec<LineItem>> {
            Ok(self
                .items
                .iter()
                .filter(|i| i.order_id == order_id)
                .enumerate()
                .map(|(n, i)| LineItem {
                    id: n as i64 + 1,
                    order_id: i.order_id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                })
                .collect())
        }

        async fn order_count_for_user(&self, user_id: i64, range: &DateRange) -> Result<i64> {
            Ok(self
                .orders
                .iter()
                .filter(|(_, uid, at)| *uid == user_id && range.contains(*at))
                .count() as i64)
        }

        async fn items_in_range(&self, range: &DateRange) -> Result<Vec<DatedItem>> {
            Ok(self
                .items
                .iter()
                .filter(|i| range.contains(i.ordered_at))
                .cloned()
                .collect())
        }

        async fn items_for_product(
            &self,
            product_id: i64,
            range: &DateRange,
        ) -> Result<Vec<DatedItem>> {
            Ok(self
                .items
                .iter()
                .filter(|i| i.product_id == product_id && range.contains(i.ordered_at))
                .cloned()
                .collect())
        }
    }

    fn engine(store: FakeStore) -> ReportEngine {
        ReportEngine::new(Arc::new(store))
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn order_total_sums_snapshot_prices() {
        let store = FakeStore::default()
            .order(1, 1, "2025-01-10T12:00:00Z")
            .item(1, 10, 2, "10.00")
            .item(1, 11, 3, "5.00");

        let total = engine(store).order_total(1).await.unwrap();
        assert_eq!(total.total, dec("35"));
    }

    #[tokio::test]
    async fn order_total_is_zero_for_empty_order_and_404_for_missing() {
        let store = FakeStore::default().order(1, 1, "2025-01-10T12:00:00Z");
        let engine = engine(store);

        assert_eq!(engine.order_total(1).await.unwrap().total, Decimal::ZERO);

        let err = engine.order_total(2).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn repurchase_rate_is_binary() {
        let store = FakeStore::default()
            .order(1, 1, "2025-01-10T12:00:00Z")
            .order(2, 1, "2025-01-20T12:00:00Z")
            .order(3, 2, "2025-01-15T12:00:00Z");
        let engine = engine(store);
        let range = DateRange::default();

        assert_eq!(engine.repurchase_rate(1, &range).await.unwrap().rate, Decimal::ONE);
        assert_eq!(engine.repurchase_rate(2, &range).await.unwrap().rate, Decimal::ZERO);
        assert_eq!(engine.repurchase_rate(3, &range).await.unwrap().rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn repurchase_rate_respects_the_range() {
        let store = FakeStore::default()
            .order(1, 1, "2025-01-10T12:00:00Z")
            .order(2, 1, "2025-06-20T12:00:00Z");
        let engine = engine(store);

        let january = DateRange::new(
            Some("2025-01-01".parse().unwrap()),
            Some("2025-01-31".parse().unwrap()),
        );
        assert_eq!(
            engine.repurchase_rate(1, &january).await.unwrap().rate,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn daily_revenue_groups_by_calendar_day() {
        let store = FakeStore::default()
            .order(1, 1, "2025-01-10T09:00:00Z")
            .order(2, 2, "2025-01-10T21:30:00Z")
            .order(3, 1, "2025-01-11T08:00:00Z")
            .item(1, 10, 2, "10.00")
            .item(2, 11, 1, "7.50")
            .item(3, 10, 1, "10.00");

        let revenue = engine(store).daily_revenue(&DateRange::default()).await.unwrap();

        let jan_10: NaiveDate = "2025-01-10".parse().unwrap();
        let jan_11: NaiveDate = "2025-01-11".parse().unwrap();
        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[&jan_10], dec("27.50"));
        assert_eq!(revenue[&jan_11], dec("10.00"));
    }

    #[tokio::test]
    async fn average_basket_matches_reference_vector() {
        // Two orders: one with 2 items totaling 35, one with 1 item
        // totaling 20 -> ticket 27.5, items 1.5.
        let store = FakeStore::default()
            .order(1, 1, "2025-01-10T12:00:00Z")
            .order(2, 2, "2025-01-11T12:00:00Z")
            .item(1, 10, 2, "10.00")
            .item(1, 11, 3, "5.00")
            .item(2, 12, 1, "20.00");

        let basket = engine(store).average_basket(&DateRange::default()).await.unwrap();
        assert_eq!(basket.average_ticket, dec("27.5"));
        assert_eq!(basket.average_items, dec("1.5"));
    }

    #[tokio::test]
    async fn average_basket_is_zero_when_range_is_empty() {
        let store = FakeStore::default()
            .order(1, 1, "2025-01-10T12:00:00Z")
            .item(1, 10, 1, "10.00");

        let range = DateRange::new(
            Some("2030-01-01".parse().unwrap()),
            Some("2030-01-31".parse().unwrap()),
        );
        let basket = engine(store).average_basket(&range).await.unwrap();
        assert_eq!(basket.average_ticket, Decimal::ZERO);
        assert_eq!(basket.average_items, Decimal::ZERO);
    }

    #[tokio::test]
    async fn price_history_is_time_ordered_and_product_scoped() {
        let store = FakeStore::default()
            .order(1, 1, "2025-02-01T12:00:00Z")
            .order(2, 1, "2025-01-01T12:00:00Z")
            .order(3, 1, "2025-03-01T12:00:00Z")
            .item(1, 10, 1, "12.00")
            .item(2, 10, 2, "10.00")
            .item(3, 11, 1, "99.00");

        let history = engine(store)
            .price_history(10, &DateRange::default())
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].unit_price, dec("10.00"));
        assert_eq!(history[1].unit_price, dec("12.00"));
        assert!(history[0].ordered_at < history[1].ordered_at);
    }
}
