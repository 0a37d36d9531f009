use async_trait::async_trait;
use sqlx::PgPool;

use loja_core::models::{DatedItem, LineItem};
use loja_core::repository::ReportRepository;
use loja_core::time::DateRange;
use loja_core::Result;

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn order_exists(&self, order_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn items_for_order(&self, order_id: i64) -> Result<Vec<LineItem>> {
        let items = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn order_count_for_user(&self, user_id: i64, range: &DateRange) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM orders
            WHERE user_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at < $3)
            "#,
        )
        .bind(user_id)
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn items_in_range(&self, range: &DateRange) -> Result<Vec<DatedItem>> {
        let items = sqlx::query_as::<_, DatedItem>(
            r#"
            SELECT i.order_id, i.product_id, i.quantity, i.unit_price, o.created_at AS ordered_at
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE ($1::TIMESTAMPTZ IS NULL OR o.created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR o.created_at < $2)
            ORDER BY o.created_at ASC, i.id ASC
            "#,
        )
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn items_for_product(
        &self,
        product_id: i64,
        range: &DateRange,
    ) -> Result<Vec<DatedItem>> {
        let items = sqlx::query_as::<_, DatedItem>(
            r#"
            SELECT i.order_id, i.product_id, i.quantity, i.unit_price, o.created_at AS ordered_at
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE i.product_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR o.created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR o.created_at < $3)
            ORDER BY o.created_at ASC, i.id ASC
            "#,
        )
        .bind(product_id)
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
