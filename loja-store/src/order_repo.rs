use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use loja_core::models::{LineItem, NewLineItem, Order, OrderStatus};
use loja_core::repository::OrderRepository;
use loja_core::{Error, Result};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_for_orders(&self, order_ids: &[i64]) -> Result<Vec<LineItem>> {
        let items = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// Internal struct for type-safe querying; items are attached afterwards.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Result<Order> {
        let status = self.status.parse::<OrderStatus>().map_err(|_| {
            Error::Internal(format!("order {} has invalid status {:?}", self.id, self.status))
        })?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            status,
            created_at: self.created_at,
            items,
        })
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, user_id: i64, items: &[NewLineItem]) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        // Guarded decrement: the WHERE clause re-checks stock under the
        // transaction, so two concurrent orders can never both take the
        // last units. Dropping the tx on the error path rolls back.
        for item in items {
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                warn!(product_id = item.product_id, "stock guard rejected order");
                return Err(Error::Conflict(format!(
                    "insufficient stock for product {}",
                    item.product_id
                )));
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id, user_id, status, created_at",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut line_items = Vec::with_capacity(items.len());
        for item in items {
            let line_item = sqlx::query_as::<_, LineItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, unit_price
                "#,
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .fetch_one(&mut *tx)
            .await?;

            line_items.push(line_item);
        }

        tx.commit().await?;

        row.into_order(line_items)
    }

    async fn get(&self, id: i64) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.items_for_orders(&[row.id]).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        user_id: Option<i64>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, status, created_at
            FROM orders
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut all_items = self.items_for_orders(&ids).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let (mine, rest) = all_items.into_iter().partition(|i| i.order_id == row.id);
            all_items = rest;
            orders.push(row.into_order(mine)?);
        }

        Ok(orders)
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING id, user_id, status, created_at",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.items_for_orders(&[row.id]).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }
}
