use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use loja_core::models::{Product, ProductFilter};
use loja_core::repository::ProductRepository;
use loja_core::Result;

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(
        &self,
        name: &str,
        price: Decimal,
        stock: i32,
        active: bool,
    ) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, stock, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, stock, active
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(active)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock, active FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock, active FROM products ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        // NULL parameters disable their predicate, mirroring the optional
        // query parameters of /produtos/busca.
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, stock, active
            FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::NUMERIC IS NULL OR price >= $2)
              AND ($3::NUMERIC IS NULL OR price <= $3)
              AND (NOT $4 OR active)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.q.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.only_available)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn low_stock(&self, threshold: i32) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, stock, active
            FROM products
            WHERE stock <= $1 AND active
            ORDER BY stock ASC, name ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}
