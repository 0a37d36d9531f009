use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{
    DatedItem, LineItem, NewLineItem, Order, OrderStatus, Product, ProductFilter, User,
};
use crate::time::DateRange;
use crate::Result;

/// Repository trait for user data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, name: &str, email: &str) -> Result<User>;

    async fn get(&self, id: i64) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    /// Partial update; `None` fields keep their current value. Returns
    /// `None` when the user does not exist.
    async fn update(&self, id: i64, name: Option<&str>, email: Option<&str>)
        -> Result<Option<User>>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Repository trait for product data access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, name: &str, price: Decimal, stock: i32, active: bool)
        -> Result<Product>;

    async fn get(&self, id: i64) -> Result<Option<Product>>;

    /// All products, name ascending.
    async fn list(&self) -> Result<Vec<Product>>;

    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    /// Active products with stock at or below the threshold.
    async fn low_stock(&self, threshold: i32) -> Result<Vec<Product>>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order and all line items as a single transaction. The
    /// stock of every referenced product is decremented inside the same
    /// transaction, guarded so it can never go negative; a failed guard
    /// aborts the whole creation with `Error::Conflict`.
    async fn create(&self, user_id: i64, items: &[NewLineItem]) -> Result<Order>;

    async fn get(&self, id: i64) -> Result<Option<Order>>;

    /// Newest first, items included. Both filters are optional.
    async fn list(&self, user_id: Option<i64>, status: Option<OrderStatus>)
        -> Result<Vec<Order>>;

    /// Returns `None` when the order does not exist.
    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>>;
}

/// Read-only access to historical orders/line items for the reporting
/// engine. Date ranges always filter on the order's creation timestamp.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn order_exists(&self, order_id: i64) -> Result<bool>;

    async fn items_for_order(&self, order_id: i64) -> Result<Vec<LineItem>>;

    async fn order_count_for_user(&self, user_id: i64, range: &DateRange) -> Result<i64>;

    /// All line items whose order falls in range, oldest order first.
    async fn items_in_range(&self, range: &DateRange) -> Result<Vec<DatedItem>>;

    async fn items_for_product(&self, product_id: i64, range: &DateRange)
        -> Result<Vec<DatedItem>>;
}
