use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status in the lifecycle. Stored as TEXT, SCREAMING_SNAKE_CASE on
/// the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(OrderStatus::Open),
            "PAID" => Ok(OrderStatus::Paid),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(crate::Error::Validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// A registered customer. JSON field names stay in Portuguese for
/// compatibility with the original public API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

/// A sellable product with its current price and on-hand stock.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco")]
    pub price: Decimal,
    #[serde(rename = "estoque")]
    pub stock: i32,
    #[serde(rename = "ativo")]
    pub active: bool,
}

/// A customer order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "usuarioId")]
    pub user_id: i64,
    pub status: OrderStatus,
    #[serde(rename = "data")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "itens")]
    pub items: Vec<LineItem>,
}

/// One product+quantity entry of an order. `unit_price` is the price
/// snapshotted at creation time and is never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LineItem {
    pub id: i64,
    #[serde(rename = "pedidoId")]
    pub order_id: i64,
    #[serde(rename = "produtoId")]
    pub product_id: i64,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
}

/// Validated line item snapshot handed to the storage gateway for the
/// atomic order insert.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Product search predicate for `GET /produtos/busca`.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive name substring.
    pub q: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub only_available: bool,
}

/// A line item joined with its order's creation timestamp, the raw input
/// of every reporting aggregation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatedItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub ordered_at: DateTime<Utc>,
}
