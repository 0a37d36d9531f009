use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use loja_core::models::{NewLineItem, Order, OrderStatus};
use loja_core::repository::{OrderRepository, ProductRepository, UserRepository};
use loja_core::{Error, Result};

/// One `{produtoId, quantidade}` entry of an order creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestedItem {
    #[serde(rename = "produtoId")]
    pub product_id: i64,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
}

/// Validates and atomically creates orders. Prices are snapshotted from
/// the product at composition time; the storage gateway re-checks stock
/// under the creation transaction so concurrent orders cannot oversell.
pub struct OrderComposer {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderComposer {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            users,
            products,
            orders,
        }
    }

    /// Creates an order for `user_id` from the requested items. Any single
    /// item failing validation aborts the whole creation; nothing is
    /// persisted on failure.
    pub async fn create_order(&self, user_id: i64, items: &[RequestedItem]) -> Result<Order> {
        if items.is_empty() {
            return Err(Error::Validation(
                "order must contain at least one item".into(),
            ));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(Error::Validation(format!(
                    "quantity for product {} must be a positive integer",
                    item.product_id
                )));
            }
        }

        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {user_id} not found")))?;

        let mut snapshots = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .products
                .get(item.product_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("product {} not found", item.product_id)))?;

            if item.quantity > product.stock {
                return Err(Error::Conflict(format!(
                    "insufficient stock for product {}",
                    product.name
                )));
            }

            snapshots.push(NewLineItem {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }

        let order = self.orders.create(user_id, &snapshots).await?;
        info!(
            order_id = order.id,
            user_id,
            items = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    /// Applies a status change to an existing order. The original API puts
    /// no constraint on which transitions are allowed, and neither do we.
    pub async fn update_status(&self, order_id: i64, status: &str) -> Result<Order> {
        let status: OrderStatus = status.parse()?;
        self.orders
            .update_status(order_id, status)
            .await?
            .ok_or_else(|| Error::NotFound(format!("order {order_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use loja_core::models::{LineItem, Product, User};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// In-memory stand-in for the Pg repositories.
    #[derive(Default)]
    struct FakeStore {
        users: Mutex<Vec<User>>,
        products: Mutex<Vec<Product>>,
        orders: Mutex<Vec<Order>>,
    }

    impl FakeStore {
        fn with_user(self, id: i64) -> Self {
            self.users.lock().unwrap().push(User {
                id,
                name: format!("user {id}"),
                email: format!("user{id}@example.com"),
            });
            self
        }

        fn with_product(self, id: i64, price: &str, stock: i32) -> Self {
            self.products.lock().unwrap().push(Product {
                id,
                name: format!("product {id}"),
                price: price.parse().unwrap(),
                stock,
                active: true,
            });
            self
        }

        fn stock_of(&self, product_id: i64) -> i32 {
            self.products
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == product_id)
                .unwrap()
                .stock
        }

        fn order_count(&self) -> usize {
            self.orders.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserRepository for FakeStore {
        async fn create(&self, _name: &str, _email: &str) -> Result<User> {
            unimplemented!()
        }
        async fn get(&self, id: i64) -> Result<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }
        async fn list(&self) -> Result<Vec<User>> {
            unimplemented!()
        }
        async fn update(
            &self,
            _id: i64,
            _name: Option<&str>,
            _email: Option<&str>,
        ) -> Result<Option<User>> {
            unimplemented!()
        }
        async fn delete(&self, _id: i64) -> Result<bool> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl ProductRepository for FakeStore {
        async fn create(
            &self,
            _name: &str,
            _price: Decimal,
            _stock: i32,
            _active: bool,
        ) -> Result<Product> {
            unimplemented!()
        }
        async fn get(&self, id: i64) -> Result<Option<Product>> {
            Ok(self
                .products
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }
        async fn list(&self) -> Result<Vec<Product>> {
            unimplemented!()
        }
        async fn search(
            &self,
            _filter: &loja_core::models::ProductFilter,
        ) -> Result<Vec<Product>> {
            unimplemented!()
        }
        async fn low_stock(&self, _threshold: i32) -> Result<Vec<Product>> {
            unimplemented!()
        }
    }

    #[async_trait]
    impl OrderRepository for FakeStore {
        async fn create(&self, user_id: i64, items: &[NewLineItem]) -> Result<Order> {
            // Mirrors the guarded decrement of the Pg repository.
            let mut products = self.products.lock().unwrap();
            for item in items {
                let product = products
                    .iter_mut()
                    .find(|p| p.id == item.product_id)
                    .ok_or_else(|| Error::Conflict("no such product".into()))?;
                if product.stock < item.quantity {
                    return Err(Error::Conflict(format!(
                        "insufficient stock for product {}",
                        item.product_id
                    )));
                }
                product.stock -= item.quantity;
            }

            let mut orders = self.orders.lock().unwrap();
            let order_id = orders.len() as i64 + 1;
            let order = Order {
                id: order_id,
                user_id,
                status: OrderStatus::Open,
                created_at: Utc::now(),
                items: items
                    .iter()
                    .enumerate()
                    .map(|(n, i)| LineItem {
                        id: n as i64 + 1,
                        order_id,
                        product_id: i.product_id,
                        quantity: i.quantity,
                        unit_price: i.unit_price,
                    })
                    .collect(),
            };
            orders.push(order.clone());
            Ok(order)
        }

        async fn get(&self, id: i64) -> Result<Option<Order>> {
            Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
        }

        async fn list(
            &self,
            _user_id: Option<i64>,
            _status: Option<OrderStatus>,
        ) -> Result<Vec<Order>> {
            unimplemented!()
        }

        async fn update_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
            let mut orders = self.orders.lock().unwrap();
            match orders.iter_mut().find(|o| o.id == id) {
                Some(order) => {
                    order.status = status;
                    Ok(Some(order.clone()))
                }
                None => Ok(None),
            }
        }
    }

    fn composer(store: Arc<FakeStore>) -> OrderComposer {
        OrderComposer::new(store.clone(), store.clone(), store)
    }

    fn item(product_id: i64, quantity: i32) -> RequestedItem {
        RequestedItem {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn snapshots_prices_and_decrements_stock() {
        let store = Arc::new(
            FakeStore::default()
                .with_user(1)
                .with_product(10, "10.00", 5)
                .with_product(11, "5.00", 8),
        );

        let order = composer(store.clone())
            .create_order(1, &[item(10, 2), item(11, 3)])
            .await
            .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].unit_price, "10.00".parse().unwrap());
        assert_eq!(order.items[1].unit_price, "5.00".parse().unwrap());
        assert_eq!(order.status, OrderStatus::Open);

        let total: Decimal = order
            .items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(total, Decimal::from(35));

        assert_eq!(store.stock_of(10), 3);
        assert_eq!(store.stock_of(11), 5);
    }

    #[tokio::test]
    async fn one_bad_item_aborts_the_whole_order() {
        let store = Arc::new(
            FakeStore::default()
                .with_user(1)
                .with_product(10, "10.00", 5)
                .with_product(11, "5.00", 2),
        );

        let err = composer(store.clone())
            .create_order(1, &[item(10, 2), item(11, 3)])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.order_count(), 0);
        // Validation happens before any write, so the first product's
        // stock is untouched as well.
        assert_eq!(store.stock_of(10), 5);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = Arc::new(FakeStore::default().with_product(10, "10.00", 5));

        let err = composer(store)
            .create_order(42, &[item(10, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let store = Arc::new(FakeStore::default().with_user(1));

        let err = composer(store.clone())
            .create_order(1, &[item(99, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn empty_and_non_positive_items_are_rejected() {
        let store = Arc::new(FakeStore::default().with_user(1).with_product(10, "10.00", 5));
        let composer = composer(store);

        let err = composer.create_order(1, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = composer.create_order(1, &[item(10, 0)]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = composer.create_order(1, &[item(10, -2)]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn update_status_parses_and_applies() {
        let store = Arc::new(FakeStore::default().with_user(1).with_product(10, "10.00", 5));
        let composer = composer(store);

        let order = composer.create_order(1, &[item(10, 1)]).await.unwrap();

        let updated = composer.update_status(order.id, "PAID").await.unwrap();
        assert_eq!(updated.status, OrderStatus::Paid);

        let err = composer.update_status(order.id, "ABERTO").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = composer.update_status(999, "PAID").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
