use std::sync::Arc;

use loja_core::repository::{OrderRepository, ProductRepository, UserRepository};
use loja_order::OrderComposer;
use loja_report::ReportEngine;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub composer: Arc<OrderComposer>,
    pub reports: Arc<ReportEngine>,
}
