use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use loja_core::models::{Order, OrderStatus};
use loja_order::RequestedItem;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "usuarioId")]
    pub usuario_id: Option<i64>,
    pub itens: Option<Vec<RequestedItem>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenOrdersQuery {
    #[serde(rename = "usuarioId")]
    pub usuario_id: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pedidos", get(list_orders).post(create_order))
        .route("/pedidos/abertos", get(open_orders))
        .route("/pedidos/{id}", put(update_order))
        .route("/pedidos/{id}/total", get(order_total))
}

/// GET /pedidos
async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders.list(None, None).await?;
    Ok(Json(orders))
}

/// POST /pedidos
async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let usuario_id = req
        .usuario_id
        .ok_or_else(|| AppError::Validation("usuarioId is required".into()))?;
    let itens = req
        .itens
        .ok_or_else(|| AppError::Validation("itens is required".into()))?;

    let order = state.composer.create_order(usuario_id, &itens).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /pedidos/{id}
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let status = req
        .status
        .ok_or_else(|| AppError::Validation("status is required".into()))?;

    let order = state.composer.update_status(id, &status).await?;
    Ok(Json(order))
}

/// GET /pedidos/{id}/total
async fn order_total(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<loja_report::OrderTotal>, AppError> {
    let total = state.reports.order_total(id).await?;
    Ok(Json(total))
}

/// GET /pedidos/abertos?usuarioId
async fn open_orders(
    State(state): State<AppState>,
    Query(query): Query<OpenOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state
        .orders
        .list(query.usuario_id, Some(OrderStatus::Open))
        .await?;
    Ok(Json(orders))
}
