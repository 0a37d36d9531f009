use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use loja_core::models::{Product, ProductFilter};
use loja_core::time::DateRange;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub nome: Option<String>,
    pub preco: Option<Decimal>,
    pub estoque: Option<i32>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(rename = "minPreco")]
    pub min_preco: Option<Decimal>,
    #[serde(rename = "maxPreco")]
    pub max_preco: Option<Decimal>,
    #[serde(rename = "onlyDisponiveis")]
    pub only_disponiveis: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/produtos", get(list_products).post(create_product))
        .route("/produtos/busca", get(search_products))
        .route("/produtos/baixo-estoque", get(low_stock))
        .route("/produtos/{id}/historico-precos", get(price_history))
}

/// GET /produtos
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

/// POST /produtos
async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let nome = req
        .nome
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("nome is required".into()))?;
    let preco = req
        .preco
        .ok_or_else(|| AppError::Validation("preco is required".into()))?;
    if preco < Decimal::ZERO {
        return Err(AppError::Validation("preco must not be negative".into()));
    }
    let estoque = req
        .estoque
        .ok_or_else(|| AppError::Validation("estoque is required".into()))?;
    if estoque < 0 {
        return Err(AppError::Validation("estoque must not be negative".into()));
    }

    let product = state
        .products
        .create(&nome, preco, estoque, req.ativo.unwrap_or(true))
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /produtos/busca?q&minPreco&maxPreco&onlyDisponiveis
async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = ProductFilter {
        q: query.q.filter(|q| !q.is_empty()),
        min_price: query.min_preco,
        max_price: query.max_preco,
        only_available: query.only_disponiveis.unwrap_or(false),
    };

    let products = state.products.search(&filter).await?;
    Ok(Json(products))
}

/// GET /produtos/baixo-estoque?threshold
async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let threshold = query.threshold.unwrap_or(5);
    if threshold < 0 {
        return Err(AppError::Validation("threshold must not be negative".into()));
    }

    let products = state.products.low_stock(threshold).await?;
    Ok(Json(products))
}

/// GET /produtos/{id}/historico-precos?de&ate
async fn price_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<loja_report::PricePoint>>, AppError> {
    let history = state.reports.price_history(id, &range).await?;
    Ok(Json(history))
}
