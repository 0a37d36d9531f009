use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use loja_core::time::DateRange;
use loja_report::BasketAverages;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/relatorios/faturamento-diario", get(daily_revenue))
        .route("/relatorios/cesta-media", get(average_basket))
}

/// GET /relatorios/faturamento-diario?de&ate
async fn daily_revenue(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<BTreeMap<NaiveDate, Decimal>>, AppError> {
    let revenue = state.reports.daily_revenue(&range).await?;
    Ok(Json(revenue))
}

/// GET /relatorios/cesta-media?de&ate
async fn average_basket(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<BasketAverages>, AppError> {
    let basket = state.reports.average_basket(&range).await?;
    Ok(Json(basket))
}
