use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use loja_core::models::{Order, User};
use loja_core::time::DateRange;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
}

/// User plus their orders, mirroring the original API's included
/// `pedidos`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    pub pedidos: Vec<Order>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/usuarios", get(list_users).post(create_user))
        .route(
            "/usuarios/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/usuarios/{id}/recompra", get(repurchase_rate))
}

/// GET /usuarios
async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list().await?;

    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let pedidos = state.orders.list(Some(user.id), None).await?;
        out.push(UserResponse { user, pedidos });
    }

    Ok(Json(out))
}

/// GET /usuarios/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;
    let pedidos = state.orders.list(Some(id), None).await?;

    Ok(Json(UserResponse { user, pedidos }))
}

/// POST /usuarios
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let nome = req
        .nome
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("nome is required".into()))?;
    let email = req
        .email
        .filter(|e| e.contains('@'))
        .ok_or_else(|| AppError::Validation("a valid email is required".into()))?;

    let user = state.users.create(&nome, &email).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /usuarios/{id}
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    if let Some(nome) = &req.nome {
        if nome.trim().is_empty() {
            return Err(AppError::Validation("nome must not be empty".into()));
        }
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".into()));
        }
    }

    let user = state
        .users
        .update(id, req.nome.as_deref(), req.email.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

    Ok(Json(user))
}

/// DELETE /usuarios/{id}
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.users.delete(id).await? {
        Ok(Json(json!({ "message": "user deleted" })))
    } else {
        Err(AppError::NotFound(format!("user {id} not found")))
    }
}

/// GET /usuarios/{id}/recompra?de&ate
async fn repurchase_rate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(range): Query<DateRange>,
) -> Result<Json<loja_report::RepurchaseRate>, AppError> {
    let rate = state.reports.repurchase_rate(id, &range).await?;
    Ok(Json(rate))
}
