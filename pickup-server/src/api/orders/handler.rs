//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{CreateOrderRequest, Order, OrderStatus, OrderWithItems};
use crate::orders::OrderManager;
use crate::utils::AppResult;

/// POST /orders - create an order from a submitted cart
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderWithItems>> {
    let manager = OrderManager::new(state.get_db());
    let created = manager.create(payload).await?;
    Ok(Json(created))
}

/// GET /orders/{id} - order plus line snapshots
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderWithItems>> {
    let manager = OrderManager::new(state.get_db());
    let order = manager.get(id).await?;
    Ok(Json(order))
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PATCH /orders/{id}/status - admin-gated status transition
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    state.admin_auth.authorize(&headers)?;
    let manager = OrderManager::new(state.get_db());
    let order = manager.update_status(id, payload.status).await?;
    Ok(Json(order))
}

/// POST /orders/{id}/arrived - mark the customer as arrived (idempotent)
pub async fn mark_arrived(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let manager = OrderManager::new(state.get_db());
    let order = manager.mark_arrived(id).await?;
    Ok(Json(order))
}

/// GET /orders/lookup/phone/{phone} - active orders for a phone number
pub async fn lookup_by_phone(
    State(state): State<ServerState>,
    Path(phone): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let manager = OrderManager::new(state.get_db());
    let orders = manager.lookup_active_by_phone(&phone).await?;
    Ok(Json(orders))
}
