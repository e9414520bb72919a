//! Order API module

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        // Pickup-counter lookup must be registered before the {id} capture
        .route("/lookup/phone/{phone}", get(handler::lookup_by_phone))
        .route("/{id}", get(handler::get_by_id))
        // Admin-gated: fulfilment status transitions
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/arrived", post(handler::mark_arrived))
}
