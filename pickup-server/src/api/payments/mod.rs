//! Payment API module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/create-payment-intent", post(handler::create_payment_intent))
        .route(
            "/create-checkout-session",
            post(handler::create_checkout_session),
        )
        // Mounted on the raw body: signature verification needs the exact bytes
        .route("/webhook", post(handler::webhook))
        // Dev-only escape hatch, rejected in production
        .route("/confirm-payment", post(handler::confirm_payment))
}
