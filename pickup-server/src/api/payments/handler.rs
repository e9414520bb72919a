//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::db::models::Order;
use crate::orders::OrderManager;
use crate::payments::gateway::{CustomerContact, SessionLineItem};
use crate::payments::webhook::{self, WebhookEvent};
use crate::utils::{AppError, AppResult};

/// Create payment intent request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub order_id: i64,
    pub amount: f64,
}

/// POST /payments/create-payment-intent
///
/// Opens a processor-side payment intent and stores its id on the order.
/// A failed order update after a successful processor call is logged, not
/// fatal: the client still gets its secret, the processor side effect stands.
pub async fn create_payment_intent(
    State(state): State<ServerState>,
    Json(payload): Json<CreateIntentRequest>,
) -> AppResult<Json<Value>> {
    let intent = state
        .gateway
        .create_payment_intent(payload.order_id, payload.amount)
        .await?;

    let manager = OrderManager::new(state.get_db());
    if let Err(e) = manager
        .attach_payment_intent(payload.order_id, &intent.id)
        .await
    {
        tracing::error!(order_id = payload.order_id, error = %e, "Failed to store payment intent id");
    }

    Ok(Json(json!({ "clientSecret": intent.client_secret })))
}

/// Create checkout session request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub order_id: i64,
    pub items: Vec<SessionLineItem>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_name: Option<String>,
}

/// POST /payments/create-checkout-session
///
/// Hosted checkout flow: one price line per cart item, redirect URLs keyed by
/// order id, session id stored as the order's payment reference.
pub async fn create_checkout_session(
    State(state): State<ServerState>,
    Json(payload): Json<CreateSessionRequest>,
) -> AppResult<Json<Value>> {
    if payload.items.is_empty() {
        return Err(AppError::validation("Checkout requires at least one item"));
    }

    let contact = CustomerContact {
        email: payload.customer_email,
        phone: payload.customer_phone,
        name: payload.customer_name,
    };
    let session = state
        .gateway
        .create_checkout_session(payload.order_id, &payload.items, &contact)
        .await?;

    let manager = OrderManager::new(state.get_db());
    if let Err(e) = manager
        .attach_checkout_session(payload.order_id, &session.id)
        .await
    {
        tracing::error!(order_id = payload.order_id, error = %e, "Failed to store checkout session id");
    }

    Ok(Json(json!({
        "checkoutUrl": session.url,
        "sessionId": session.id,
    })))
}

/// POST /payments/webhook
///
/// Consumes the body as raw bytes: the signature covers the exact byte stream
/// and nothing is parsed before verification passes. Once verified, the event
/// is always acknowledged — a transient downstream failure must not make the
/// processor retry forever, and re-applying a redelivered event is idempotent.
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::signature("Missing stripe-signature header"))?;

    webhook::verify_signature(&state.config.stripe_webhook_secret, &body, signature)?;

    let event = webhook::parse_event(&body)?;
    let manager = OrderManager::new(state.get_db());
    let outcome = match event {
        WebhookEvent::PaymentSucceeded { order_id }
        | WebhookEvent::CheckoutCompleted { order_id } => {
            manager.confirm_payment(order_id).await.map(|_| ())
        }
        WebhookEvent::PaymentFailed { order_id } => manager.fail_payment(order_id).await,
        WebhookEvent::Ignored { ref kind } => {
            tracing::debug!(kind = %kind, "Ignoring webhook event");
            Ok(())
        }
    };
    if let Err(e) = outcome {
        tracing::error!(error = %e, "Failed to apply webhook event; acknowledging anyway");
    }

    Ok(Json(json!({ "received": true })))
}

/// Confirm payment request (dev only)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub order_id: i64,
}

/// POST /payments/confirm-payment
///
/// Force-sets payment_status=completed and status=confirmed without processor
/// involvement. Rejected in production deployments.
pub async fn confirm_payment(
    State(state): State<ServerState>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<Order>> {
    if state.config.is_production() {
        return Err(AppError::forbidden(
            "Manual payment confirmation is disabled in production",
        ));
    }
    let manager = OrderManager::new(state.get_db());
    let order = manager.confirm_payment(payload.order_id).await?;
    Ok(Json(order))
}
