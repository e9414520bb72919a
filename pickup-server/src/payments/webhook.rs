//! Webhook Reconciler
//!
//! Verifies the processor's signature over the raw, unparsed body and narrows
//! the event into a closed set of supported kinds. The body is consumed as raw
//! bytes before any JSON parsing — the signature covers the exact byte stream,
//! and nothing in the payload is trusted until verification passes.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::utils::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Signed timestamps older or newer than this are rejected (replay window)
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Supported webhook event kinds, narrowed from the processor's tagged union.
///
/// Unknown kinds — and known kinds whose metadata cannot be resolved to an
/// order — map to [`WebhookEvent::Ignored`]: acknowledged, applied as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Intent flow success: payment_status=completed, status=confirmed
    PaymentSucceeded { order_id: i64 },
    /// Intent flow failure: payment_status=failed, status unchanged
    PaymentFailed { order_id: i64 },
    /// Hosted checkout success: payment_status=completed, status=confirmed
    CheckoutCompleted { order_id: i64 },
    /// Anything else
    Ignored { kind: String },
}

/// Verify the `stripe-signature` header against the raw payload.
///
/// Header format: `t=<unix seconds>,v1=<hex hmac-sha256>`, where the MAC is
/// computed over `"{t}.{raw body}"` with the shared webhook secret. Multiple
/// `v1` entries are accepted if any verifies. Comparison is constant-time.
pub fn verify_signature(secret: &str, payload: &[u8], header: &str) -> AppResult<()> {
    let mut timestamp: Option<&str> = None;
    let mut candidates: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| AppError::signature("Missing timestamp"))?;
    if candidates.is_empty() {
        return Err(AppError::signature("Missing v1 signature"));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::signature(format!("Invalid timestamp: {timestamp}")))?;
    let age = (crate::utils::time::now_secs() - ts).abs();
    if age > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::signature(format!(
            "Timestamp outside tolerance ({age}s)"
        )));
    }

    for candidate in candidates {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::signature(format!("Invalid webhook secret: {e}")))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }
    Err(AppError::signature("Signature mismatch"))
}

// Wire shape of a processor event, deserialized only after verification.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Parse a verified payload into a [`WebhookEvent`].
///
/// Malformed JSON is a validation error (the processor signed something we
/// cannot read); a well-formed event of an unsupported kind is `Ignored`.
pub fn parse_event(payload: &[u8]) -> AppResult<WebhookEvent> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| AppError::validation(format!("Malformed webhook payload: {e}")))?;

    let event = match raw.kind.as_str() {
        "payment_intent.succeeded" => match extract_order_id(&raw.data.object) {
            Some(order_id) => WebhookEvent::PaymentSucceeded { order_id },
            None => ignored_missing_metadata(raw.kind),
        },
        "payment_intent.payment_failed" => match extract_order_id(&raw.data.object) {
            Some(order_id) => WebhookEvent::PaymentFailed { order_id },
            None => ignored_missing_metadata(raw.kind),
        },
        "checkout.session.completed" => match extract_order_id(&raw.data.object) {
            Some(order_id) => WebhookEvent::CheckoutCompleted { order_id },
            None => ignored_missing_metadata(raw.kind),
        },
        _ => WebhookEvent::Ignored { kind: raw.kind },
    };
    Ok(event)
}

fn ignored_missing_metadata(kind: String) -> WebhookEvent {
    tracing::warn!(kind = %kind, "Webhook event has no resolvable order id metadata");
    WebhookEvent::Ignored { kind }
}

/// Order id from event metadata. Intent objects carry `order_id`, checkout
/// sessions carry `orderId`; both arrive as strings on the wire, but numbers
/// are tolerated.
fn extract_order_id(object: &serde_json::Value) -> Option<i64> {
    let metadata = object.get("metadata")?;
    let value = metadata.get("order_id").or_else(|| metadata.get("orderId"))?;
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}
