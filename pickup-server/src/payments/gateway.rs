//! Payment Intent Gateway
//!
//! Client for the payment processor's REST API (Stripe wire format:
//! form-encoded requests, bearer secret key). Amounts always cross the wire in
//! minor currency units; fractional cents never reach the processor.
//!
//! When the configured secret key is the development placeholder the gateway
//! runs in mock mode and fabricates deterministic ids without network I/O.

use serde::Deserialize;

use crate::core::Config;
use crate::core::config::PLACEHOLDER_STRIPE_KEY;
use crate::orders::money;
use crate::utils::{AppError, AppResult, now_millis};

const API_BASE: &str = "https://api.stripe.com/v1";

/// Processor-side payment intent
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Client-usable secret for completing payment out-of-band
    pub client_secret: String,
}

/// Hosted checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// One price line of a hosted checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    /// Free-text customizations, surfaced as the line description
    pub customizations: Option<String>,
}

/// Contact details forwarded to the hosted checkout page
#[derive(Debug, Clone, Default)]
pub struct CustomerContact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    client_url: String,
}

impl StripeGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            client_url: config.client_url.clone(),
        }
    }

    /// True when running against the placeholder key (no processor calls).
    pub fn is_mock(&self) -> bool {
        self.secret_key == PLACEHOLDER_STRIPE_KEY
    }

    /// Create a payment intent for `amount`, tagged with the order id as
    /// opaque metadata for webhook correlation.
    pub async fn create_payment_intent(
        &self,
        order_id: i64,
        amount: f64,
    ) -> AppResult<PaymentIntent> {
        let minor = money::to_minor_units(amount)
            .ok_or_else(|| AppError::validation(format!("Invalid payment amount: {amount}")))?;

        if self.is_mock() {
            tracing::info!(order_id, "Using mock payment intent for development");
            let id = format!("pi_mock_{}", now_millis());
            return Ok(PaymentIntent {
                client_secret: format!("{id}_secret_mock"),
                id,
            });
        }

        let params = [
            ("amount", minor.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[order_id]", order_id.to_string()),
        ];
        let response = self
            .http
            .post(format!("{API_BASE}/payment_intents"))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Payment intent request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::gateway(format!(
                "Payment intent creation returned {status}: {body}"
            )));
        }
        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| AppError::gateway(format!("Invalid payment intent response: {e}")))
    }

    /// Create a hosted checkout session: one price line per cart item,
    /// success/cancel redirects parameterized by order id and the processor's
    /// session placeholder.
    pub async fn create_checkout_session(
        &self,
        order_id: i64,
        items: &[SessionLineItem],
        contact: &CustomerContact,
    ) -> AppResult<CheckoutSession> {
        if self.is_mock() {
            tracing::info!(order_id, "Using mock checkout session for development");
            let id = format!("cs_mock_{}", now_millis());
            return Ok(CheckoutSession {
                url: format!(
                    "{}/order-confirmation?session_id={id}&order_id={order_id}",
                    self.client_url
                ),
                id,
            });
        }

        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            (
                "success_url".into(),
                format!(
                    "{}/order-confirmation?session_id={{CHECKOUT_SESSION_ID}}&order_id={order_id}",
                    self.client_url
                ),
            ),
            (
                "cancel_url".into(),
                format!("{}/checkout?order_id={order_id}", self.client_url),
            ),
            ("metadata[orderId]".into(), order_id.to_string()),
            (
                "payment_intent_data[metadata][order_id]".into(),
                order_id.to_string(),
            ),
        ];
        if let Some(email) = &contact.email {
            params.push(("customer_email".into(), email.clone()));
        }
        if let Some(phone) = &contact.phone {
            params.push(("metadata[customerPhone]".into(), phone.clone()));
        }
        if let Some(name) = &contact.name {
            params.push(("metadata[customerName]".into(), name.clone()));
        }

        for (idx, item) in items.iter().enumerate() {
            let minor = money::to_minor_units(item.price).ok_or_else(|| {
                AppError::validation(format!("Invalid item price: {}", item.price))
            })?;
            let prefix = format!("line_items[{idx}]");
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
            params.push((
                format!("{prefix}[price_data][currency]"),
                "usd".to_string(),
            ));
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                minor.to_string(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(customizations) = &item.customizations {
                params.push((
                    format!("{prefix}[price_data][product_data][description]"),
                    format!("Customizations: {customizations}"),
                ));
            }
        }

        let response = self
            .http
            .post(format!("{API_BASE}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Checkout session request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::gateway(format!(
                "Checkout session creation returned {status}: {body}"
            )));
        }
        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| AppError::gateway(format!("Invalid checkout session response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_gateway() -> StripeGateway {
        let mut config = Config::from_env();
        config.stripe_secret_key = PLACEHOLDER_STRIPE_KEY.into();
        config.client_url = "http://localhost:3000".into();
        StripeGateway::new(&config)
    }

    #[tokio::test]
    async fn mock_intent_has_client_secret() {
        let gateway = mock_gateway();
        assert!(gateway.is_mock());
        let intent = gateway.create_payment_intent(17, 21.65).await.unwrap();
        assert!(intent.id.starts_with("pi_mock_"));
        assert!(intent.client_secret.contains("secret"));
    }

    #[tokio::test]
    async fn invalid_amount_is_rejected_before_any_call() {
        let gateway = mock_gateway();
        let err = gateway.create_payment_intent(17, f64::NAN).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn mock_session_url_carries_order_id() {
        let gateway = mock_gateway();
        let items = vec![SessionLineItem {
            name: "Ribs".into(),
            price: 12.50,
            quantity: 1,
            customizations: None,
        }];
        let session = gateway
            .create_checkout_session(99, &items, &CustomerContact::default())
            .await
            .unwrap();
        assert!(session.id.starts_with("cs_mock_"));
        assert!(session.url.contains("order_id=99"));
        assert!(session.url.contains(&session.id));
    }
}
