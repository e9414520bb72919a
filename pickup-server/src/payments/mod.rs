//! Payment subsystem
//!
//! - [`gateway`] - processor-side intent/session creation (Stripe-style API)
//! - [`webhook`] - signed asynchronous event verification and narrowing

pub mod gateway;
pub mod webhook;

pub use gateway::{CheckoutSession, PaymentIntent, SessionLineItem, StripeGateway};
pub use webhook::WebhookEvent;
