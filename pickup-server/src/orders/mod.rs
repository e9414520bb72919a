//! Order domain
//!
//! - [`money`] - decimal arithmetic for totals and minor-unit conversion
//! - [`number`] - human-facing order number generation
//! - [`manager`] - the order lifecycle manager (state machine owner)

pub mod manager;
pub mod money;
pub mod number;

pub use manager::OrderManager;
