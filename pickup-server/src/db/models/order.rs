//! Order model
//!
//! Orders and their line snapshots. Line items copy product name and price at
//! order time, so later catalog changes never alter historical orders. Orders
//! are never deleted, only marked cancelled.

use serde::{Deserialize, Serialize};

// =============================================================================
// Status enums
// =============================================================================

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    PickedUp,
    Cancelled,
}

impl OrderStatus {
    /// Legal transition check, centralized here so every caller shares one table.
    ///
    /// pending → confirmed → preparing → ready → picked_up, any → cancelled.
    /// Same-state re-writes are allowed so retries and webhook redelivery stay
    /// idempotent.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self == next || next == Cancelled {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Preparing) | (Preparing, Ready) | (Ready, PickedUp)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Payment status, written only by the webhook reconciler and the dev confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

// =============================================================================
// Entities
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Processor-side payment reference (intent or checkout session id)
    pub payment_reference: Option<String>,
    pub pickup_time: Option<String>,
    pub notes: Option<String>,
    pub is_arrived: bool,
    pub arrived_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line snapshot, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub total_price: f64,
    pub special_instructions: Option<String>,
    pub created_at: i64,
}

// =============================================================================
// API Request / Response Types
// =============================================================================

/// Product fields the client submits with a cart line. Snapshotted into the
/// order line; never read back from a live catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// One cart line of a create-order request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSnapshot,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<CartItem>,
    pub notes: Option<String>,
    pub pickup_time: Option<String>,
}

/// Order plus its line snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn forward_chain_is_legal() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(PickedUp));
    }

    #[test]
    fn skipping_states_is_illegal() {
        assert!(!Pending.can_transition_to(Preparing));
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Confirmed.can_transition_to(PickedUp));
        assert!(!PickedUp.can_transition_to(Pending));
        assert!(!Ready.can_transition_to(Confirmed));
    }

    #[test]
    fn cancel_is_reachable_from_anywhere() {
        for s in [Pending, Confirmed, Preparing, Ready, PickedUp, Cancelled] {
            assert!(s.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn same_state_rewrite_is_idempotent() {
        for s in [Pending, Confirmed, Preparing, Ready, PickedUp, Cancelled] {
            assert!(s.can_transition_to(s));
        }
    }

    #[test]
    fn cancelled_is_terminal_except_rewrite() {
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(PickedUp));
    }
}
