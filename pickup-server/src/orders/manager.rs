//! Order Lifecycle Manager
//!
//! Owns the order state machine: creation with server-side totals, status
//! transitions, arrival marking and pickup-counter lookup. Payment outcome
//! writes are overwrite-idempotent so the webhook reconciler can re-apply
//! redelivered events safely.

use sqlx::SqlitePool;

use crate::db::models::{
    CreateOrderRequest, Order, OrderItem, OrderStatus, OrderWithItems, PaymentStatus,
};
use crate::db::repository::{inventory, order as order_repo};
use crate::orders::{money, number};
use crate::utils::{AppError, AppResult, now_millis, snowflake_id};

#[derive(Clone)]
pub struct OrderManager {
    db: SqlitePool,
}

impl OrderManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an order from a submitted cart.
    ///
    /// Totals are computed server-side and never taken from the client. The
    /// order and its line snapshots commit in one transaction; inventory
    /// decrements run afterwards as best-effort side effects (a failed
    /// decrement is logged, the order stands).
    pub async fn create(&self, req: CreateOrderRequest) -> AppResult<OrderWithItems> {
        if req.items.is_empty() {
            return Err(AppError::validation("Cart must contain at least one item"));
        }
        for item in &req.items {
            if item.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "Quantity must be positive, got {} for product {}",
                    item.quantity, item.product.id
                )));
            }
            if !item.product.price.is_finite() || item.product.price < 0.0 {
                return Err(AppError::validation(format!(
                    "Price must be a non-negative number, got {} for product {}",
                    item.product.price, item.product.id
                )));
            }
        }

        let totals = money::compute_totals(&req.items);
        let now = now_millis();
        let order_id = snowflake_id();

        let order = Order {
            id: order_id,
            order_number: number::generate(),
            customer_name: req.customer_name,
            customer_phone: req.customer_phone,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            pickup_time: req.pickup_time,
            notes: req.notes,
            is_arrived: false,
            arrived_at: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = req
            .items
            .iter()
            .map(|item| OrderItem {
                id: snowflake_id(),
                order_id,
                product_id: item.product.id,
                product_name: item.product.name.clone(),
                unit_price: item.product.price,
                quantity: item.quantity,
                total_price: money::line_total(item.product.price, item.quantity),
                special_instructions: item.special_instructions.clone(),
                created_at: now,
            })
            .collect();

        order_repo::create_with_items(&self.db, &order, &items).await?;

        // The order is already committed; stock decrements are best-effort.
        for item in &items {
            if let Err(e) = inventory::decrement(&self.db, item.product_id, item.quantity).await {
                tracing::warn!(
                    order_id,
                    product_id = item.product_id,
                    error = %e,
                    "Inventory decrement failed"
                );
            }
        }

        tracing::info!(order_id, order_number = %order.order_number, total = order.total, "Order created");
        Ok(OrderWithItems { order, items })
    }

    /// Order plus its line snapshots.
    pub async fn get(&self, id: i64) -> AppResult<OrderWithItems> {
        let order = order_repo::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
        let items = order_repo::find_items(&self.db, id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Apply a status transition, enforcing the legal-transition table.
    pub async fn update_status(&self, id: i64, next: OrderStatus) -> AppResult<Order> {
        let current = order_repo::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
        if !current.status.can_transition_to(next) {
            return Err(AppError::business_rule(format!(
                "Illegal status transition: {} -> {}",
                current.status.as_str(),
                next.as_str()
            )));
        }
        let order = order_repo::update_status(&self.db, id, next).await?;
        Ok(order)
    }

    /// Mark the customer as arrived. Idempotent: re-marking rewrites the
    /// arrival timestamp, never errors.
    pub async fn mark_arrived(&self, id: i64) -> AppResult<Order> {
        let order = order_repo::set_arrived(&self.db, id).await?;
        Ok(order)
    }

    /// Active orders (confirmed/preparing/ready) for a phone number, newest
    /// first. Pending, picked-up and cancelled orders are excluded.
    pub async fn lookup_active_by_phone(&self, phone: &str) -> AppResult<Vec<Order>> {
        Ok(order_repo::find_active_by_phone(&self.db, phone).await?)
    }

    /// Payment succeeded: payment_status=completed, status=confirmed.
    /// Plain overwrite, safe under at-least-once webhook delivery.
    pub async fn confirm_payment(&self, id: i64) -> AppResult<Order> {
        order_repo::apply_payment_outcome(
            &self.db,
            id,
            PaymentStatus::Completed,
            Some(OrderStatus::Confirmed),
        )
        .await?;
        let order = order_repo::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
        Ok(order)
    }

    /// Payment failed: payment_status=failed, fulfilment status untouched.
    pub async fn fail_payment(&self, id: i64) -> AppResult<()> {
        order_repo::apply_payment_outcome(&self.db, id, PaymentStatus::Failed, None).await?;
        Ok(())
    }

    /// Store a processor payment intent id on the order.
    pub async fn attach_payment_intent(&self, id: i64, intent_id: &str) -> AppResult<()> {
        order_repo::set_payment_reference(&self.db, id, intent_id).await?;
        Ok(())
    }

    /// Store a hosted checkout session id on the order (payment stays pending).
    pub async fn attach_checkout_session(&self, id: i64, session_id: &str) -> AppResult<()> {
        order_repo::set_checkout_session(&self.db, id, session_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{CartItem, ProductSnapshot};

    async fn manager() -> OrderManager {
        let db = DbService::in_memory().await.expect("in-memory db");
        OrderManager::new(db.pool)
    }

    fn cart(lines: &[(i64, f64, i32)]) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Ada".into(),
            customer_phone: "555-0100".into(),
            items: lines
                .iter()
                .map(|&(id, price, quantity)| CartItem {
                    product: ProductSnapshot {
                        id,
                        name: format!("Product {id}"),
                        price,
                    },
                    quantity,
                    special_instructions: None,
                })
                .collect(),
            notes: None,
            pickup_time: None,
        }
    }

    #[tokio::test]
    async fn create_computes_totals_server_side() {
        let mgr = manager().await;
        let created = mgr.create(cart(&[(1, 10.00, 1), (2, 5.00, 2)])).await.unwrap();
        assert_eq!(created.order.subtotal, 20.00);
        assert_eq!(created.order.tax, 1.65);
        assert_eq!(created.order.total, 21.65);
        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.order.payment_status, PaymentStatus::Pending);
        assert_eq!(created.items.len(), 2);

        let fetched = mgr.get(created.order.id).await.unwrap();
        assert_eq!(fetched.order.total, 21.65);
        assert_eq!(fetched.items.len(), 2);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let mgr = manager().await;
        let err = mgr.create(cart(&[])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let mgr = manager().await;
        let err = mgr.create(cart(&[(1, 10.00, 0)])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_inventory_record_does_not_fail_creation() {
        let mgr = manager().await;
        let created = mgr.create(cart(&[(42, 4.50, 2)])).await.unwrap();
        assert!(mgr.get(created.order.id).await.is_ok());
    }

    #[tokio::test]
    async fn inventory_is_decremented_and_clamped() {
        let mgr = manager().await;
        inventory::set_quantity(&mgr.db, 7, 3).await.unwrap();
        mgr.create(cart(&[(7, 2.00, 2)])).await.unwrap();
        assert_eq!(inventory::quantity_available(&mgr.db, 7).await.unwrap(), Some(1));

        // Oversell clamps at zero instead of going negative
        mgr.create(cart(&[(7, 2.00, 5)])).await.unwrap();
        assert_eq!(inventory::quantity_available(&mgr.db, 7).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let mgr = manager().await;
        let created = mgr.create(cart(&[(1, 10.00, 1)])).await.unwrap();
        let err = mgr
            .update_status(created.order.id, OrderStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        // Still pending after the rejected write
        let fetched = mgr.get(created.order.id).await.unwrap();
        assert_eq!(fetched.order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn legal_chain_and_cancel() {
        let mgr = manager().await;
        let id = mgr.create(cart(&[(1, 10.00, 1)])).await.unwrap().order.id;
        mgr.confirm_payment(id).await.unwrap();
        for next in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::PickedUp] {
            mgr.update_status(id, next).await.unwrap();
        }
        let order = mgr.update_status(id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn confirm_payment_is_idempotent() {
        let mgr = manager().await;
        let id = mgr.create(cart(&[(1, 10.00, 1)])).await.unwrap().order.id;
        let first = mgr.confirm_payment(id).await.unwrap();
        let second = mgr.confirm_payment(id).await.unwrap();
        assert_eq!(first.status, OrderStatus::Confirmed);
        assert_eq!(second.status, OrderStatus::Confirmed);
        assert_eq!(second.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn mark_arrived_is_idempotent() {
        let mgr = manager().await;
        let id = mgr.create(cart(&[(1, 10.00, 1)])).await.unwrap().order.id;
        let first = mgr.mark_arrived(id).await.unwrap();
        assert!(first.is_arrived);
        let second = mgr.mark_arrived(id).await.unwrap();
        assert!(second.is_arrived);
        assert!(second.arrived_at >= first.arrived_at);
    }

    #[tokio::test]
    async fn phone_lookup_filters_and_orders() {
        let mgr = manager().await;
        let pending = mgr.create(cart(&[(1, 1.00, 1)])).await.unwrap().order.id;
        let confirmed = mgr.create(cart(&[(1, 1.00, 1)])).await.unwrap().order.id;
        let picked_up = mgr.create(cart(&[(1, 1.00, 1)])).await.unwrap().order.id;

        mgr.confirm_payment(confirmed).await.unwrap();
        mgr.confirm_payment(picked_up).await.unwrap();
        for next in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::PickedUp] {
            mgr.update_status(picked_up, next).await.unwrap();
        }

        let active = mgr.lookup_active_by_phone("555-0100").await.unwrap();
        let ids: Vec<i64> = active.iter().map(|o| o.id).collect();
        assert!(ids.contains(&confirmed));
        assert!(!ids.contains(&pending));
        assert!(!ids.contains(&picked_up));

        // Newest first
        let mut sorted = active.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        assert_eq!(
            active.iter().map(|o| o.id).collect::<Vec<_>>(),
            sorted.iter().map(|o| o.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn not_found_is_typed() {
        let mgr = manager().await;
        assert!(matches!(mgr.get(123).await.unwrap_err(), AppError::NotFound(_)));
        assert!(matches!(
            mgr.mark_arrived(123).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
