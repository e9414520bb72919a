//! Order Repository
//!
//! Raw reads and writes for orders and order line snapshots. Transition rules
//! and totals are the OrderManager's job; this layer only persists.

use super::{RepoError, RepoResult};
use crate::db::models::{Order, OrderItem, OrderStatus, PaymentStatus};
use crate::utils::now_millis;
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, order_number, customer_name, customer_phone, subtotal, tax, total, status, payment_status, payment_reference, pickup_time, notes, is_arrived, arrived_at, created_at, updated_at FROM orders";

const ITEM_SELECT: &str = "SELECT id, order_id, product_id, product_name, unit_price, quantity, total_price, special_instructions, created_at FROM order_items";

/// Insert an order and its line snapshots in one transaction.
///
/// Either everything commits or nothing does; inventory side effects are issued
/// by the caller only after this returns Ok.
pub async fn create_with_items(
    pool: &SqlitePool,
    order: &Order,
    items: &[OrderItem],
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, order_number, customer_name, customer_phone, subtotal, tax, total, status, payment_status, payment_reference, pickup_time, notes, is_arrived, arrived_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.total)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(&order.payment_reference)
    .bind(&order.pickup_time)
    .bind(&order.notes)
    .bind(order.is_arrived)
    .bind(order.arrived_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, product_name, unit_price, quantity, total_price, special_instructions, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.total_price)
        .bind(&item.special_instructions)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ITEM_SELECT} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Unconditional status write. Transition legality is checked by the manager.
pub async fn update_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<Order> {
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Set the arrival flag; rewrites the timestamp on every call (idempotent).
pub async fn set_arrived(pool: &SqlitePool, id: i64) -> RepoResult<Order> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET is_arrived = 1, arrived_at = ?1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Active orders for a phone number (confirmed/preparing/ready), newest first.
pub async fn find_active_by_phone(pool: &SqlitePool, phone: &str) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE customer_phone = ? AND status IN ('confirmed', 'preparing', 'ready') ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(phone)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Store the processor-side payment reference (intent id) on the order.
pub async fn set_payment_reference(
    pool: &SqlitePool,
    id: i64,
    reference: &str,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_reference = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(reference)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

/// Store a checkout session id as the payment reference and reset the payment
/// status to pending (hosted checkout flow).
pub async fn set_checkout_session(
    pool: &SqlitePool,
    id: i64,
    session_id: &str,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_reference = ?1, payment_status = 'pending', updated_at = ?2 WHERE id = ?3",
    )
    .bind(session_id)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

/// Apply an asynchronous payment outcome. A plain field overwrite, so
/// re-applying the same outcome is naturally idempotent.
pub async fn apply_payment_outcome(
    pool: &SqlitePool,
    id: i64,
    payment_status: PaymentStatus,
    status: Option<OrderStatus>,
) -> RepoResult<()> {
    let now = now_millis();
    let rows = match status {
        Some(status) => {
            sqlx::query(
                "UPDATE orders SET payment_status = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
            )
            .bind(payment_status)
            .bind(status)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?
        }
        None => {
            sqlx::query("UPDATE orders SET payment_status = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(payment_status)
                .bind(now)
                .bind(id)
                .execute(pool)
                .await?
        }
    };
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}
