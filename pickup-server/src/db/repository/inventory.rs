//! Inventory Repository
//!
//! Stock decrements issued as a side effect of order creation. Callers treat
//! failure as best-effort (logged, never rolled back into the order).

use super::{RepoError, RepoResult};
use sqlx::SqlitePool;

/// Decrement available stock for a product, clamped at zero.
///
/// No reservation or locking exists; oversell under concurrent orders for the
/// same product is possible and accepted.
pub async fn decrement(pool: &SqlitePool, product_id: i64, quantity: i32) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE inventory SET quantity_available = MAX(quantity_available - ?1, 0) WHERE product_id = ?2",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "No inventory record for product {product_id}"
        )));
    }
    Ok(())
}

/// Current stock level, if the product is tracked.
pub async fn quantity_available(pool: &SqlitePool, product_id: i64) -> RepoResult<Option<i64>> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT quantity_available FROM inventory WHERE product_id = ?")
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Upsert a stock level (seeding and tests).
pub async fn set_quantity(pool: &SqlitePool, product_id: i64, quantity: i64) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO inventory (product_id, quantity_available) VALUES (?1, ?2) ON CONFLICT(product_id) DO UPDATE SET quantity_available = excluded.quantity_available",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await?;
    Ok(())
}
