//! # Stock Ledger
//!
//! The single authority for mutating `products.stock`.
//!
//! ## The Guarded Delta
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                │
//! │  SET   stock = stock + :delta                                   │
//! │  WHERE id = :id AND stock + :delta >= 0                         │
//! │                                                                 │
//! │  One statement = one atomic check-and-apply. Two terminals      │
//! │  racing for the last unit cannot both win: SQLite serializes    │
//! │  the writes, and the second one's WHERE clause no longer holds. │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation is a relative delta, never an absolute write, so
//! concurrent adjustments compose instead of clobbering each other.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, StoreError, StoreResult};
use pdv_core::{CoreError, Product};

/// Atomic stock adjustments over the products table.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Applies a relative stock adjustment and returns the new level.
    ///
    /// Positive deltas record goods entering (restock), negative deltas
    /// goods leaving (sale, breakage). The adjustment is refused as a
    /// whole if it would drive stock below zero; partial application
    /// never happens.
    ///
    /// ## Errors
    /// * `CoreError::InvalidAdjustment` - delta would make stock negative
    /// * `DbError::NotFound` - no such product
    pub async fn adjust(&self, product_id: &str, delta: i64) -> StoreResult<i64> {
        debug!(product_id = %product_id, delta = %delta, "adjusting stock");

        let applied = adjust_in(&self.pool, product_id, delta).await?;

        if let Some(stock) = applied {
            return Ok(stock);
        }

        // The guard rejected it: distinguish a missing product from an
        // adjustment that would go negative.
        let stock = self.read(product_id).await?;
        Err(CoreError::InvalidAdjustment {
            product_id: product_id.to_string(),
            stock,
            delta,
        }
        .into())
    }

    /// Same guarded adjustment, inside a caller-owned transaction.
    /// Returns the new stock level, or `InvalidAdjustment` with the
    /// level read inside the same transaction.
    pub async fn adjust_tx(
        tx: &mut Transaction<'_, Sqlite>,
        product_id: &str,
        delta: i64,
    ) -> StoreResult<i64> {
        let applied = adjust_in(&mut **tx, product_id, delta).await?;

        if let Some(stock) = applied {
            return Ok(stock);
        }

        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?;

        match stock {
            Some(stock) => Err(CoreError::InvalidAdjustment {
                product_id: product_id.to_string(),
                stock,
                delta,
            }
            .into()),
            None => Err(DbError::not_found("Product", product_id).into()),
        }
    }

    /// Current stock level for one product.
    pub async fn read(&self, product_id: &str) -> StoreResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;

        stock.ok_or_else(|| StoreError::Db(DbError::not_found("Product", product_id)))
    }

    /// Products whose stock has fallen below their restock threshold,
    /// sorted by name.
    pub async fn below_minimum(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, group_id, min_stock, stock
            FROM products
            WHERE stock < min_stock
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(products)
    }
}

/// Runs the guarded UPDATE against any executor. `Ok(Some(stock))` when
/// the adjustment applied, `Ok(None)` when the guard rejected it (or
/// the product does not exist).
async fn adjust_in<'e, E>(executor: E, product_id: &str, delta: i64) -> StoreResult<Option<i64>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock = stock + ?2
        WHERE id = ?1 AND stock + ?2 >= 0
        RETURNING stock
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .fetch_optional(executor)
    .await
    .map_err(DbError::from)?;

    Ok(stock)
}
