//! # Sale Repository
//!
//! The append-only sale history.
//!
//! A sale spans two tables (`sales` + `sale_items`), so every insert is
//! transactional: either the whole record lands or nothing does. There
//! is no update or delete path; finalized sales are immutable.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pdv_core::{Money, PaymentSplit, Sale, SaleLine};

/// Repository for the sale history.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Appends a finalized sale in its own transaction.
    ///
    /// Used for standalone inserts; the checkout service inserts via
    /// [`insert_tx`](Self::insert_tx) inside the finalize transaction
    /// instead.
    pub async fn append(&self, sale: &Sale) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::insert_tx(&mut tx, sale).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Inserts a sale and its items inside a caller-owned transaction.
    pub async fn insert_tx(tx: &mut Transaction<'_, Sqlite>, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total = sale.total.cents(), "inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, created_at, discount_cents, total_cents,
                pay_debit_cents, pay_credit_cents, pay_cash_cents, pay_pix_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.created_at.to_rfc3339())
        .bind(sale.discount.cents())
        .bind(sale.total.cents())
        .bind(sale.payments.debit.cents())
        .bind(sale.payments.credit.cents())
        .bind(sale.payments.cash.cents())
        .bind(sale.payments.pix.cents())
        .execute(&mut **tx)
        .await?;

        for (position, line) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, position, product_name, quantity, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(position as i64)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.line_total.cents())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Lists the full history, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query("SELECT * FROM sales ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let mut sale = map_sale_row(&row)?;
            sale.items = self.load_items(&sale.id).await?;
            sales.push(sale);
        }

        debug!(count = sales.len(), "listed sales");
        Ok(sales)
    }

    /// Gets one sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut sale = map_sale_row(&row)?;
                sale.items = self.load_items(&sale.id).await?;
                Ok(Some(sale))
            }
            None => Ok(None),
        }
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn load_items(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let rows = sqlx::query(
            r#"
            SELECT product_name, quantity, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SaleLine {
                    product_name: row.try_get("product_name")?,
                    quantity: row.try_get("quantity")?,
                    line_total: Money::from_cents(row.try_get("line_total_cents")?),
                })
            })
            .collect()
    }
}

fn map_sale_row(row: &SqliteRow) -> DbResult<Sale> {
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DbError::Internal(format!("bad created_at timestamp: {e}")))?
        .with_timezone(&Utc);

    Ok(Sale {
        id: row.try_get("id")?,
        created_at,
        items: Vec::new(),
        discount: Money::from_cents(row.try_get("discount_cents")?),
        total: Money::from_cents(row.try_get("total_cents")?),
        payments: PaymentSplit {
            debit: Money::from_cents(row.try_get("pay_debit_cents")?),
            credit: Money::from_cents(row.try_get("pay_credit_cents")?),
            cash: Money::from_cents(row.try_get("pay_cash_cents")?),
            pix: Money::from_cents(row.try_get("pay_pix_cents")?),
        },
    })
}
