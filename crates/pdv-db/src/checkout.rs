//! # Checkout Service
//!
//! Drives one [`CheckoutSession`] against the database: resolves cart
//! additions through the catalog, and commits finalize attempts as a
//! single SQLite transaction.
//!
//! ## Finalize
//! ```text
//! begin_finalize()            (session: AwaitingPayment -> Finalizing)
//!      │
//!      ▼
//! BEGIN TRANSACTION
//!   for each line: guarded stock decrement   ── any failure ──┐
//!   INSERT sale + items                                       │
//! COMMIT                                                  ROLLBACK
//!      │                                                      │
//!      ▼                                                      ▼
//! complete()                                       finalize_failed()
//! (session: Completed)                      (session: AwaitingPayment,
//!                                            cart and tenders intact)
//! ```
//!
//! The decrements and the sale append stand or fall together: a sale
//! whose third line loses the race for the last unit leaves the first
//! two lines' stock untouched and writes no history row.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::pool::Database;
use crate::repository::sale::SaleRepository;
use crate::repository::stock::StockLedger;
use pdv_core::{
    CheckoutSession, CheckoutState, CoreError, Money, PaymentAssessment, PaymentMethod, Sale,
    SaleDraft, SaleLine,
};

/// What a successful finalize hands back to the caller.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    /// The persisted sale record.
    pub sale: Sale,
    /// Overpayment to hand back to the customer.
    pub change: Money,
}

/// One terminal's checkout flow: a session plus the database it
/// finalizes into.
#[derive(Debug)]
pub struct Checkout {
    db: Database,
    session: CheckoutSession,
}

impl Checkout {
    pub fn new(db: Database) -> Self {
        Checkout {
            db,
            session: CheckoutSession::new(),
        }
    }

    /// Read access to the underlying session.
    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    /// Starts a fresh session for the next sale. Only legal once the
    /// current one has reached a terminal state.
    pub fn reset(&mut self) -> StoreResult<()> {
        match self.session.state() {
            CheckoutState::Completed | CheckoutState::Abandoned => {
                self.session = CheckoutSession::new();
                Ok(())
            }
            state => Err(CoreError::InvalidTransition {
                state,
                action: "reset",
            }
            .into()),
        }
    }

    // =========================================================================
    // Cart (Building)
    // =========================================================================

    /// Resolves a product through the catalog and adds it to the cart.
    /// The advisory stock bound uses the level read here; the
    /// authoritative check happens at finalize.
    pub async fn add_product(&mut self, product_id: &str, quantity: i64) -> StoreResult<()> {
        let product = self
            .db
            .catalog()
            .get_product(product_id)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Product", product_id))?;

        self.session.add_line(&product, quantity)?;
        Ok(())
    }

    /// Removes one unit of a product from the cart.
    pub fn remove_one(&mut self, product_id: &str) -> StoreResult<()> {
        self.session.remove_one(product_id)?;
        Ok(())
    }

    // =========================================================================
    // Session transitions and tender entry (thin delegates)
    // =========================================================================

    pub fn begin_payment(&mut self) -> StoreResult<()> {
        self.session.begin_payment()?;
        Ok(())
    }

    pub fn back_to_cart(&mut self) -> StoreResult<()> {
        self.session.back_to_cart()?;
        Ok(())
    }

    pub fn abandon(&mut self) -> StoreResult<()> {
        self.session.abandon()?;
        Ok(())
    }

    pub fn set_discount(&mut self, discount: Money) -> StoreResult<()> {
        self.session.set_discount(discount)?;
        Ok(())
    }

    pub fn toggle_method(&mut self, method: PaymentMethod) -> StoreResult<()> {
        self.session.toggle_method(method)?;
        Ok(())
    }

    pub fn set_tender(&mut self, method: PaymentMethod, amount: Money) -> StoreResult<()> {
        self.session.set_tender(method, amount)?;
        Ok(())
    }

    pub fn assess(&self) -> PaymentAssessment {
        self.session.assess()
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Commits the sale: all stock decrements plus the history append,
    /// in one transaction.
    ///
    /// On any failure the transaction rolls back, the session returns to
    /// `AwaitingPayment` with cart and tenders intact, and the error
    /// says exactly what went wrong (`Shortfall`, `InsufficientStock`
    /// naming the offending product, or an infrastructure failure).
    pub async fn finalize(&mut self) -> StoreResult<FinalizeOutcome> {
        let draft = self.session.begin_finalize()?;

        match self.commit_draft(&draft).await {
            Ok(sale) => {
                self.session.complete()?;
                info!(sale_id = %sale.id, total = sale.total.cents(), "sale finalized");
                Ok(FinalizeOutcome {
                    sale,
                    change: draft.change,
                })
            }
            Err(err) => {
                self.session.finalize_failed()?;
                warn!(error = %err, "finalize rolled back");
                Err(err)
            }
        }
    }

    async fn commit_draft(&self, draft: &SaleDraft) -> StoreResult<Sale> {
        let mut tx = self.db.pool().begin().await.map_err(crate::error::DbError::from)?;

        // Guarded decrements, one per line. The first line that cannot
        // cover its quantity aborts the whole attempt; the snapshot name
        // makes the error actionable at the terminal.
        for line in &draft.lines {
            let result = StockLedger::adjust_tx(&mut tx, &line.product_id, -line.quantity).await;
            if let Err(err) = result {
                return Err(match err {
                    StoreError::Core(CoreError::InvalidAdjustment { stock, .. }) => {
                        CoreError::InsufficientStock {
                            product_id: line.product_id.clone(),
                            name: line.name.clone(),
                            available: stock,
                            requested: line.quantity,
                        }
                        .into()
                    }
                    other => other,
                });
            }
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            items: draft
                .lines
                .iter()
                .map(|line| SaleLine {
                    product_name: line.name.clone(),
                    quantity: line.quantity,
                    line_total: line.line_total(),
                })
                .collect(),
            discount: draft.discount,
            total: draft.total,
            payments: draft.payments,
        };

        SaleRepository::insert_tx(&mut tx, &sale).await?;
        tx.commit().await.map_err(crate::error::DbError::from)?;

        Ok(sale)
    }
}
