//! # Domain Types
//!
//! Core domain types for the PDV terminal.
//!
//! ```text
//! Product ──┐ (catalog; stock mutated only via the ledger)
//! Group   ──┤ (report partitioning only)
//!           │
//! Sale ─────┴─ immutable, append-only history record:
//!              items carry product NAMES (snapshots), never references,
//!              so reports stay stable across renames and deletions.
//! ```
//!
//! ## Persisted Sale shape
//! The serialized `Sale` is the storage contract other tooling reads:
//! `{ id, createdAt, items: [{productName, quantity, lineTotal}],
//!    discount, total, payments: {debit, credit, cash, pix} }`
//! with every amount as integer centavos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// The four tender methods the terminal accepts.
///
/// Methods are mutually exclusive keys of a sale's payment split: a sale
/// carries at most one amount per method, never a list of tenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Debit,
    Credit,
    Cash,
    Pix,
}

impl PaymentMethod {
    /// All methods, in display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Debit,
        PaymentMethod::Credit,
        PaymentMethod::Cash,
        PaymentMethod::Pix,
    ];
}

// =============================================================================
// Payment Split
// =============================================================================

/// Per-method amounts recorded on a finalized sale.
///
/// Unused methods are stored as zero, matching the persisted record
/// shape (`payments: {debit: 0, credit: 0, cash: 2000, pix: 0}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub debit: Money,
    pub credit: Money,
    pub cash: Money,
    pub pix: Money,
}

impl PaymentSplit {
    /// Amount recorded for one method.
    pub fn amount(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::Debit => self.debit,
            PaymentMethod::Credit => self.credit,
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Pix => self.pix,
        }
    }

    /// Sets the amount for one method.
    pub fn set(&mut self, method: PaymentMethod, amount: Money) {
        match method {
            PaymentMethod::Debit => self.debit = amount,
            PaymentMethod::Credit => self.credit = amount,
            PaymentMethod::Cash => self.cash = amount,
            PaymentMethod::Pix => self.pix = amount,
        }
    }

    /// Sum across all methods.
    pub fn total(&self) -> Money {
        self.debit + self.credit + self.cash + self.pix
    }
}

// =============================================================================
// Group
// =============================================================================

/// A product group. Used only to partition catalog views and reports;
/// it has no stock or pricing semantics of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Group {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Owned by the catalog collaborator; this core reads it and mutates
/// only `stock`, exclusively through the stock ledger's adjust
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,

    /// Display name; snapshotted into cart lines and sale items.
    pub name: String,

    /// Unit price in centavos.
    pub price_cents: i64,

    /// Group this product reports under. Optional: ungrouped products
    /// are legal and show up under no group.
    pub group_id: Option<String>,

    /// Restock warning threshold. Purely advisory.
    pub min_stock: i64,

    /// Quantity on hand. Never negative between transactions.
    pub stock: i64,
}

impl Product {
    /// Unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether stock has fallen below the restock threshold.
    #[inline]
    pub fn below_minimum(&self) -> bool {
        self.stock < self.min_stock
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a finalized sale.
///
/// Stores the product *name*, deliberately not an id: historical
/// reports must survive later renames and deletions of the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(rename = "productName")]
    pub product_name: String,

    pub quantity: i64,

    /// `unit price x quantity` at sale time, in centavos.
    #[serde(rename = "lineTotal")]
    pub line_total: Money,
}

/// A finalized sale. Immutable once created: the history is append-only
/// and this core never edits or deletes a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    pub items: Vec<SaleLine>,

    /// Whole-sale discount, floored into the total at finalize time.
    pub discount: Money,

    /// `max(0, subtotal - discount)`.
    pub total: Money,

    pub payments: PaymentSplit,
}

impl Sale {
    /// Total item quantity across all lines.
    pub fn item_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Revenue recorded on the lines (pre-discount).
    pub fn line_revenue(&self) -> Money {
        self.items.iter().map(|l| l.line_total).sum()
    }
}
