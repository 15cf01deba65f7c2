//! # Error Types
//!
//! Domain errors for the checkout engine and stock ledger.
//!
//! Every error here is recoverable: it leaves the cart, session and
//! ledger exactly as they were and is reported to the caller as a typed
//! result, never a silent no-op. There are no fatal errors in this
//! core.

use thiserror::Error;

use crate::checkout::CheckoutState;
use crate::money::Money;

/// Core business errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested quantity exceeds available stock, either at
    /// add-to-cart time (advisory) or at the finalize re-check (the
    /// authoritative gate).
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Tendered amount below the sale total. Carries the exact missing
    /// amount for display.
    #[error("payment short by {missing}")]
    Shortfall { missing: Money },

    /// Attempt to proceed to payment or finalize with no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Manual stock adjustment that would drive stock negative outside
    /// a sale context.
    #[error("adjustment of {delta} would drive stock below zero (current {stock})")]
    InvalidAdjustment {
        product_id: String,
        stock: i64,
        delta: i64,
    },

    /// Operation not legal in the session's current state (e.g. mutating
    /// the cart while awaiting payment, or any action after Completed).
    #[error("cannot {action} while checkout is {state:?}")]
    InvalidTransition {
        state: CheckoutState,
        action: &'static str,
    },

    /// Product referenced by the operation is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(String),

    /// Zero or negative item quantity where only positive quantities
    /// are meaningful (cart lines are dropped at zero, never kept).
    #[error("quantity must be positive, got {requested}")]
    InvalidQuantity { requested: i64 },

    /// Monetary input that does not parse as a 2-decimal amount.
    #[error("invalid monetary amount: '{input}'")]
    InvalidAmount { input: String },

    /// Negative amount where only non-negative money is meaningful
    /// (tenders, discount).
    #[error("{field} must not be negative")]
    NegativeAmount { field: &'static str },
}

/// Convenience alias for results carrying [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
