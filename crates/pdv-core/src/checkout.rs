//! # Checkout Session
//!
//! The state machine that turns a cart plus tenders into a finalize
//! attempt.
//!
//! ```text
//! Building ──begin_payment()──► AwaitingPayment ──begin_finalize()──► Finalizing
//!    │  ▲                           │                                    │
//!    │  └──────back_to_cart()───────┘                     finalize_failed()
//!    │                                                      │         │
//!    └──abandon()──► Abandoned   AwaitingPayment ◄──────────┘     complete()
//!                    (terminal)                                        │
//!                                                             Completed (terminal)
//! ```
//!
//! - `Building`: cart mutable, tenders untouched.
//! - `AwaitingPayment`: cart frozen, tenders and discount accumulate.
//! - `Finalizing`: owned by the persistence layer; it applies the stock
//!   decrements and the sale append as one transaction, then reports
//!   back with `complete()` or `finalize_failed()`.
//! - `Completed` / `Abandoned`: terminal; every operation is rejected.
//!   A fresh session is created for the next sale.
//!
//! The session itself performs no I/O; the authoritative stock re-check
//! happens in the persistence layer during `Finalizing`.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::{PaymentAssessment, TenderSet};
use crate::types::{PaymentMethod, PaymentSplit, Product};

/// Where a checkout session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutState {
    Building,
    AwaitingPayment,
    Finalizing,
    Completed,
    Abandoned,
}

/// Everything the persistence layer needs to commit one sale:
/// the frozen lines, the computed totals and the payment split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    pub lines: Vec<CartLine>,
    pub discount: Money,
    /// `max(0, subtotal - discount)`.
    pub total: Money,
    pub payments: PaymentSplit,
    /// Overpayment to hand back to the customer.
    pub change: Money,
}

/// One checkout session. Owns the cart and tender state for exactly one
/// sale; discarded (or completed) and replaced for the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    state: CheckoutState,
    cart: Cart,
    discount: Money,
    tenders: TenderSet,
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutSession {
    pub fn new() -> Self {
        CheckoutSession {
            state: CheckoutState::Building,
            cart: Cart::new(),
            discount: Money::zero(),
            tenders: TenderSet::new(),
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn tenders(&self) -> &TenderSet {
        &self.tenders
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    fn guard(&self, allowed: &[CheckoutState], action: &'static str) -> CoreResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    // =========================================================================
    // Building: cart mutation
    // =========================================================================

    /// Adds a product to the cart (advisory stock bound applies).
    pub fn add_line(&mut self, product: &Product, requested_qty: i64) -> CoreResult<()> {
        self.guard(&[CheckoutState::Building], "add to cart")?;
        self.cart.add_line(product, requested_qty)
    }

    /// Removes one unit of a product from the cart.
    pub fn remove_one(&mut self, product_id: &str) -> CoreResult<()> {
        self.guard(&[CheckoutState::Building], "remove from cart")?;
        self.cart.remove_one(product_id)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// `Building -> AwaitingPayment`. Requires a non-empty cart.
    pub fn begin_payment(&mut self) -> CoreResult<()> {
        self.guard(&[CheckoutState::Building], "begin payment")?;
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        self.state = CheckoutState::AwaitingPayment;
        Ok(())
    }

    /// `AwaitingPayment -> Building` (back-navigation). Tenders and
    /// discount are kept; re-entering payment re-evaluates them against
    /// the possibly-changed total.
    pub fn back_to_cart(&mut self) -> CoreResult<()> {
        self.guard(&[CheckoutState::AwaitingPayment], "return to cart")?;
        self.state = CheckoutState::Building;
        Ok(())
    }

    /// Discards the session from any non-terminal, non-finalizing state.
    pub fn abandon(&mut self) -> CoreResult<()> {
        self.guard(
            &[CheckoutState::Building, CheckoutState::AwaitingPayment],
            "abandon",
        )?;
        self.cart.clear();
        self.discount = Money::zero();
        self.tenders = TenderSet::new();
        self.state = CheckoutState::Abandoned;
        Ok(())
    }

    // =========================================================================
    // AwaitingPayment: tender entry
    // =========================================================================

    /// Sets the whole-sale discount. Negative discounts are rejected;
    /// a discount above the subtotal floors the total at zero rather
    /// than failing.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        self.guard(&[CheckoutState::AwaitingPayment], "set discount")?;
        if discount.is_negative() {
            return Err(CoreError::NegativeAmount { field: "discount" });
        }
        self.discount = discount;
        Ok(())
    }

    /// Toggles a payment method's selection.
    pub fn toggle_method(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.guard(&[CheckoutState::AwaitingPayment], "select payment method")?;
        self.tenders.toggle(method);
        Ok(())
    }

    /// Sets the tendered amount for a method.
    pub fn set_tender(&mut self, method: PaymentMethod, amount: Money) -> CoreResult<()> {
        self.guard(&[CheckoutState::AwaitingPayment], "enter tender")?;
        self.tenders.set_amount(method, amount)
    }

    // =========================================================================
    // Totals
    // =========================================================================

    pub fn subtotal(&self) -> Money {
        self.cart.subtotal()
    }

    /// `max(0, subtotal - discount)`.
    pub fn total(&self) -> Money {
        self.subtotal().sub_floor_zero(self.discount)
    }

    /// Current reconciliation of tenders against the total.
    pub fn assess(&self) -> PaymentAssessment {
        self.tenders.evaluate(self.total())
    }

    // =========================================================================
    // Finalizing handshake (driven by the persistence layer)
    // =========================================================================

    /// `AwaitingPayment -> Finalizing`. Validates sufficiency and hands
    /// the frozen draft to the persistence layer. On a shortfall the
    /// session stays in `AwaitingPayment` and the exact missing amount
    /// is reported.
    pub fn begin_finalize(&mut self) -> CoreResult<SaleDraft> {
        self.guard(&[CheckoutState::AwaitingPayment], "finalize")?;
        if self.cart.is_empty() {
            // Unreachable through the public API (begin_payment requires
            // a non-empty cart and AwaitingPayment freezes it), but the
            // gate is cheap to keep explicit.
            return Err(CoreError::EmptyCart);
        }

        let assessment = self.assess();
        if !assessment.sufficient {
            return Err(CoreError::Shortfall {
                missing: assessment.shortfall,
            });
        }

        let draft = SaleDraft {
            lines: self.cart.lines().to_vec(),
            discount: self.discount,
            total: self.total(),
            payments: self.tenders.to_split(),
            change: assessment.change,
        };
        self.state = CheckoutState::Finalizing;
        Ok(draft)
    }

    /// `Finalizing -> Completed`, after the transaction committed.
    /// Cart and tender state are discarded.
    pub fn complete(&mut self) -> CoreResult<()> {
        self.guard(&[CheckoutState::Finalizing], "complete")?;
        self.cart.clear();
        self.discount = Money::zero();
        self.tenders = TenderSet::new();
        self.state = CheckoutState::Completed;
        Ok(())
    }

    /// `Finalizing -> AwaitingPayment`, after the transaction rolled
    /// back. Cart and tenders are intact so the cashier can retry.
    pub fn finalize_failed(&mut self) -> CoreResult<()> {
        self.guard(&[CheckoutState::Finalizing], "report finalize failure")?;
        self.state = CheckoutState::AwaitingPayment;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price_cents,
            group_id: None,
            min_stock: 0,
            stock,
        }
    }

    fn session_with_cart() -> CheckoutSession {
        let mut session = CheckoutSession::new();
        session.add_line(&product("a", 990, 10), 2).unwrap();
        session
    }

    #[test]
    fn test_begin_payment_requires_nonempty_cart() {
        let mut session = CheckoutSession::new();
        assert!(matches!(session.begin_payment(), Err(CoreError::EmptyCart)));
        assert_eq!(session.state(), CheckoutState::Building);

        session.add_line(&product("a", 990, 10), 1).unwrap();
        session.begin_payment().unwrap();
        assert_eq!(session.state(), CheckoutState::AwaitingPayment);
    }

    #[test]
    fn test_cart_frozen_while_awaiting_payment() {
        let mut session = session_with_cart();
        session.begin_payment().unwrap();

        let err = session.add_line(&product("b", 100, 5), 1).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        let err = session.remove_one("a").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_back_navigation_reopens_cart() {
        let mut session = session_with_cart();
        session.begin_payment().unwrap();
        session.back_to_cart().unwrap();

        assert_eq!(session.state(), CheckoutState::Building);
        session.add_line(&product("b", 100, 5), 1).unwrap();
    }

    #[test]
    fn test_total_floors_at_zero_and_is_monotonic_in_discount() {
        let mut session = session_with_cart(); // subtotal 19.80
        session.begin_payment().unwrap();

        let mut last = session.total();
        for discount in [0, 500, 1980, 5000] {
            session.set_discount(Money::from_cents(discount)).unwrap();
            let total = session.total();
            assert!(total <= last);
            last = total;
        }
        assert_eq!(session.total(), Money::zero());
    }

    #[test]
    fn test_finalize_rejects_shortfall() {
        let mut session = session_with_cart(); // total 19.80
        session.begin_payment().unwrap();
        session.toggle_method(PaymentMethod::Cash).unwrap();
        session.set_tender(PaymentMethod::Cash, Money::from_cents(1000)).unwrap();

        let err = session.begin_finalize().unwrap_err();
        assert_eq!(
            err,
            CoreError::Shortfall {
                missing: Money::from_cents(980)
            }
        );
        // Failed attempt leaves the session where it was.
        assert_eq!(session.state(), CheckoutState::AwaitingPayment);
    }

    #[test]
    fn test_finalize_handshake_success() {
        let mut session = session_with_cart();
        session.begin_payment().unwrap();
        session.toggle_method(PaymentMethod::Pix).unwrap();
        session.set_tender(PaymentMethod::Pix, Money::from_cents(2000)).unwrap();

        let draft = session.begin_finalize().unwrap();
        assert_eq!(session.state(), CheckoutState::Finalizing);
        assert_eq!(draft.total.cents(), 1980);
        assert_eq!(draft.change.cents(), 20);
        assert_eq!(draft.payments.pix.cents(), 2000);
        assert_eq!(draft.lines.len(), 1);

        session.complete().unwrap();
        assert_eq!(session.state(), CheckoutState::Completed);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_finalize_failure_returns_to_awaiting_payment() {
        let mut session = session_with_cart();
        session.begin_payment().unwrap();
        session.toggle_method(PaymentMethod::Cash).unwrap();
        session.set_tender(PaymentMethod::Cash, Money::from_cents(5000)).unwrap();

        session.begin_finalize().unwrap();
        session.finalize_failed().unwrap();

        assert_eq!(session.state(), CheckoutState::AwaitingPayment);
        // Cart and tenders survive for the retry.
        assert_eq!(session.cart().total_quantity(), 2);
        assert_eq!(session.tenders().amount(PaymentMethod::Cash).cents(), 5000);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut session = session_with_cart();
        session.abandon().unwrap();
        assert_eq!(session.state(), CheckoutState::Abandoned);
        assert!(session.cart().is_empty());

        assert!(matches!(
            session.begin_payment(),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.abandon(),
            Err(CoreError::InvalidTransition { .. })
        ));

        let mut done = session_with_cart();
        done.begin_payment().unwrap();
        done.toggle_method(PaymentMethod::Cash).unwrap();
        done.set_tender(PaymentMethod::Cash, Money::from_cents(5000)).unwrap();
        done.begin_finalize().unwrap();
        done.complete().unwrap();

        assert!(matches!(
            done.add_line(&product("b", 100, 5), 1),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert!(matches!(done.abandon(), Err(CoreError::InvalidTransition { .. })));
    }

    #[test]
    fn test_negative_discount_rejected() {
        let mut session = session_with_cart();
        session.begin_payment().unwrap();
        assert!(matches!(
            session.set_discount(Money::from_cents(-1)),
            Err(CoreError::NegativeAmount { field: "discount" })
        ));
    }
}
