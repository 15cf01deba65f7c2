//! # Payment Reconciler
//!
//! Reconciles a set of tendered amounts against a sale total.
//!
//! ## Selection gates, not amounts
//! A method contributes to `paid` only while it is *selected*. A stray
//! amount left behind on a deselected method is ignored, not summed:
//! the cashier toggling "cash" off must immediately drop its amount
//! from the reconciliation even though the typed value is still there.
//!
//! There is no upper bound on overpayment (the excess becomes change)
//! and no constraint on how many methods combine into one sale.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, PaymentSplit};

/// Tender entry state for one checkout session: which methods are
/// selected and what amount is typed against each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderSet {
    selected: [bool; 4],
    amounts: PaymentSplit,
}

impl TenderSet {
    pub fn new() -> Self {
        TenderSet::default()
    }

    fn idx(method: PaymentMethod) -> usize {
        match method {
            PaymentMethod::Debit => 0,
            PaymentMethod::Credit => 1,
            PaymentMethod::Cash => 2,
            PaymentMethod::Pix => 3,
        }
    }

    /// Toggles a method's selection on or off. The typed amount is kept
    /// either way; only selection decides whether it counts.
    pub fn toggle(&mut self, method: PaymentMethod) {
        self.selected[Self::idx(method)] = !self.selected[Self::idx(method)];
    }

    pub fn is_selected(&self, method: PaymentMethod) -> bool {
        self.selected[Self::idx(method)]
    }

    /// Sets the tendered amount for a method. Negative tenders are
    /// meaningless and rejected.
    pub fn set_amount(&mut self, method: PaymentMethod, amount: Money) -> CoreResult<()> {
        if amount.is_negative() {
            return Err(CoreError::NegativeAmount { field: "tender" });
        }
        self.amounts.set(method, amount);
        Ok(())
    }

    pub fn amount(&self, method: PaymentMethod) -> Money {
        self.amounts.amount(method)
    }

    /// Sum of amounts across *selected* methods only.
    pub fn paid(&self) -> Money {
        PaymentMethod::ALL
            .iter()
            .filter(|m| self.is_selected(**m))
            .map(|m| self.amounts.amount(*m))
            .sum()
    }

    /// The per-method amounts that would be recorded on the sale:
    /// selected methods keep their amount, unselected ones record zero.
    pub fn to_split(&self) -> PaymentSplit {
        let mut split = PaymentSplit::default();
        for method in PaymentMethod::ALL {
            if self.is_selected(method) {
                split.set(method, self.amounts.amount(method));
            }
        }
        split
    }

    /// Evaluates the tender set against a total.
    pub fn evaluate(&self, total: Money) -> PaymentAssessment {
        PaymentAssessment::evaluate(total, self.paid())
    }
}

/// Result of reconciling `paid` against `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAssessment {
    pub paid: Money,
    pub sufficient: bool,
    /// `max(0, paid - total)`.
    pub change: Money,
    /// `max(0, total - paid)`.
    pub shortfall: Money,
}

impl PaymentAssessment {
    /// Pure reconciliation: integer-centavo comparison, no floats.
    pub fn evaluate(total: Money, paid: Money) -> Self {
        PaymentAssessment {
            paid,
            sufficient: paid >= total,
            change: paid.sub_floor_zero(total),
            shortfall: total.sub_floor_zero(paid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tender_exact() {
        // evaluate(total=100.00, {cash:60, pix:40}) -> sufficient, change 0
        let mut tenders = TenderSet::new();
        tenders.toggle(PaymentMethod::Cash);
        tenders.set_amount(PaymentMethod::Cash, Money::from_cents(6000)).unwrap();
        tenders.toggle(PaymentMethod::Pix);
        tenders.set_amount(PaymentMethod::Pix, Money::from_cents(4000)).unwrap();

        let assessment = tenders.evaluate(Money::from_cents(10000));
        assert!(assessment.sufficient);
        assert_eq!(assessment.change, Money::zero());
        assert_eq!(assessment.shortfall, Money::zero());
    }

    #[test]
    fn test_shortfall_reported_exactly() {
        // evaluate(total=100.00, {cash:60}) -> shortfall 40.00
        let mut tenders = TenderSet::new();
        tenders.toggle(PaymentMethod::Cash);
        tenders.set_amount(PaymentMethod::Cash, Money::from_cents(6000)).unwrap();

        let assessment = tenders.evaluate(Money::from_cents(10000));
        assert!(!assessment.sufficient);
        assert_eq!(assessment.shortfall.cents(), 4000);
        assert_eq!(assessment.change, Money::zero());
    }

    #[test]
    fn test_unselected_amount_is_ignored() {
        let mut tenders = TenderSet::new();
        tenders.set_amount(PaymentMethod::Cash, Money::from_cents(9999)).unwrap();

        // Amount typed but method never selected: contributes nothing.
        assert_eq!(tenders.paid(), Money::zero());
        assert!(!tenders.evaluate(Money::from_cents(100)).sufficient);

        // Selecting it brings the amount back into play.
        tenders.toggle(PaymentMethod::Cash);
        assert_eq!(tenders.paid().cents(), 9999);

        // Deselecting drops it again even though the amount remains.
        tenders.toggle(PaymentMethod::Cash);
        assert_eq!(tenders.paid(), Money::zero());
        assert_eq!(tenders.amount(PaymentMethod::Cash).cents(), 9999);
    }

    #[test]
    fn test_overpayment_becomes_change() {
        let mut tenders = TenderSet::new();
        tenders.toggle(PaymentMethod::Pix);
        tenders.set_amount(PaymentMethod::Pix, Money::from_cents(2000)).unwrap();

        let assessment = tenders.evaluate(Money::from_cents(1980));
        assert!(assessment.sufficient);
        assert_eq!(assessment.change.cents(), 20);
    }

    #[test]
    fn test_split_records_zero_for_unselected() {
        let mut tenders = TenderSet::new();
        tenders.toggle(PaymentMethod::Debit);
        tenders.set_amount(PaymentMethod::Debit, Money::from_cents(500)).unwrap();
        tenders.set_amount(PaymentMethod::Cash, Money::from_cents(700)).unwrap();

        let split = tenders.to_split();
        assert_eq!(split.debit.cents(), 500);
        assert_eq!(split.cash.cents(), 0); // never selected
        assert_eq!(split.total().cents(), 500);
    }

    #[test]
    fn test_negative_tender_rejected() {
        let mut tenders = TenderSet::new();
        let err = tenders
            .set_amount(PaymentMethod::Cash, Money::from_cents(-100))
            .unwrap_err();
        assert!(matches!(err, CoreError::NegativeAmount { field: "tender" }));
    }

    #[test]
    fn test_zero_total_is_trivially_sufficient() {
        let tenders = TenderSet::new();
        let assessment = tenders.evaluate(Money::zero());
        assert!(assessment.sufficient);
        assert_eq!(assessment.change, Money::zero());
    }
}
