//! # Money Module
//!
//! Monetary values as integer centavos.
//!
//! ## Why Integer Money?
//! ```text
//! In floating point:   0.1 + 0.2 = 0.30000000000000004
//! In integer centavos: 10 + 20 = 30
//! ```
//! Every amount in the system (prices, subtotals, discounts, tenders,
//! change) flows through this type, so the comparison that gates a
//! finalize is exact integer arithmetic and never floating subtraction.
//!
//! ## Precision
//! Exactly 2 decimal places. When parsing decimal text (e.g. a discount
//! typed as "1.005"), the third and later digits round **half-up**.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::CoreError;

/// A monetary value in centavos (the smallest currency unit).
///
/// ## Design
/// - `i64` (signed): differences such as `paid - total` may be negative
///   mid-computation even though persisted amounts never are.
/// - Single-field tuple struct: zero-cost wrapper, serializes as a bare
///   integer so the Sale record stays a plain-number contract.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// `from_major_minor(9, 90)` is R$ 9,90. For negative amounts only
    /// the major unit carries the sign: `from_major_minor(-5, 50)` is
    /// -R$ 5,50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a decimal string ("19.80", "10", "-0.50") into centavos.
    ///
    /// Digits beyond the second decimal place round half-up. This is the
    /// single place fractional input becomes fixed-point; everything
    /// downstream is integer math.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let text = text.trim();
        let invalid = || CoreError::InvalidAmount {
            input: text.to_string(),
        };

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() {
            return Err(invalid());
        }

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
            || (whole.is_empty() && frac.is_empty())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        // Take two fractional digits, then round half-up on the third.
        let mut frac_cents: i64 = 0;
        let mut it = frac.chars();
        for place in [10i64, 1] {
            if let Some(c) = it.next() {
                frac_cents += place * (c as i64 - '0' as i64);
            }
        }
        if let Some(c) = it.next() {
            if c as u8 - b'0' >= 5 {
                frac_cents += 1;
            }
        }

        // Amounts near i64::MAX centavos are nonsense input, not a panic.
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(invalid)?;
        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Subtraction floored at zero: `max(0, self - other)`.
    ///
    /// Used for `total = max(0, subtotal - discount)`, change and
    /// shortfall, which are never negative by definition.
    #[inline]
    pub const fn sub_floor_zero(&self, other: Money) -> Money {
        let diff = self.0 - other.0;
        Money(if diff < 0 { 0 } else { diff })
    }

    /// Multiplies by an item quantity.
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Debug-friendly display (`R$ 9.90`). UI formatting and localization
/// belong to the presentation collaborator, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_and_major_minor() {
        assert_eq!(Money::from_cents(990).cents(), 990);
        assert_eq!(Money::from_major_minor(9, 90).cents(), 990);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Money::parse("19.80").unwrap().cents(), 1980);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("0.2").unwrap().cents(), 20);
        assert_eq!(Money::parse("-0.50").unwrap().cents(), -50);
        assert_eq!(Money::parse(".5").unwrap().cents(), 50);
    }

    #[test]
    fn test_parse_rounds_half_up() {
        assert_eq!(Money::parse("1.005").unwrap().cents(), 101);
        assert_eq!(Money::parse("1.004").unwrap().cents(), 100);
        assert_eq!(Money::parse("1.0049").unwrap().cents(), 100);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("-").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("1,50").is_err());
        assert!(Money::parse("abc").is_err());
    }

    #[test]
    fn test_parse_rejects_overflowing_amounts() {
        // Parses as i64 but overflows once scaled to centavos.
        assert!(Money::parse("999999999999999999").is_err());
        assert!(Money::parse("-999999999999999999.99").is_err());
        // More digits than i64 itself holds.
        assert!(Money::parse("99999999999999999999").is_err());

        // The largest representable whole amount still parses.
        assert_eq!(
            Money::parse("92233720368547758.07").unwrap().cents(),
            i64::MAX
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(600);
        assert_eq!((a + b).cents(), 1600);
        assert_eq!((a - b).cents(), 400);
        assert_eq!((b * 3).cents(), 1800);
        assert_eq!(b.times(2).cents(), 1200);
    }

    #[test]
    fn test_sub_floor_zero() {
        let subtotal = Money::from_cents(500);
        assert_eq!(subtotal.sub_floor_zero(Money::from_cents(200)).cents(), 300);
        // Discount larger than subtotal floors at zero, never negative.
        assert_eq!(subtotal.sub_floor_zero(Money::from_cents(900)).cents(), 0);
    }

    #[test]
    fn test_sum_iterator() {
        let total: Money = [990, 990, 20].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(990)), "R$ 9.90");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R$ 5.50");
        assert_eq!(format!("{}", Money::zero()), "R$ 0.00");
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_cents(1980)).unwrap();
        assert_eq!(json, "1980");
    }
}
