//! # Cart
//!
//! The in-terminal cart for one checkout session.
//!
//! ## Snapshot pattern
//! `CartLine` freezes the product's name and unit price at add time, so
//! a catalog edit mid-sale never retroactively changes an in-progress
//! transaction. The product id is kept only so finalize can re-check
//! stock against the live ledger.
//!
//! ## Advisory stock bound
//! `add_line` refuses to exceed the stock snapshot it is given. This is
//! a UX guard, not the correctness gate: two terminals can each pass it
//! for the same last unit. The authoritative re-check happens inside
//! finalize, against the live ledger, and both checks are kept on
//! purpose.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

/// One cart line: a product snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,

    /// Name at add time (frozen).
    pub name: String,

    /// Unit price in centavos at add time (frozen).
    pub unit_price_cents: i64,

    /// Always > 0; a line at zero is removed, not kept.
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// Unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// `unit price x quantity`, exact in integer centavos.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().times(self.quantity)
    }
}

/// The cart. Owns its lines exclusively; cleared only by a successful
/// finalize or an explicit abandon, never partially.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `requested_qty` of a product, merging into an existing line.
    ///
    /// Rejects zero and negative quantities with
    /// [`CoreError::InvalidQuantity`]. Fails with
    /// [`CoreError::InsufficientStock`] when the quantity already in the
    /// cart plus the request exceeds the product's stock snapshot.
    /// Advisory only; finalize re-checks the live ledger.
    pub fn add_line(&mut self, product: &Product, requested_qty: i64) -> CoreResult<()> {
        if requested_qty <= 0 {
            return Err(CoreError::InvalidQuantity {
                requested: requested_qty,
            });
        }

        let in_cart = self
            .lines
            .iter()
            .find(|l| l.product_id == product.id)
            .map(|l| l.quantity)
            .unwrap_or(0);

        if in_cart + requested_qty > product.stock {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock,
                requested: in_cart + requested_qty,
            });
        }

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity += requested_qty,
            None => self.lines.push(CartLine::from_product(product, requested_qty)),
        }
        Ok(())
    }

    /// Decrements a line by one, dropping it entirely at quantity zero.
    pub fn remove_one(&mut self, product_id: &str) -> CoreResult<()> {
        let Some(pos) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return Err(CoreError::NotInCart(product_id.to_string()));
        };

        if self.lines[pos].quantity > 1 {
            self.lines[pos].quantity -= 1;
        } else {
            self.lines.remove(pos);
        }
        Ok(())
    }

    /// Exact `Σ unit_price x quantity` across lines, in integer
    /// centavos. No floating point is involved at any step.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// Total item quantity across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Empties the cart. Callers are the session's finalize/abandon
    /// paths; there is no partial clear.
    pub(crate) fn clear(&mut self) {
        self.lines.clear();
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

    #[test]
    fn test_add_rejects_nonpositive_quantity() {
        let mut cart = Cart::new();
        let p = product("1", 990, 10);

        for qty in [0, -3] {
            let err = cart.add_line(&p, qty).unwrap_err();
            assert_eq!(err, CoreError::InvalidQuantity { requested: qty });
        }
        // No line was created; the subtotal cannot go negative this way.
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new();
        let p = product("1", 990, 10);

        cart.add_line(&p, 1).unwrap();
        cart.add_line(&p, 2).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_add_respects_stock_snapshot() {
        let mut cart = Cart::new();
        let p = product("1", 990, 2);

        cart.add_line(&p, 2).unwrap();
        let err = cart.add_line(&p, 1).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        // The failed add changed nothing.
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_remove_one_drops_line_at_zero() {
        let mut cart = Cart::new();
        let p = product("1", 500, 10);

        cart.add_line(&p, 2).unwrap();
        cart.remove_one("1").unwrap();
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.remove_one("1").unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.remove_one("1"),
            Err(CoreError::NotInCart(_))
        ));
    }

    #[test]
    fn test_subtotal_exact_after_churn() {
        let mut cart = Cart::new();
        let a = product("a", 990, 1000);
        let b = product("b", 333, 1000);

        // Repeated add/remove cycles must not drift a single centavo.
        for _ in 0..100 {
            cart.add_line(&a, 3).unwrap();
            cart.add_line(&b, 7).unwrap();
            cart.remove_one("a").unwrap();
        }
        // 100 * (2 x 990) + 100 * (7 x 333)
        assert_eq!(cart.subtotal().cents(), 100 * 2 * 990 + 100 * 7 * 333);
    }

    #[test]
    fn test_snapshot_survives_catalog_edit() {
        let mut cart = Cart::new();
        let mut p = product("1", 990, 10);
        cart.add_line(&p, 1).unwrap();

        // Catalog price change after the fact does not touch the line.
        p.price_cents = 1590;
        assert_eq!(cart.subtotal().cents(), 990);
    }
}
