//! Client-side price arithmetic.
//!
//! The harness shows a cart subtotal and a "new total" after a promocode
//! without asking the backend to reprice. Both are plain sums over
//! [`Money`], kept here so every surface computes them the same way.

use crate::types::Money;

/// One priced line: unit price times quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmount {
    /// Price of a single unit.
    pub unit_price: Money,
    /// Number of units.
    pub qty: u32,
}

impl LineAmount {
    /// Create a line amount.
    #[must_use]
    pub const fn new(unit_price: Money, qty: u32) -> Self {
        Self { unit_price, qty }
    }

    /// `unit_price * qty`.
    #[must_use]
    pub fn total(&self) -> Money {
        self.unit_price * self.qty
    }
}

/// Sum of every line total.
///
/// An empty cart has a subtotal of zero.
#[must_use]
pub fn subtotal<I>(lines: I) -> Money
where
    I: IntoIterator<Item = LineAmount>,
{
    lines.into_iter().map(|line| line.total()).sum()
}

/// Total after a promocode discount: `subtotal - discount`.
///
/// Not clamped: a discount larger than the subtotal yields a negative total.
#[must_use]
pub fn discounted_total(subtotal: Money, discount: Money) -> Money {
    subtotal - discount
}
