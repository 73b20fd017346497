//! Cart arithmetic.
//!
//! Totals are derived from the rows currently displayed; nothing here is
//! persisted. Shipping is free, so the order total equals the subtotal.

use crate::Price;

/// The pricing-relevant part of one cart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartLine {
    /// Create a cart line.
    #[must_use]
    pub const fn new(unit_price: Price, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Summary shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of quantities over all rows.
    pub item_count: u32,
    /// Sum of `unit_price × quantity` over all rows.
    pub subtotal: Price,
}

impl CartTotals {
    /// Compute totals over the displayed rows.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = CartLine>,
    {
        lines.into_iter().fold(Self::default(), |acc, line| Self {
            item_count: acc.item_count.saturating_add(line.quantity),
            subtotal: acc.subtotal + line.line_price(),
        })
    }

    /// Order total. Shipping is always free.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.subtotal
    }

    /// Whether the cart has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}
