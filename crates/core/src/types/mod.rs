//! Core types for StyleFinder.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod profile;
pub mod recommendation;

pub use cart::{CartLine, CartTotals};
pub use category::{Category, CategoryFilter, split_options};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use profile::{Gender, StylePreference, UnknownOption};
pub use recommendation::{DEFAULT_REASON, POPULAR_REASONS, VIEW_REASON, display_reason, random_reason};
