//! Domain models for the storefront.
//!
//! - [`catalog`] - Rows read from and written to the Supabase tables
//! - [`session`] - Identity stored in the browser session

pub mod catalog;
pub mod session;

pub use catalog::{
    CartItem, Cloth, FavoriteItem, NewCartItem, NewFavorite, NewRecommendation,
    PopularRecommendation, Profile, Recommendation,
};
pub use session::{CurrentUser, keys as session_keys};
