//! Cache types for catalog reads.

use std::sync::Arc;

use stylefinder_core::ClothId;

use crate::models::Cloth;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    AllClothes,
    Cloth(ClothId),
    Category(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Clothes(Arc<Vec<Cloth>>),
    Cloth(Box<Cloth>),
}
