//! Rows of the Supabase tables.
//!
//! Read types tolerate missing optional columns. Embedded `clothes(*)`
//! selections arrive under the `clothes` key and may be `null` when the
//! referenced cloth was deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stylefinder_core::price::{deserialize_amount, serialize_amount};
use stylefinder_core::{
    CartItemId, Category, ClothId, FavoriteId, Price, RecommendationId, UserId, split_options,
};

/// Season shown when the catalog does not specify one.
pub const ALL_SEASONS: &str = "All seasons";

/// A catalog product (`clothes` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloth {
    pub id: ClothId,
    pub name: String,
    #[serde(
        deserialize_with = "deserialize_amount",
        serialize_with = "serialize_amount"
    )]
    pub price: Price,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated sizes, e.g. `S,M,L`
    #[serde(default)]
    pub sizes: Option<String>,
    /// Comma-separated colors
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
}

impl Cloth {
    /// Individual size options.
    #[must_use]
    pub fn size_options(&self) -> Vec<String> {
        self.sizes.as_deref().map(split_options).unwrap_or_default()
    }

    /// Individual color options.
    #[must_use]
    pub fn color_options(&self) -> Vec<String> {
        self.colors.as_deref().map(split_options).unwrap_or_default()
    }

    /// Season label, defaulting to [`ALL_SEASONS`].
    #[must_use]
    pub fn season_label(&self) -> &str {
        non_blank(self.season.as_deref()).unwrap_or(ALL_SEASONS)
    }

    /// Material, if recorded.
    #[must_use]
    pub fn material_label(&self) -> Option<&str> {
        non_blank(self.material.as_deref())
    }
}

/// A cart row joined with its cloth (`cart` table).
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub cloth_id: ClothId,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "clothes")]
    pub cloth: Option<Cloth>,
}

/// Payload for adding a cart row.
///
/// `(user_id, cloth_id, size, color)` is the table's unique key.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub cloth_id: ClothId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
}

/// A favorited cloth (`favorites` table).
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteItem {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub cloth_id: ClothId,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "clothes")]
    pub cloth: Option<Cloth>,
}

/// Payload for favoriting a cloth.
#[derive(Debug, Clone, Serialize)]
pub struct NewFavorite {
    pub user_id: UserId,
    pub cloth_id: ClothId,
}

/// A logged view of a cloth (`recommendations` table).
#[derive(Debug, Clone, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub user_id: UserId,
    pub cloth_id: ClothId,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub viewed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "clothes")]
    pub cloth: Option<Cloth>,
}

impl Recommendation {
    /// Calendar date of the view (`YYYY-MM-DD`), if recorded.
    #[must_use]
    pub fn viewed_on(&self) -> Option<&str> {
        self.viewed_at
            .as_deref()
            .or(self.created_at.as_deref())
            .and_then(|ts| ts.get(..10))
    }
}

/// Payload for logging a view.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecommendation {
    pub user_id: UserId,
    pub cloth_id: ClothId,
    pub reason: String,
    pub viewed_at: DateTime<Utc>,
}

/// Row of the popular-picks query (`select=cloth_id,clothes(*)`).
#[derive(Debug, Clone, Deserialize)]
pub struct PopularRecommendation {
    pub cloth_id: ClothId,
    #[serde(default, rename = "clothes")]
    pub cloth: Option<Cloth>,
}

/// Optional public profile row (`profiles` table).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub style_preference: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
