//! View history (`recommendations` table).
//!
//! Rows are appended when a signed-in shopper opens a detail page. The
//! "popular" query is a plain read of recent rows, not a ranking.

use std::collections::HashSet;

use tracing::instrument;

use stylefinder_core::{ClothId, UserId};

use super::{SupabaseClient, SupabaseError, Table};
use crate::models::{Cloth, NewRecommendation, PopularRecommendation, Recommendation};

impl SupabaseClient {
    // =========================================================================
    // Recommendation Methods
    // =========================================================================

    /// Get a user's view history with the viewed clothes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_user_recommendations(
        &self,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<Vec<Recommendation>, SupabaseError> {
        self.from(Table::Recommendations)
            .select("*,clothes(*)")
            .eq("user_id", user_id)
            .order("created_at", false)
            .auth(access_token)
            .fetch()
            .await
    }

    /// Log that a user viewed a cloth.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id, cloth_id = %cloth_id))]
    pub async fn add_recommendation(
        &self,
        user_id: &UserId,
        cloth_id: ClothId,
        reason: &str,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        let row = NewRecommendation {
            user_id: *user_id,
            cloth_id,
            reason: reason.to_string(),
            viewed_at: chrono::Utc::now(),
        };
        self.from(Table::Recommendations)
            .auth(access_token)
            .insert(&row)
            .await
    }

    /// Get up to `limit` logged views with their clothes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_popular_recommendations(
        &self,
        limit: usize,
    ) -> Result<Vec<PopularRecommendation>, SupabaseError> {
        self.from(Table::Recommendations)
            .select("cloth_id,clothes(*)")
            .limit(limit)
            .fetch()
            .await
    }
}

/// Clothes of the popular rows, first occurrence wins.
///
/// Rows whose cloth no longer exists are skipped.
#[must_use]
pub fn distinct_clothes(rows: Vec<PopularRecommendation>) -> Vec<Cloth> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter_map(|row| row.cloth)
        .filter(|cloth| seen.insert(cloth.id))
        .collect()
}
