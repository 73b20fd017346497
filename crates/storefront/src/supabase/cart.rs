//! Shopping cart rows (`cart` table).
//!
//! Writes filter on the owner's id as well as the row id.

use serde_json::json;
use tracing::instrument;

use stylefinder_core::{CartItemId, UserId};

use super::{SupabaseClient, SupabaseError, Table};
use crate::models::{CartItem, NewCartItem};

/// Unique key of a cart row.
const CART_CONFLICT_COLUMNS: &str = "user_id,cloth_id,size,color";

impl SupabaseClient {
    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get a user's cart rows with their clothes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_user_cart(
        &self,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<Vec<CartItem>, SupabaseError> {
        self.from(Table::Cart)
            .select("*,clothes(*)")
            .eq("user_id", user_id)
            .order("created_at", false)
            .auth(access_token)
            .fetch()
            .await
    }

    /// Add a cloth to the cart.
    ///
    /// Adding the same cloth, size and color again replaces the stored
    /// quantity with the new one.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::InvalidQuantity` for a zero quantity.
    #[instrument(skip(self, item, access_token), fields(user_id = %item.user_id, cloth_id = %item.cloth_id))]
    pub async fn add_to_cart(
        &self,
        item: &NewCartItem,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        if item.quantity < 1 {
            return Err(SupabaseError::InvalidQuantity(item.quantity));
        }
        self.from(Table::Cart)
            .on_conflict(CART_CONFLICT_COLUMNS)
            .auth(access_token)
            .upsert(item)
            .await
    }

    /// Set the quantity of one cart row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::InvalidQuantity` without calling Supabase when
    /// `quantity` is zero.
    #[instrument(skip(self, access_token), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        user_id: &UserId,
        item_id: CartItemId,
        quantity: u32,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        if quantity < 1 {
            return Err(SupabaseError::InvalidQuantity(quantity));
        }
        self.from(Table::Cart)
            .eq("id", item_id)
            .eq("user_id", user_id)
            .auth(access_token)
            .update(&json!({ "quantity": quantity }))
            .await
    }

    /// Remove one cart row.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        item_id: CartItemId,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        self.from(Table::Cart)
            .eq("id", item_id)
            .eq("user_id", user_id)
            .auth(access_token)
            .delete()
            .await
    }

    /// Remove every row of a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &UserId, access_token: &str) -> Result<(), SupabaseError> {
        self.from(Table::Cart)
            .eq("user_id", user_id)
            .auth(access_token)
            .delete()
            .await
    }
}
