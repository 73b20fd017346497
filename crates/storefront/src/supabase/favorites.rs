//! Saved items (`favorites` table). A row exists or it does not.

use serde::de::IgnoredAny;
use tracing::instrument;

use stylefinder_core::{ClothId, UserId};

use super::{SupabaseClient, SupabaseError, Table};
use crate::models::{FavoriteItem, NewFavorite};

impl SupabaseClient {
    // =========================================================================
    // Favorites Methods
    // =========================================================================

    /// Get a user's favorites with their clothes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_user_favorites(
        &self,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<Vec<FavoriteItem>, SupabaseError> {
        self.from(Table::Favorites)
            .select("*,clothes(*)")
            .eq("user_id", user_id)
            .order("created_at", false)
            .auth(access_token)
            .fetch()
            .await
    }

    /// Favorite a cloth. Favoriting it twice keeps a single row.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id, cloth_id = %cloth_id))]
    pub async fn add_to_favorites(
        &self,
        user_id: &UserId,
        cloth_id: ClothId,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        let row = NewFavorite {
            user_id: *user_id,
            cloth_id,
        };
        self.from(Table::Favorites)
            .on_conflict("user_id,cloth_id")
            .auth(access_token)
            .upsert(&row)
            .await
    }

    /// Unfavorite a cloth.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id, cloth_id = %cloth_id))]
    pub async fn remove_from_favorites(
        &self,
        user_id: &UserId,
        cloth_id: ClothId,
        access_token: &str,
    ) -> Result<(), SupabaseError> {
        self.from(Table::Favorites)
            .eq("user_id", user_id)
            .eq("cloth_id", cloth_id)
            .auth(access_token)
            .delete()
            .await
    }

    /// Whether the user has favorited a cloth.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id, cloth_id = %cloth_id))]
    pub async fn is_favorite(
        &self,
        user_id: &UserId,
        cloth_id: ClothId,
        access_token: &str,
    ) -> Result<bool, SupabaseError> {
        let rows: Vec<IgnoredAny> = self
            .from(Table::Favorites)
            .select("id")
            .eq("user_id", user_id)
            .eq("cloth_id", cloth_id)
            .limit(1)
            .auth(access_token)
            .fetch()
            .await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::test_support::*;
    use super::*;

    fn user() -> UserId {
        USER_ID.parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_user_favorites() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("select", "*,clothes(*)"))
            .and(query_param("user_id", format!("eq.{USER_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1, "user_id": USER_ID, "cloth_id": 7,
                    "clothes": {"id": 7, "name": "Rain Boots", "price": 129, "category": "kids"}
                },
                {"id": 2, "user_id": USER_ID, "cloth_id": 8, "clothes": null}
            ])))
            .mount(&server)
            .await;

        let favorites = client(&server)
            .get_user_favorites(&user(), USER_TOKEN)
            .await
            .unwrap();
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].cloth.as_ref().unwrap().category.label(), "Kids");
        assert!(favorites[1].cloth.is_none());
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("on_conflict", "user_id,cloth_id"))
            .and(body_json(json!({"user_id": USER_ID, "cloth_id": 7})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("user_id", format!("eq.{USER_ID}")))
            .and(query_param("cloth_id", "eq.7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        client
            .add_to_favorites(&user(), ClothId::new(7), USER_TOKEN)
            .await
            .unwrap();
        client
            .remove_from_favorites(&user(), ClothId::new(7), USER_TOKEN)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_is_favorite() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("select", "id"))
            .and(query_param("cloth_id", "eq.7"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .and(query_param("cloth_id", "eq.8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.is_favorite(&user(), ClothId::new(7), USER_TOKEN).await.unwrap());
        assert!(!client.is_favorite(&user(), ClothId::new(8), USER_TOKEN).await.unwrap());
    }
}
