//! Catalog reads (`clothes` table).

use std::sync::Arc;

use tracing::instrument;

use stylefinder_core::{Category, ClothId};

use super::cache::{CacheKey, CacheValue};
use super::{SupabaseClient, SupabaseError, Table};
use crate::models::Cloth;

impl SupabaseClient {
    // =========================================================================
    // Clothes Methods
    // =========================================================================

    /// Get the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_all_clothes(&self) -> Result<Vec<Cloth>, SupabaseError> {
        let key = CacheKey::AllClothes;
        if let Some(CacheValue::Clothes(clothes)) = self.cached(&key).await {
            return Ok(clothes.as_ref().clone());
        }

        let clothes: Vec<Cloth> = self
            .from(Table::Clothes)
            .select("*")
            .order("created_at", false)
            .fetch()
            .await?;

        self.remember(key, CacheValue::Clothes(Arc::new(clothes.clone())))
            .await;
        Ok(clothes)
    }

    /// Get one cloth by id.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no cloth has this id.
    #[instrument(skip(self), fields(cloth_id = %id))]
    pub async fn get_cloth_by_id(&self, id: ClothId) -> Result<Cloth, SupabaseError> {
        let key = CacheKey::Cloth(id);
        if let Some(CacheValue::Cloth(cloth)) = self.cached(&key).await {
            return Ok(*cloth);
        }

        let cloth: Cloth = self
            .from(Table::Clothes)
            .select("*")
            .eq("id", id)
            .single()
            .await
            .map_err(|e| match e {
                SupabaseError::NotFound(_) => SupabaseError::NotFound(format!("cloth {id}")),
                other => other,
            })?;

        self.remember(key, CacheValue::Cloth(Box::new(cloth.clone())))
            .await;
        Ok(cloth)
    }

    /// Get the clothes of one category, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn get_clothes_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<Cloth>, SupabaseError> {
        let key = CacheKey::Category(category.as_str().to_string());
        if let Some(CacheValue::Clothes(clothes)) = self.cached(&key).await {
            return Ok(clothes.as_ref().clone());
        }

        let clothes: Vec<Cloth> = self
            .from(Table::Clothes)
            .select("*")
            .eq("category", category.as_str())
            .order("created_at", false)
            .fetch()
            .await?;

        self.remember(key, CacheValue::Clothes(Arc::new(clothes.clone())))
            .await;
        Ok(clothes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::test_support::*;
    use super::*;

    fn rows() -> serde_json::Value {
        json!([
            {"id": 2, "name": "Pleated Skirt", "price": 159, "category": "women", "sizes": "S,M"},
            {"id": 1, "name": "Denim Jacket", "price": "299.00", "category": "women"}
        ])
    }

    #[tokio::test]
    async fn test_get_all_clothes_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clothes"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows()))
            .expect(1)
            .mount(&server)
            .await;

        let clothes = client(&server).get_all_clothes().await.unwrap();
        assert_eq!(clothes.len(), 2);
        assert_eq!(clothes[0].name, "Pleated Skirt");
        assert_eq!(clothes[1].price.display(), "¥299.00");
    }

    #[tokio::test]
    async fn test_get_clothes_by_category_filters_remotely() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clothes"))
            .and(query_param("category", "eq.women"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows()))
            .expect(1)
            .mount(&server)
            .await;

        let clothes = client(&server)
            .get_clothes_by_category(&Category::Women)
            .await
            .unwrap();
        assert!(clothes.iter().all(|c| c.category == Category::Women));
    }

    #[tokio::test]
    async fn test_get_cloth_by_id_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clothes"))
            .and(query_param("id", "eq.77"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_cloth_by_id(ClothId::new(77))
            .await
            .unwrap_err();
        match err {
            SupabaseError::NotFound(what) => assert_eq!(what, "cloth 77"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_reads_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clothes"))
            .and(query_param("id", "eq.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5, "name": "Wool Scarf", "price": 89, "category": "accessories"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = cached_client(&server);
        let first = client.get_cloth_by_id(ClothId::new(5)).await.unwrap();
        let second = client.get_cloth_by_id(ClothId::new(5)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.category.icon(), "👜");
    }
}
