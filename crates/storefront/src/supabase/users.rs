//! Current user and profile lookups.

use tracing::{debug, instrument};

use stylefinder_core::UserId;

use super::{SupabaseClient, SupabaseError, Table};
use crate::models::{CurrentUser, Profile};

impl SupabaseClient {
    // =========================================================================
    // User Methods
    // =========================================================================

    /// Return `user` unchanged, or with fresh tokens if the access token expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is rejected.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn refresh_if_expired(&self, user: CurrentUser) -> Result<CurrentUser, SupabaseError> {
        if !user.is_expired(chrono::Utc::now().timestamp()) {
            return Ok(user);
        }

        debug!("Access token expired, refreshing session");
        let session = self.refresh_session(&user.refresh_token).await?;
        Ok(CurrentUser::from_session(session))
    }

    /// Re-read the signed-in user from GoTrue.
    ///
    /// Refreshes the session once when the stored token has expired, and
    /// returns the identity with up-to-date metadata and tokens.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` if the session is no longer valid.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn get_current_user(&self, user: CurrentUser) -> Result<CurrentUser, SupabaseError> {
        let mut user = self.refresh_if_expired(user).await?;
        let fresh = self.get_user(&user.access_token).await?;

        user.id = fresh.id;
        if let Some(email) = fresh.email {
            user.email = email;
        }
        user.metadata = fresh.user_metadata;
        Ok(user)
    }

    /// Get the optional `profiles` row of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_profile(
        &self,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<Option<Profile>, SupabaseError> {
        let rows: Vec<Profile> = self
            .from(Table::Profiles)
            .select("username,gender,style_preference")
            .eq("id", user_id)
            .limit(1)
            .auth(access_token)
            .fetch()
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{any, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::test_support::*;
    use super::*;
    use crate::supabase::{AuthSession, AuthUser, UserMetadata};

    fn stored_user(expires_at: i64) -> CurrentUser {
        CurrentUser::from_session(AuthSession {
            access_token: USER_TOKEN.to_string(),
            refresh_token: "old-refresh".to_string(),
            expires_in: None,
            expires_at: Some(expires_at),
            user: AuthUser {
                id: USER_ID.parse().unwrap(),
                email: Some("mia@example.com".to_string()),
                user_metadata: UserMetadata::default(),
            },
        })
    }

    fn user_json(username: &str) -> serde_json::Value {
        json!({
            "id": USER_ID,
            "email": "mia@example.com",
            "user_metadata": {"username": username}
        })
    }

    #[tokio::test]
    async fn test_valid_token_is_not_refreshed() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let far_future = chrono::Utc::now().timestamp() + 3600;
        let user = client(&server)
            .refresh_if_expired(stored_user(far_future))
            .await
            .unwrap();
        assert_eq!(user.access_token, USER_TOKEN);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({"refresh_token": "old-refresh"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh-access",
                "refresh_token": "fresh-refresh",
                "expires_in": 3600,
                "user": user_json("mia")
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer fresh-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json("mia_w")))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server)
            .get_current_user(stored_user(1_000))
            .await
            .unwrap();
        assert_eq!(user.access_token, "fresh-access");
        assert_eq!(user.refresh_token, "fresh-refresh");
        assert_eq!(user.display_name(), "mia_w");
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid Refresh Token: Already Used"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .refresh_if_expired(stored_user(1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, SupabaseError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_get_profile_optional_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("select", "username,gender,style_preference"))
            .and(query_param("id", format!("eq.{USER_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"username": "mia", "gender": null, "style_preference": "vintage"}
            ])))
            .mount(&server)
            .await;

        let user_id: UserId = USER_ID.parse().unwrap();
        let profile = client(&server)
            .get_profile(&user_id, USER_TOKEN)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.username.as_deref(), Some("mia"));
        assert!(profile.gender.is_none());
    }
}
