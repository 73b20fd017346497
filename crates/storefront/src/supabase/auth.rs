//! GoTrue authentication (`{url}/auth/v1`).

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use url::Url;

use stylefinder_core::{Email, Gender, StylePreference, UserId};

use super::{SupabaseClient, SupabaseError, error_for_status, parse_json};

/// Profile fields stored in the auth user's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preference: Option<String>,
}

impl UserMetadata {
    /// Gender, if set to one of the known options.
    #[must_use]
    pub fn gender(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(|g| g.parse().ok())
    }

    /// Style preference, if set to one of the known options.
    #[must_use]
    pub fn style_preference(&self) -> Option<StylePreference> {
        self.style_preference
            .as_deref()
            .and_then(|s| s.parse().ok())
    }
}

/// A user as returned by GoTrue.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Tokens for a signed-in user.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix timestamp at which `access_token` expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in right away.
    SignedIn(AuthSession),
    /// The user must follow the link in the verification email first.
    ConfirmationRequired(AuthUser),
}

impl SupabaseClient {
    fn auth_url(&self, endpoint: &str) -> Result<Url, SupabaseError> {
        let endpoints = self.endpoints()?;
        Ok(Url::parse(&format!("{}/{endpoint}", endpoints.auth))?)
    }

    fn token_url(&self, grant_type: &str) -> Result<Url, SupabaseError> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` with GoTrue's message on bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, SupabaseError> {
        let url = self.token_url("password")?;
        let response = self
            .request(reqwest::Method::POST, url, None)?
            .json(&json!({ "email": email.as_str(), "password": password }))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        parse_json(response).await
    }

    /// Register a new user with profile metadata.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` with GoTrue's message, e.g. when the
    /// email is already registered or the password is too weak.
    #[instrument(skip(self, password, metadata), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let url = self.auth_url("signup")?;
        let response = self
            .request(reqwest::Method::POST, url, None)?
            .json(&json!({
                "email": email.as_str(),
                "password": password,
                "data": metadata,
            }))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let body: serde_json::Value = parse_json(response).await?;

        if body.get("access_token").is_some() {
            return Ok(SignUpOutcome::SignedIn(serde_json::from_value(body)?));
        }

        // Without a session GoTrue returns the user itself, or wraps it in `user`
        let user = match body.get("user") {
            Some(user) if user.is_object() => serde_json::from_value(user.clone())?,
            _ => serde_json::from_value(body)?,
        };
        Ok(SignUpOutcome::ConfirmationRequired(user))
    }

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.auth_url("logout")?;
        let response = self
            .request(reqwest::Method::POST, url, Some(access_token))?
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Get the user an access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Unauthorized` if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = self.auth_url("user")?;
        let response = self
            .request(reqwest::Method::GET, url, Some(access_token))?
            .send()
            .await?;
        let response = error_for_status(response).await?;
        parse_json(response).await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token was revoked or already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        let url = self.token_url("refresh_token")?;
        let response = self
            .request(reqwest::Method::POST, url, None)?
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        parse_json(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::test_support::*;
    use super::*;

    fn user_json() -> serde_json::Value {
        json!({
            "id": USER_ID,
            "aud": "authenticated",
            "role": "authenticated",
            "email": "mia@example.com",
            "user_metadata": {
                "username": "mia",
                "gender": "female",
                "style_preference": "minimalist",
                "email_verified": true
            }
        })
    }

    fn session_json() -> serde_json::Value {
        json!({
            "access_token": "new-access",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "new-refresh",
            "user": user_json()
        })
    }

    fn email() -> Email {
        Email::parse("mia@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_with_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", ANON_KEY))
            .and(body_json(json!({"email": "mia@example.com", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server).sign_in(&email(), "hunter22").await.unwrap();
        assert_eq!(session.access_token, "new-access");
        assert_eq!(session.user.id.to_string(), USER_ID);
        assert_eq!(session.user.user_metadata.gender(), Some(Gender::Female));
        assert_eq!(
            session.user.user_metadata.style_preference(),
            Some(StylePreference::Minimalist)
        );
    }

    #[tokio::test]
    async fn test_sign_in_bad_credentials_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = client(&server).sign_in(&email(), "wrong").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_sign_up_sends_metadata_and_requires_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_json(json!({
                "email": "mia@example.com",
                "password": "hunter22",
                "data": {"username": "mia", "gender": "female", "style_preference": "minimalist"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .expect(1)
            .mount(&server)
            .await;

        let metadata = UserMetadata {
            username: Some("mia".to_string()),
            gender: Some("female".to_string()),
            style_preference: Some("minimalist".to_string()),
        };
        let outcome = client(&server)
            .sign_up(&email(), "hunter22", &metadata)
            .await
            .unwrap();
        match outcome {
            SignUpOutcome::ConfirmationRequired(user) => {
                assert_eq!(user.email.as_deref(), Some("mia@example.com"));
            }
            SignUpOutcome::SignedIn(_) => panic!("expected confirmation to be required"),
        }
    }

    #[tokio::test]
    async fn test_sign_up_with_autoconfirm_signs_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
            .mount(&server)
            .await;

        let outcome = client(&server)
            .sign_up(&email(), "hunter22", &UserMetadata::default())
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(s) if s.refresh_token == "new-refresh"));
    }

    #[tokio::test]
    async fn test_get_user_and_sign_out_use_user_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let user = client.get_user(USER_TOKEN).await.unwrap();
        assert_eq!(user.user_metadata.username.as_deref(), Some("mia"));
        client.sign_out(USER_TOKEN).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({"refresh_token": "old-refresh"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server).refresh_session("old-refresh").await.unwrap();
        assert_eq!(session.expires_at, Some(1_900_000_000));
    }

    #[test]
    fn test_session_debug_redacts_tokens() {
        let session: AuthSession = serde_json::from_value(session_json()).unwrap();
        let debug_output = format!("{session:?}");
        assert!(!debug_output.contains("new-access"));
        assert!(!debug_output.contains("new-refresh"));
    }

    #[test]
    fn test_unknown_metadata_options_are_not_set() {
        let metadata = UserMetadata {
            username: None,
            gender: Some(String::new()),
            style_preference: Some("goth".to_string()),
        };
        assert!(metadata.gender().is_none());
        assert!(metadata.style_preference().is_none());
    }
}
