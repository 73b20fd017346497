//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in shopper in route handlers.
//! An expired access token is refreshed once per request; if the refresh is
//! rejected the shopper is signed out.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in shopper.
///
/// If the shopper is not signed in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the shopper is not signed in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// The user resolved for this request, cached so several extractors do not
/// refresh the same token twice.
#[derive(Clone)]
struct ResolvedUser(Option<CurrentUser>);

/// Load the session user, refreshing an expired token.
async fn resolve_user(parts: &mut Parts, state: &AppState) -> Option<CurrentUser> {
    if let Some(ResolvedUser(user)) = parts.extensions.get::<ResolvedUser>() {
        return user.clone();
    }

    let user = match parts.extensions.get::<Session>().cloned() {
        Some(session) => load_user(&session, state).await,
        None => None,
    };

    parts.extensions.insert(ResolvedUser(user.clone()));
    user
}

async fn load_user(session: &Session, state: &AppState) -> Option<CurrentUser> {
    let stored: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    if !stored.is_expired(chrono::Utc::now().timestamp()) {
        return Some(stored);
    }

    match state.supabase().refresh_if_expired(stored).await {
        Ok(user) => {
            if let Err(e) = set_current_user(session, &user).await {
                tracing::warn!(error = %e, "Failed to store refreshed session");
            }
            Some(user)
        }
        Err(e) => {
            tracing::info!(error = %e, "Session refresh rejected, signing out");
            if let Err(e) = clear_current_user(session).await {
                tracing::warn!(error = %e, "Failed to clear expired session");
            }
            None
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = resolve_user(parts, &state).await.ok_or_else(|| {
            // Check if this is an API request
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current shopper.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(resolve_user(parts, &state).await))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
