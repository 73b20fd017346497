//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use stylefinder_core::UserId;

use crate::supabase::auth::{AuthSession, UserMetadata};

/// Seconds before the recorded expiry at which a token is treated as expired.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Session-stored user identity.
///
/// Holds the Supabase tokens so data calls run under the user's row-level
/// security policies. `Debug` is implemented manually to redact the tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Supabase auth user id.
    pub id: UserId,
    /// User's email address.
    pub email: String,
    /// Profile fields captured at registration.
    #[serde(default)]
    pub metadata: UserMetadata,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp after which `access_token` is no longer accepted.
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("metadata", &self.metadata)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl CurrentUser {
    /// Build the session identity from a fresh auth session.
    #[must_use]
    pub fn from_session(session: AuthSession) -> Self {
        let expires_at = session.expires_at.or_else(|| {
            session
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });

        Self {
            id: session.user.id,
            email: session.user.email.unwrap_or_default(),
            metadata: session.user.user_metadata,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at,
        }
    }

    /// Name shown in the header and on the profile page.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.metadata
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("User")
    }

    /// Uppercased first letter of the display name, for the avatar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Whether the access token has expired at unix time `now`.
    ///
    /// Sessions without a recorded expiry are never considered expired.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now >= expires_at - EXPIRY_LEEWAY_SECS)
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for pending flash messages.
    pub const FLASH: &str = "flash";
}
