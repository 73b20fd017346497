//! Profile page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use stylefinder_core::{Gender, StylePreference, display_reason};

use super::views::PageContext;
use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Profile, Recommendation};
use crate::state::AppState;
use crate::supabase::SupabaseError;

const NOT_SET: &str = "Not set";

/// One entry of the view history.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub cloth_id: String,
    pub name: String,
    pub icon: &'static str,
    pub price: String,
    pub reason: String,
    pub viewed_on: String,
}

impl From<&Recommendation> for HistoryRow {
    fn from(row: &Recommendation) -> Self {
        let (name, icon, price) = row.cloth.as_ref().map_or_else(
            || ("Item no longer available".to_string(), "👕", String::new()),
            |cloth| (cloth.name.clone(), cloth.category.icon(), cloth.price.display()),
        );
        Self {
            cloth_id: row.cloth_id.to_string(),
            name,
            icon,
            price,
            reason: display_reason(row.reason.as_deref()).to_string(),
            viewed_on: row.viewed_on().unwrap_or_default().to_string(),
        }
    }
}

/// Fields shown in the profile card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub username: String,
    pub gender: &'static str,
    pub style_preference: &'static str,
}

impl ProfileFields {
    /// Metadata first, then the optional `profiles` row, then defaults.
    #[must_use]
    pub fn resolve(user: &CurrentUser, profile: Option<&Profile>) -> Self {
        let username = match user.metadata.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => profile
                .and_then(|p| p.username.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(user.display_name())
                .to_string(),
        };

        let gender = user
            .metadata
            .gender()
            .or_else(|| profile?.gender.as_deref()?.parse::<Gender>().ok())
            .map_or(NOT_SET, Gender::label);

        let style_preference = user
            .metadata
            .style_preference()
            .or_else(|| {
                profile?
                    .style_preference
                    .as_deref()?
                    .parse::<StylePreference>()
                    .ok()
            })
            .map_or(NOT_SET, StylePreference::label);

        Self {
            username,
            gender,
            style_preference,
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub initial: String,
    pub email: String,
    pub fields: ProfileFields,
    pub history: Vec<HistoryRow>,
    pub history_error: Option<String>,
}

/// Display the signed-in shopper's profile and view history.
///
/// The identity is re-read from Supabase so metadata changes show up; a
/// rejected session signs the shopper out.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    mut page: PageContext,
) -> Result<Response, AppError> {
    let supabase = state.supabase();

    let user = match supabase.get_current_user(user.clone()).await {
        Ok(fresh) => {
            set_current_user(&session, &fresh).await?;
            fresh
        }
        Err(SupabaseError::Unauthorized(message)) => {
            tracing::info!(%message, "Stored session rejected, signing out");
            clear_current_user(&session).await?;
            clear_sentry_user();
            return Ok(Redirect::to("/auth/login").into_response());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to refresh user, showing stored identity");
            user
        }
    };

    let profile = supabase
        .get_profile(&user.id, &user.access_token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load profile row");
            None
        });

    let (history, history_error) = match supabase
        .get_user_recommendations(&user.id, &user.access_token)
        .await
    {
        Ok(rows) => (rows.iter().map(HistoryRow::from).collect(), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load view history");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let fields = ProfileFields::resolve(&user, profile.as_ref());
    let template = ProfileTemplate {
        initial: user.initial(),
        email: user.email.clone(),
        fields,
        history,
        history_error,
        page: {
            page.user = Some(user);
            page
        },
    };
    Ok(template.into_response())
}
