//! Authentication route handlers.
//!
//! Handles sign in, registration and sign out against Supabase auth.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use stylefinder_core::{Email, Gender, StylePreference};

use super::views::PageContext;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Flash, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;
use crate::supabase::{AuthSession, SignUpOutcome, UserMetadata};

/// Supabase rejects shorter passwords by default.
const MIN_PASSWORD_LENGTH: usize = 6;

const REGISTERED_MESSAGE: &str =
    "Registration successful! Check your email for a verification link.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub gender: Option<String>,
    pub style_preference: Option<String>,
}

impl RegisterForm {
    /// Metadata stored with the new auth user. Unknown options are dropped.
    fn metadata(&self) -> UserMetadata {
        UserMetadata {
            username: self
                .username
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from),
            gender: self
                .gender
                .as_deref()
                .and_then(|g| g.parse::<Gender>().ok())
                .map(|g| g.as_str().to_string()),
            style_preference: self
                .style_preference
                .as_deref()
                .and_then(|s| s.parse::<StylePreference>().ok())
                .map(|s| s.as_str().to_string()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub email: String,
    pub username: String,
    pub genders: Vec<SelectOption>,
    pub styles: Vec<SelectOption>,
    pub error: Option<String>,
}

impl RegisterTemplate {
    fn new(page: PageContext, metadata: &UserMetadata) -> Self {
        let gender = metadata.gender();
        let style = metadata.style_preference();
        Self {
            page,
            email: String::new(),
            username: metadata.username.clone().unwrap_or_default(),
            genders: Gender::ALL
                .into_iter()
                .map(|g| SelectOption {
                    value: g.as_str(),
                    label: g.label(),
                    selected: gender == Some(g),
                })
                .collect(),
            styles: StylePreference::ALL
                .into_iter()
                .map(|s| SelectOption {
                    value: s.as_str(),
                    label: s.label(),
                    selected: style == Some(s),
                })
                .collect(),
            error: None,
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Store a fresh Supabase session as the signed-in user.
async fn sign_in_session(
    session: &Session,
    auth: AuthSession,
) -> Result<CurrentUser, tower_sessions::session::Error> {
    let user = CurrentUser::from_session(auth);
    // New identity, new session id
    session.cycle_id().await?;
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));
    Ok(user)
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(page: PageContext) -> impl IntoResponse {
    LoginTemplate {
        page,
        email: String::new(),
        error: None,
        success: None,
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    flash: Flash,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Response {
    let failed = |page: PageContext, email: String, error: String| {
        LoginTemplate {
            page,
            email,
            error: Some(error),
            success: None,
        }
        .into_response()
    };

    let Ok(email) = Email::parse(&form.email) else {
        return failed(page, form.email, "Please enter a valid email address".to_string());
    };

    match state.supabase().sign_in(&email, &form.password).await {
        Ok(auth) => match sign_in_session(&session, auth).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User signed in");
                flash
                    .success(format!("Welcome back, {}!", user.display_name()))
                    .await;
                Redirect::to("/").into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store session");
                failed(page, form.email, "Could not sign you in, please try again".to_string())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            failed(page, form.email, e.user_message())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(page: PageContext) -> impl IntoResponse {
    RegisterTemplate::new(page, &UserMetadata::default())
}

/// Handle registration form submission.
///
/// When the project requires email confirmation the shopper lands on the
/// login page with a notice; otherwise they are signed in right away.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    flash: Flash,
    page: PageContext,
    Form(form): Form<RegisterForm>,
) -> Response {
    let metadata = form.metadata();
    let failed = |page: PageContext, error: String| {
        let mut template = RegisterTemplate::new(page, &metadata);
        template.email.clone_from(&form.email);
        template.error = Some(error);
        template.into_response()
    };

    let Ok(email) = Email::parse(&form.email) else {
        return failed(page, "Please enter a valid email address".to_string());
    };
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return failed(
            page,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }

    match state
        .supabase()
        .sign_up(&email, &form.password, &metadata)
        .await
    {
        Ok(SignUpOutcome::SignedIn(auth)) => match sign_in_session(&session, auth).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User registered and signed in");
                flash
                    .success(format!("Welcome, {}!", user.display_name()))
                    .await;
                Redirect::to("/").into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store session");
                failed(page, "Could not sign you in, please try again".to_string())
            }
        },
        Ok(SignUpOutcome::ConfirmationRequired(user)) => {
            tracing::info!(user_id = %user.id, "User registered, awaiting confirmation");
            LoginTemplate {
                page,
                email: form.email.clone(),
                error: None,
                success: Some(REGISTERED_MESSAGE.to_string()),
            }
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            failed(page, e.user_message())
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Revokes the Supabase session (best effort) and destroys the local one.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
    {
        if let Err(e) = state.supabase().sign_out(&user.access_token).await {
            tracing::warn!(error = %e, "Failed to revoke Supabase session");
        }
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}
