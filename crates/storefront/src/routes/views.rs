//! View types shared by the page handlers.
//!
//! Templates receive pre-formatted strings; no domain logic runs inside
//! askama.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::filters;
use crate::middleware::{Flash, FlashMessage, OptionalAuth};
use crate::models::{Cloth, CurrentUser};
use crate::state::AppState;

// =============================================================================
// Page Context
// =============================================================================

/// What the shared layout needs: who is signed in and the pending toasts.
///
/// Extracting it consumes the flash queue, so only handlers that render a
/// page should take it.
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<FlashMessage>,
}

impl PageContext {
    /// Whether a shopper is signed in.
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Name shown in the header.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user.as_ref().map_or("", CurrentUser::display_name)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        let flashes = match Flash::from_request_parts(parts, state).await {
            Ok(flash) => flash.take().await,
            Err(_) => Vec::new(),
        };
        Ok(Self { user, flashes })
    }
}

// =============================================================================
// Cloth Views
// =============================================================================

/// Catalog grid card.
#[derive(Debug, Clone)]
pub struct ClothCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category_label: &'static str,
    pub icon: &'static str,
    pub season: String,
}

impl From<&Cloth> for ClothCard {
    fn from(cloth: &Cloth) -> Self {
        Self {
            id: cloth.id.to_string(),
            name: cloth.name.clone(),
            price: cloth.price.display(),
            category_label: cloth.category.label(),
            icon: cloth.category.icon(),
            season: cloth.season_label().to_string(),
        }
    }
}

// =============================================================================
// Shared Pages
// =============================================================================

/// Shown instead of a member-only page when nobody is signed in.
#[derive(Template, WebTemplate)]
#[template(path = "sign_in_required.html")]
pub struct SignInRequiredTemplate {
    pub page: PageContext,
    pub title: &'static str,
    pub message: &'static str,
}

/// 404 page.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
    pub message: &'static str,
}
