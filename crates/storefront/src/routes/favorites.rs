//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use stylefinder_core::ClothId;

use super::views::{ClothCard, PageContext, SignInRequiredTemplate};
use crate::filters;
use crate::middleware::{Flash, RequireAuth};
use crate::models::FavoriteItem;
use crate::state::AppState;

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub page: PageContext,
    pub items: Vec<ClothCard>,
    pub load_error: Option<String>,
}

/// Favorite toggle form data.
#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub cloth_id: ClothId,
    /// Where to go afterwards; only local paths are honored.
    pub return_to: Option<String>,
}

impl FavoriteForm {
    fn redirect(&self) -> Redirect {
        match self.return_to.as_deref() {
            Some(path) if is_local_path(path) => Redirect::to(path),
            _ => Redirect::to(&format!("/clothes/{}", self.cloth_id)),
        }
    }
}

/// A path on this site. Browsers treat `//host` and `/\host` as another origin.
fn is_local_path(path: &str) -> bool {
    let mut bytes = path.bytes();
    bytes.next() == Some(b'/') && !matches!(bytes.next(), Some(b'/' | b'\\'))
}

/// Cards for favorites whose cloth still exists.
fn favorite_cards(items: &[FavoriteItem]) -> Vec<ClothCard> {
    items
        .iter()
        .filter_map(|item| item.cloth.as_ref())
        .map(ClothCard::from)
        .collect()
}

/// Display the favorites page.
#[instrument(skip(state, page))]
pub async fn show(State(state): State<AppState>, page: PageContext) -> Response {
    let Some(user) = page.user.clone() else {
        return SignInRequiredTemplate {
            page,
            title: "Your favorites",
            message: "Please sign in to view your favorites",
        }
        .into_response();
    };

    let (items, load_error) = match state
        .supabase()
        .get_user_favorites(&user.id, &user.access_token)
        .await
    {
        Ok(items) => (favorite_cards(&items), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load favorites");
            (
                Vec::new(),
                Some(format!("Failed to load favorites: {}", e.user_message())),
            )
        }
    };

    FavoritesTemplate {
        page,
        items,
        load_error,
    }
    .into_response()
}

/// Favorite a cloth.
#[instrument(skip(state, user, flash))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<FavoriteForm>,
) -> Redirect {
    match state
        .supabase()
        .add_to_favorites(&user.id, form.cloth_id, &user.access_token)
        .await
    {
        Ok(()) => flash.success("Added to favorites").await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add favorite");
            flash.error("Could not add to favorites").await;
        }
    }

    form.redirect()
}

/// Unfavorite a cloth.
#[instrument(skip(state, user, flash))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<FavoriteForm>,
) -> Redirect {
    match state
        .supabase()
        .remove_from_favorites(&user.id, form.cloth_id, &user.access_token)
        .await
    {
        Ok(()) => flash.info("Removed from favorites").await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to remove favorite");
            flash.error("Could not remove from favorites").await;
        }
    }

    form.redirect()
}
