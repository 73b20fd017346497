//! Cloth detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use stylefinder_core::{ClothId, VIEW_REASON};

use super::views::{ClothCard, NotFoundTemplate, PageContext};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::models::{Cloth, CurrentUser};
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Number of same-category items shown under the detail.
const SIMILAR_LIMIT: usize = 3;

const NOT_FOUND_MESSAGE: &str = "Item not found";

/// Detail fields of one cloth.
#[derive(Debug, Clone)]
pub struct ClothDetail {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category_label: &'static str,
    pub icon: &'static str,
    pub season: String,
    pub material: Option<String>,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
}

impl From<&Cloth> for ClothDetail {
    fn from(cloth: &Cloth) -> Self {
        Self {
            id: cloth.id.to_string(),
            name: cloth.name.clone(),
            price: cloth.price.display(),
            category_label: cloth.category.label(),
            icon: cloth.category.icon(),
            season: cloth.season_label().to_string(),
            material: cloth.material_label().map(String::from),
            description: cloth
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            sizes: cloth.size_options(),
            colors: cloth.color_options(),
        }
    }
}

/// Cloth detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "clothes/show.html")]
pub struct ClothTemplate {
    pub page: PageContext,
    pub cloth: ClothDetail,
    pub similar: Vec<ClothCard>,
    pub is_favorite: bool,
    /// The view was logged to the shopper's history.
    pub view_recorded: bool,
}

/// Up to [`SIMILAR_LIMIT`] other clothes of the same category.
fn similar_clothes(cloth: &Cloth, same_category: &[Cloth]) -> Vec<ClothCard> {
    same_category
        .iter()
        .filter(|other| other.id != cloth.id)
        .take(SIMILAR_LIMIT)
        .map(ClothCard::from)
        .collect()
}

/// Log the view and read the favorite flag for a signed-in shopper.
///
/// Both are best effort; failures are logged and the page still renders.
async fn member_extras(state: &AppState, user: &CurrentUser, cloth_id: ClothId) -> (bool, bool) {
    let supabase = state.supabase();

    let view_recorded = match supabase
        .add_recommendation(&user.id, cloth_id, VIEW_REASON, &user.access_token)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to record view");
            false
        }
    };

    let is_favorite = supabase
        .is_favorite(&user.id, cloth_id, &user.access_token)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read favorite state");
            false
        });

    (view_recorded, is_favorite)
}

/// Display a cloth.
///
/// Unknown and malformed ids render the 404 page.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(cloth_id) = id.parse::<ClothId>() else {
        return Ok(not_found(page));
    };

    let cloth = match state.supabase().get_cloth_by_id(cloth_id).await {
        Ok(cloth) => cloth,
        Err(SupabaseError::NotFound(_)) => return Ok(not_found(page)),
        Err(e) => return Err(e.into()),
    };

    let similar = state
        .supabase()
        .get_clothes_by_category(&cloth.category)
        .await
        .map_or_else(
            |e| {
                tracing::warn!(error = %e, "Failed to load similar clothes");
                Vec::new()
            },
            |same| similar_clothes(&cloth, &same),
        );

    let (view_recorded, is_favorite) = match &page.user {
        Some(user) => {
            add_breadcrumb("catalog", "Viewed cloth", Some(&[("cloth_id", id.as_str())][..]));
            member_extras(&state, user, cloth_id).await
        }
        None => (false, false),
    };

    Ok(ClothTemplate {
        page,
        cloth: ClothDetail::from(&cloth),
        similar,
        is_favorite,
        view_recorded,
    }
    .into_response())
}

fn not_found(page: PageContext) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page,
            message: NOT_FOUND_MESSAGE,
        },
    )
        .into_response()
}
