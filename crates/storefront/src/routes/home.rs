//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use stylefinder_core::{CategoryFilter, random_reason};

use super::views::{ClothCard, PageContext};
use crate::filters;
use crate::models::Cloth;
use crate::state::AppState;
use crate::supabase::distinct_clothes;

/// Number of logged views read for the popular picks.
const POPULAR_LIMIT: usize = 6;

/// Query parameters of the home page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub category: Option<String>,
}

/// Category tab above the catalog grid.
#[derive(Debug, Clone)]
pub struct FilterTab {
    pub value: String,
    pub label: &'static str,
    pub active: bool,
}

/// A popular pick with its cosmetic reason.
#[derive(Debug, Clone)]
pub struct PopularPick {
    pub card: ClothCard,
    pub reason: &'static str,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub tabs: Vec<FilterTab>,
    /// Query value of the selected tab, for the retry link.
    pub selected: String,
    pub clothes: Vec<ClothCard>,
    /// Set when the catalog could not be loaded.
    pub catalog_error: Option<String>,
    pub popular: Vec<PopularPick>,
}

fn filter_tabs(selected: &CategoryFilter) -> Vec<FilterTab> {
    CategoryFilter::options()
        .into_iter()
        .map(|option| FilterTab {
            value: option.as_str().to_string(),
            label: option.label(),
            active: &option == selected,
        })
        .collect()
}

fn popular_picks(clothes: &[Cloth]) -> Vec<PopularPick> {
    let mut rng = rand::rng();
    clothes
        .iter()
        .map(|cloth| PopularPick {
            card: ClothCard::from(cloth),
            reason: random_reason(&mut rng),
        })
        .collect()
}

/// Display the home page: category filter, catalog grid and popular picks.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let filter: CategoryFilter = query
        .category
        .as_deref()
        .unwrap_or_default()
        .parse()
        .unwrap_or_default();

    let catalog = match &filter {
        CategoryFilter::All => state.supabase().get_all_clothes().await,
        CategoryFilter::Only(category) => state.supabase().get_clothes_by_category(category).await,
    };
    let (clothes, catalog_error) = match catalog {
        Ok(clothes) => (clothes.iter().map(ClothCard::from).collect(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load catalog");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let popular = match state
        .supabase()
        .get_popular_recommendations(POPULAR_LIMIT)
        .await
    {
        Ok(rows) => popular_picks(&distinct_clothes(rows)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load popular picks");
            Vec::new()
        }
    };

    HomeTemplate {
        page,
        tabs: filter_tabs(&filter),
        selected: filter.as_str().to_string(),
        clothes,
        catalog_error,
        popular,
    }
}
