//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (?category=all|women|men|kids|accessories)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (Supabase configured)
//!
//! # Catalog
//! GET  /clothes/{id}           - Cloth detail (logs a view when signed in)
//!
//! # Cart (requires auth for mutations)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Update quantity
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Clear cart
//! POST /checkout               - Not available, flashes a notice
//!
//! # Favorites
//! GET  /favorites              - Favorites page
//! POST /favorites/add          - Favorite a cloth
//! POST /favorites/remove       - Unfavorite a cloth
//!
//! # Account
//! GET  /profile                - Profile and view history
//!
//! # Auth (form posts are rate limited)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod clothes;
pub mod favorites;
pub mod home;
pub mod profile;
pub mod views;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;
use views::{NotFoundTemplate, PageContext};

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let forms = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(forms)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::show))
        .route("/add", post(favorites::add))
        .route("/remove", post(favorites::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Health checks
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Catalog
        .route("/clothes/{id}", get(clothes::show))
        // Cart routes
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        // Favorites
        .nest("/favorites", favorite_routes())
        // Account
        .route("/profile", get(profile::show))
        // Auth routes
        .nest("/auth", auth_routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable while Supabase is not configured.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.supabase().is_configured() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Fallback for unknown paths.
async fn not_found(page: PageContext) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page,
            message: "Page not found",
        },
    )
        .into_response()
}
