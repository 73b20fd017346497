//! Cart route handlers.
//!
//! Every mutation is a form post that redirects back to a page; the result
//! is reported through a flash message and the page re-reads the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use stylefinder_core::{CartItemId, CartLine, CartTotals, ClothId};

use super::views::{PageContext, SignInRequiredTemplate};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{Flash, RequireAuth};
use crate::models::{CartItem, NewCartItem};
use crate::state::AppState;

/// Cart row display data for templates.
#[derive(Debug, Clone)]
pub struct CartRowView {
    pub id: String,
    pub cloth_id: String,
    pub name: String,
    pub icon: &'static str,
    /// `Size: M | Color: Red`, empty when neither is set
    pub options: String,
    pub unit_price: String,
    pub line_price: String,
    pub quantity: u32,
    /// The referenced cloth no longer exists.
    pub unavailable: bool,
}

impl CartRowView {
    /// Quantity after pressing minus.
    #[must_use]
    pub const fn decrement(&self) -> u32 {
        self.quantity.saturating_sub(1)
    }

    /// Quantity after pressing plus.
    #[must_use]
    pub const fn increment(&self) -> u32 {
        self.quantity.saturating_add(1)
    }
}

impl From<&CartItem> for CartRowView {
    fn from(item: &CartItem) -> Self {
        let options = [
            item.size.as_deref().map(|s| format!("Size: {s}")),
            item.color.as_deref().map(|c| format!("Color: {c}")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" | ");

        match &item.cloth {
            Some(cloth) => Self {
                id: item.id.to_string(),
                cloth_id: item.cloth_id.to_string(),
                name: cloth.name.clone(),
                icon: cloth.category.icon(),
                options,
                unit_price: cloth.price.display(),
                line_price: cloth.price.times(item.quantity).display(),
                quantity: item.quantity,
                unavailable: false,
            },
            None => Self {
                id: item.id.to_string(),
                cloth_id: item.cloth_id.to_string(),
                name: "Item no longer available".to_string(),
                icon: "👕",
                options,
                unit_price: String::new(),
                line_price: String::new(),
                quantity: item.quantity,
                unavailable: true,
            },
        }
    }
}

/// Totals over the rows that still reference a cloth.
fn cart_totals(items: &[CartItem]) -> CartTotals {
    CartTotals::from_lines(items.iter().filter_map(|item| {
        item.cloth
            .as_ref()
            .map(|cloth| CartLine::new(cloth.price, item.quantity))
    }))
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub rows: Vec<CartRowView>,
    pub item_count: u32,
    pub subtotal: String,
    pub total: String,
    pub load_error: Option<String>,
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub cloth_id: ClothId,
    pub size: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quantity: Option<u32>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove item form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Clear cart form data. `confirm` must be `yes`.
#[derive(Debug, Deserialize)]
pub struct ClearCartForm {
    pub confirm: Option<String>,
}

/// A cleared number input arrives as `quantity=`; treat it as not given.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Empty select options arrive as empty strings.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, page))]
pub async fn show(State(state): State<AppState>, page: PageContext) -> Response {
    let Some(user) = page.user.clone() else {
        return SignInRequiredTemplate {
            page,
            title: "Your cart",
            message: "Please sign in to view your cart",
        }
        .into_response();
    };

    let (items, load_error) = match state
        .supabase()
        .get_user_cart(&user.id, &user.access_token)
        .await
    {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load cart");
            (Vec::new(), Some(format!("Failed to load cart: {}", e.user_message())))
        }
    };

    let totals = cart_totals(&items);
    CartTemplate {
        page,
        rows: items.iter().map(CartRowView::from).collect(),
        item_count: totals.item_count,
        subtotal: totals.subtotal.display(),
        total: totals.total().display(),
        load_error,
    }
    .into_response()
}

/// Add a cloth to the cart and return to its detail page.
#[instrument(skip(state, user, flash))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let item = NewCartItem {
        user_id: user.id,
        cloth_id: form.cloth_id,
        size: non_blank(form.size),
        color: non_blank(form.color),
        quantity: form.quantity.unwrap_or(1),
    };

    match state
        .supabase()
        .add_to_cart(&item, &user.access_token)
        .await
    {
        Ok(()) => {
            add_breadcrumb("cart", "Added to cart", None);
            flash.success("Added to cart").await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add to cart");
            flash
                .error(format!("Failed to add to cart: {}", e.user_message()))
                .await;
        }
    }

    Redirect::to(&format!("/clothes/{}", form.cloth_id))
}

/// Change the quantity of a cart row. Quantities below one are ignored.
#[instrument(skip(state, user, flash))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    if form.quantity < 1 {
        return Redirect::to("/cart");
    }

    match state
        .supabase()
        .update_cart_item(&user.id, form.item_id, form.quantity, &user.access_token)
        .await
    {
        Ok(()) => flash.success("Quantity updated").await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update cart item");
            flash.error("Update failed").await;
        }
    }

    Redirect::to("/cart")
}

/// Remove a cart row.
#[instrument(skip(state, user, flash))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    match state
        .supabase()
        .remove_from_cart(&user.id, form.item_id, &user.access_token)
        .await
    {
        Ok(()) => flash.info("Removed from cart").await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to remove cart item");
            flash.error("Remove failed").await;
        }
    }

    Redirect::to("/cart")
}

/// Empty the cart after the shopper ticked the confirmation box.
#[instrument(skip(state, user, flash))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<ClearCartForm>,
) -> Redirect {
    if form.confirm.as_deref() != Some("yes") {
        flash.info("Tick the box to confirm clearing your cart").await;
        return Redirect::to("/cart");
    }

    match state
        .supabase()
        .clear_cart(&user.id, &user.access_token)
        .await
    {
        Ok(()) => flash.info("Cart cleared").await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to clear cart");
            flash.error("Clear failed").await;
        }
    }

    Redirect::to("/cart")
}

/// Checkout is not implemented; the button only explains that.
#[instrument(skip_all)]
pub async fn checkout(RequireAuth(_user): RequireAuth, flash: Flash) -> impl IntoResponse {
    flash.info("Checkout is not available yet").await;
    Redirect::to("/cart")
}
