//! Read-only catalog commands.

use tracing::info;

use stylefinder_core::{CategoryFilter, ClothId};
use stylefinder_storefront::models::Cloth;
use stylefinder_storefront::supabase::distinct_clothes;

/// One line of the catalog listing.
fn summary_line(cloth: &Cloth) -> String {
    format!(
        "{:>6}  {:<12} {:<40} {}",
        cloth.id.as_i64(),
        cloth.category.label(),
        cloth.name,
        cloth.price.display()
    )
}

/// List the catalog, optionally restricted to one category.
///
/// # Errors
///
/// Returns an error if Supabase is not configured or the request fails.
pub async fn list(category: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let client = super::anon_client()?;

    let filter: CategoryFilter = category.unwrap_or_default().parse()?;
    let clothes = match &filter {
        CategoryFilter::All => client.get_all_clothes().await?,
        CategoryFilter::Only(category) => client.get_clothes_by_category(category).await?,
    };

    info!("Catalog ({}): {} items", filter.label(), clothes.len());
    for cloth in &clothes {
        info!("{}", summary_line(cloth));
    }
    Ok(())
}

/// Show every detail field of one cloth.
///
/// # Errors
///
/// Returns an error if the cloth does not exist or the request fails.
pub async fn show(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let client = super::anon_client()?;
    let cloth = client.get_cloth_by_id(ClothId::new(id)).await?;

    info!("{} (#{})", cloth.name, cloth.id);
    info!("  Category:    {}", cloth.category.label());
    info!("  Price:       {}", cloth.price.display());
    info!("  Season:      {}", cloth.season_label());
    info!("  Material:    {}", cloth.material_label().unwrap_or("-"));
    info!("  Sizes:       {}", cloth.size_options().join(", "));
    info!("  Colors:      {}", cloth.color_options().join(", "));
    if let Some(description) = &cloth.description {
        info!("  Description: {description}");
    }
    Ok(())
}

/// List the distinct clothes behind the latest popular recommendations.
///
/// # Errors
///
/// Returns an error if Supabase is not configured or the request fails.
pub async fn popular(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let client = super::anon_client()?;
    let rows = client.get_popular_recommendations(limit).await?;
    let clothes = distinct_clothes(rows);

    info!("Popular picks: {} items", clothes.len());
    for cloth in &clothes {
        info!("{}", summary_line(cloth));
    }
    Ok(())
}
