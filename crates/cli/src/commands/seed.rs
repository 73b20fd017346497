//! Seed the catalog from a YAML file.
//!
//! The file is a list of clothes:
//!
//! ```yaml
//! - name: Wool Coat
//!   price: 899
//!   category: women
//!   description: Double-breasted, knee length
//!   sizes: [S, M, L]
//!   colors: [camel, black]
//!   season: Winter
//!   material: Wool
//! ```
//!
//! Everything is validated before the first request. Writes use the service
//! role key because the catalog is read-only for the anonymous key.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use stylefinder_core::price::{deserialize_amount, serialize_amount};
use stylefinder_core::{Category, Price};
use stylefinder_storefront::supabase::Table;

/// One cloth as written in the seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCloth {
    pub name: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub price: Price,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
}

/// Row inserted into `clothes`.
#[derive(Debug, Serialize)]
struct NewCloth<'a> {
    name: &'a str,
    #[serde(serialize_with = "serialize_amount")]
    price: Price,
    category: &'a Category,
    description: Option<&'a str>,
    sizes: Option<String>,
    colors: Option<String>,
    season: Option<&'a str>,
    material: Option<&'a str>,
}

impl<'a> From<&'a SeedCloth> for NewCloth<'a> {
    fn from(cloth: &'a SeedCloth) -> Self {
        let join = |options: &[String]| {
            (!options.is_empty()).then(|| {
                options
                    .iter()
                    .map(|o| o.trim())
                    .collect::<Vec<_>>()
                    .join(",")
            })
        };
        Self {
            name: cloth.name.trim(),
            price: cloth.price,
            category: &cloth.category,
            description: cloth.description.as_deref(),
            sizes: join(&cloth.sizes),
            colors: join(&cloth.colors),
            season: cloth.season.as_deref(),
            material: cloth.material.as_deref(),
        }
    }
}

/// Check a parsed seed file, returning one message per problem.
#[must_use]
pub fn validate(clothes: &[SeedCloth]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, cloth) in clothes.iter().enumerate() {
        let entry = index + 1;
        if cloth.name.trim().is_empty() {
            errors.push(format!("entry {entry}: name is empty"));
        }
        if cloth.category.as_str().is_empty() {
            errors.push(format!("entry {entry}: category is empty"));
        }
        for (field, options) in [("sizes", &cloth.sizes), ("colors", &cloth.colors)] {
            if options.iter().any(|o| o.trim().is_empty() || o.contains(',')) {
                errors.push(format!(
                    "entry {entry}: {field} must be non-empty values without commas"
                ));
            }
        }
    }

    errors
}

/// Parse a seed file's contents.
///
/// # Errors
///
/// Returns the YAML error for malformed input.
pub fn parse(content: &str) -> Result<Vec<SeedCloth>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Insert clothes from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, the service role key
/// is not set, or the insert fails.
pub async fn clothes(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading clothes from file");

    // Read and validate YAML before talking to Supabase
    let content = tokio::fs::read_to_string(path).await?;
    let clothes = parse(&content)?;

    info!(clothes = clothes.len(), "Parsed seed file");

    let errors = validate(&clothes);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    if clothes.is_empty() {
        info!("Nothing to insert");
        return Ok(());
    }

    let client = super::service_client()?;
    let rows: Vec<NewCloth<'_>> = clothes.iter().map(NewCloth::from).collect();
    client.from(Table::Clothes).insert(&rows).await?;

    info!("Seeding complete!");
    info!("  Clothes inserted: {}", rows.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
- name: Wool Coat
  price: 899
  category: women
  sizes: [S, M, L]
  colors: [camel]
  season: Winter
- name: Canvas Tote
  price: '59.90'
  category: accessories
";

    #[test]
    fn test_parse_and_validate() {
        let clothes = parse(SEED).unwrap();
        assert_eq!(clothes.len(), 2);
        assert_eq!(clothes[0].category, Category::Women);
        assert_eq!(clothes[1].price.display(), "¥59.90");
        assert!(validate(&clothes).is_empty());
    }

    #[test]
    fn test_insert_row_joins_options() {
        let clothes = parse(SEED).unwrap();
        let row = serde_json::to_value(NewCloth::from(&clothes[0])).unwrap();

        assert_eq!(row["sizes"], "S,M,L");
        assert_eq!(row["colors"], "camel");
        assert_eq!(row["price"], "899");
        assert_eq!(row["category"], "women");

        let tote = serde_json::to_value(NewCloth::from(&clothes[1])).unwrap();
        assert!(tote["sizes"].is_null());
    }

    #[test]
    fn test_validation_reports_each_problem() {
        let clothes = parse(
            r"
- name: ' '
  price: 10
  category: men
  sizes: ['S,M']
",
        )
        .unwrap();

        let errors = validate(&clothes);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("name is empty"));
        assert!(errors[1].contains("sizes"));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        assert!(parse("- {name: Sock, price: -1, category: kids}").is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(parse("- {name: Sock, price: 1, category: kids, stock: 3}").is_err());
    }
}
