//! Catalog categories and the comma-separated option columns.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Catalog category stored in `clothes.category`.
///
/// The four known categories drive the home page filter; anything else the
/// catalog contains is kept verbatim and shown as generic clothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Women,
    Men,
    Kids,
    Accessories,
    Other(String),
}

impl Category {
    /// Categories offered by the home page filter, in display order.
    pub const FILTERABLE: [Self; 4] = [Self::Women, Self::Men, Self::Kids, Self::Accessories];

    /// Parse the stored column value. Never fails.
    #[must_use]
    pub fn from_column(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "women" => Self::Women,
            "men" => Self::Men,
            "kids" => Self::Kids,
            "accessories" => Self::Accessories,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    /// The value stored in the `category` column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Women => "women",
            Self::Men => "men",
            Self::Kids => "kids",
            Self::Accessories => "accessories",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Women => "Women",
            Self::Men => "Men",
            Self::Kids => "Kids",
            Self::Accessories => "Accessories",
            Self::Other(_) => "Clothing",
        }
    }

    /// Placeholder artwork used instead of product photos.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Women => "👗",
            Self::Men => "👔",
            Self::Kids => "👶",
            Self::Accessories => "👜",
            Self::Other(_) => "👕",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(|| Self::Other(String::new()), |s| Self::from_column(&s)))
    }
}

/// Home page category selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// The query-string value for this filter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.as_str(),
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(category) => category.label(),
        }
    }

    /// Whether a cloth in `category` passes the filter.
    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }

    /// Every option shown on the home page: `All` followed by the known categories.
    #[must_use]
    pub fn options() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(Category::FILTERABLE.into_iter().map(Self::Only))
            .collect()
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    /// Empty and `all` select everything; any other value filters on it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(Category::from_column(s)))
        }
    }
}

/// Split a comma-separated `sizes`/`colors` column into display options.
///
/// ```
/// use stylefinder_core::split_options;
///
/// assert_eq!(split_options("S, M ,L,,"), vec!["S", "M", "L"]);
/// assert!(split_options("").is_empty());
/// ```
#[must_use]
pub fn split_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_column_known_and_unknown() {
        assert_eq!(Category::from_column("Women"), Category::Women);
        assert_eq!(Category::from_column(" kids "), Category::Kids);
        assert_eq!(
            Category::from_column("shoes"),
            Category::Other("shoes".to_string())
        );
    }

    #[test]
    fn test_labels_and_icons() {
        assert_eq!(Category::Men.label(), "Men");
        assert_eq!(Category::Accessories.icon(), "👜");
        assert_eq!(Category::Other("hats".into()).label(), "Clothing");
        assert_eq!(Category::Other("hats".into()).icon(), "👕");
    }

    #[test]
    fn test_serde_uses_column_value() {
        let json = serde_json::to_string(&Category::Accessories).unwrap();
        assert_eq!(json, "\"accessories\"");
        let parsed: Category = serde_json::from_str("\"men\"").unwrap();
        assert_eq!(parsed, Category::Men);
        let missing: Category = serde_json::from_str("null").unwrap();
        assert_eq!(missing.label(), "Clothing");
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "women".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Women)
        );
    }

    #[test]
    fn test_filter_matches() {
        let men = CategoryFilter::Only(Category::Men);
        assert!(men.matches(&Category::Men));
        assert!(!men.matches(&Category::Women));
        assert!(CategoryFilter::All.matches(&Category::Other("x".into())));
    }

    #[test]
    fn test_filter_options_order() {
        let labels: Vec<_> = CategoryFilter::options()
            .iter()
            .map(CategoryFilter::label)
            .collect();
        assert_eq!(labels, ["All", "Women", "Men", "Kids", "Accessories"]);
    }
}
