//! Profile fields collected at registration and kept in auth user metadata.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Self-reported gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Options offered on the registration form.
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    /// Value stored in user metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Preferred clothing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreference {
    Casual,
    Business,
    Sporty,
    Fashion,
    Vintage,
    Minimalist,
    Sweet,
    Streetwear,
}

impl StylePreference {
    /// Options offered on the registration form, in display order.
    pub const ALL: [Self; 8] = [
        Self::Casual,
        Self::Business,
        Self::Sporty,
        Self::Fashion,
        Self::Vintage,
        Self::Minimalist,
        Self::Sweet,
        Self::Streetwear,
    ];

    /// Value stored in user metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Business => "business",
            Self::Sporty => "sporty",
            Self::Fashion => "fashion",
            Self::Vintage => "vintage",
            Self::Minimalist => "minimalist",
            Self::Sweet => "sweet",
            Self::Streetwear => "streetwear",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Casual => "Casual",
            Self::Business => "Business",
            Self::Sporty => "Sporty",
            Self::Fashion => "Fashion",
            Self::Vintage => "Vintage",
            Self::Minimalist => "Minimalist",
            Self::Sweet => "Sweet",
            Self::Streetwear => "Streetwear",
        }
    }
}

impl FromStr for StylePreference {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| {
                style.as_str().eq_ignore_ascii_case(wanted) || style.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownOption(wanted.to_string()))
    }
}

impl fmt::Display for StylePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A form value that is not one of the offered options.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown option: {0}")]
pub struct UnknownOption(pub String);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("".parse::<Gender>().is_err());
    }

    #[test]
    fn test_style_parse_accepts_value_or_label() {
        assert_eq!(
            "streetwear".parse::<StylePreference>().unwrap(),
            StylePreference::Streetwear
        );
        assert_eq!(
            "Minimalist".parse::<StylePreference>().unwrap(),
            StylePreference::Minimalist
        );
        assert!("goth".parse::<StylePreference>().is_err());
    }

    #[test]
    fn test_style_options_are_unique() {
        let mut values: Vec<_> = StylePreference::ALL.iter().map(|s| s.as_str()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), StylePreference::ALL.len());
    }
}
