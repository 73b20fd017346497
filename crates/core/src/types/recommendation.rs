//! Recommendation reasons.
//!
//! Reasons are display strings only. Popular picks get a random one; a detail
//! page view is logged with [`VIEW_REASON`].

use rand::Rng;
use rand::seq::IndexedRandom;

/// Reason stored when a signed-in shopper opens a detail page.
pub const VIEW_REASON: &str = "Viewed item details";

/// Shown in the history when a stored reason is empty.
pub const DEFAULT_REASON: &str = "Personalized pick";

/// Reasons attached to popular picks on the home page.
pub const POPULAR_REASONS: [&str; 5] = [
    "Recommended from your browsing history",
    "Trending style, selling fast",
    "New this season",
    "Loved by shoppers with a similar style",
    "Seasonal pick for the current weather",
];

/// Pick one of [`POPULAR_REASONS`] uniformly at random.
#[must_use]
pub fn random_reason<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    POPULAR_REASONS.choose(rng).copied().unwrap_or(DEFAULT_REASON)
}

/// The reason to display for a stored recommendation row.
#[must_use]
pub fn display_reason(stored: Option<&str>) -> &str {
    match stored.map(str::trim) {
        Some(reason) if !reason.is_empty() => reason,
        _ => DEFAULT_REASON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_reason_is_from_list() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(POPULAR_REASONS.contains(&random_reason(&mut rng)));
        }
    }

    #[test]
    fn test_display_reason_falls_back() {
        assert_eq!(display_reason(None), DEFAULT_REASON);
        assert_eq!(display_reason(Some("  ")), DEFAULT_REASON);
        assert_eq!(display_reason(Some(VIEW_REASON)), VIEW_REASON);
    }
}
