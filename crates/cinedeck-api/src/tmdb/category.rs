//! Fixed set of paginated movie listings.

use std::fmt;
use std::str::FromStr;

/// A paginated TMDB movie listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `movie/top_rated`.
    TopRated,
    /// `movie/upcoming`.
    Upcoming,
    /// `movie/now_playing`.
    NowPlaying,
    /// `movie/popular`.
    Popular,
}

impl Category {
    /// All categories in home-screen order.
    pub const ALL: [Self; 4] = [Self::TopRated, Self::Upcoming, Self::NowPlaying, Self::Popular];

    /// URL slug (e.g. `top-rated`).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::TopRated => "top-rated",
            Self::Upcoming => "upcoming",
            Self::NowPlaying => "now-playing",
            Self::Popular => "popular",
        }
    }

    /// Endpoint path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::TopRated => "movie/top_rated",
            Self::Upcoming => "movie/upcoming",
            Self::NowPlaying => "movie/now_playing",
            Self::Popular => "movie/popular",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when a slug names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0} (expected one of top-rated, upcoming, now-playing, popular)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| ParseCategoryError(String::from(s)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_all_slugs() {
        // Arrange & Act & Assert
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_unknown_slug() {
        // Arrange & Act
        let result = "trending".parse::<Category>();

        // Assert
        assert_eq!(result, Err(ParseCategoryError(String::from("trending"))));
    }

    #[test]
    fn test_endpoint_paths() {
        // Arrange & Act & Assert
        assert_eq!(Category::TopRated.path(), "movie/top_rated");
        assert_eq!(Category::NowPlaying.path(), "movie/now_playing");
        assert_eq!(Category::NowPlaying.to_string(), "now-playing");
    }
}
