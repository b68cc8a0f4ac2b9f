//! TMDB API response types.

use serde::{Deserialize, Serialize};

// --- Movie listings ---

/// Response from the paginated `movie/{category}` endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoviePage {
    /// Current page number.
    pub page: u32,
    /// Movies on this page.
    pub results: Vec<Movie>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A movie record as returned by listings (and reduced from details).
///
/// Serializable so it can be stored verbatim in the favorites snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path fragment.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Genre IDs (listings only).
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Genres (details only).
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Runtime in minutes (details only).
    #[serde(default)]
    pub runtime: Option<u32>,
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- Movie details ---

/// Response from `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    pub original_title: Option<String>,
    /// Original language (ISO 639-1).
    pub original_language: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Poster image path fragment.
    pub poster_path: Option<String>,
    /// Backdrop image path fragment.
    pub backdrop_path: Option<String>,
    /// Release date.
    pub release_date: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Release status (e.g. "Released").
    pub status: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// IMDb ID.
    pub imdb_id: Option<String>,
}

impl From<MovieDetails> for Movie {
    fn from(d: MovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            original_title: d.original_title,
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            vote_average: d.vote_average,
            release_date: d.release_date,
            genre_ids: d.genres.iter().map(|g| g.id).collect(),
            genres: d.genres,
            runtime: d.runtime,
        }
    }
}

// --- Authentication ---

/// Response from `authentication/token/new` and
/// `authentication/token/validate_with_login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestToken {
    /// Success flag.
    #[serde(default)]
    pub success: bool,
    /// Request token (absent on failure).
    #[serde(default)]
    pub request_token: Option<String>,
    /// Expiry timestamp as reported by TMDB.
    #[serde(default)]
    pub expires_at: Option<String>,
    /// Failure message, when `success` is false.
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Response from `authentication/session/new`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionResponse {
    /// Success flag.
    #[serde(default)]
    pub success: bool,
    /// Session ID (absent on failure).
    #[serde(default)]
    pub session_id: Option<String>,
    /// Failure message, when `success` is false.
    #[serde(default)]
    pub status_message: Option<String>,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_top_rated_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_top_rated_page1.json");

        // Act
        let page: MoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 10);
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.results[0].id, 238);
        assert_eq!(page.results[0].title, "The Godfather");
        assert_eq!(page.results[0].genre_ids, vec![18, 80]);
        assert!(page.results[0].genres.is_empty());
    }

    #[test]
    fn test_parse_movie_details_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_details_238.json");

        // Act
        let details: MovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(details.id, 238);
        assert_eq!(details.runtime, Some(175));
        assert_eq!(details.genres.len(), 2);
        assert_eq!(details.genres[0].name, "Drama");
    }

    #[test]
    fn test_details_into_movie_keeps_genres() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/movie_details_238.json");
        let details: MovieDetails = serde_json::from_str(json).unwrap();

        // Act
        let movie = Movie::from(details);

        // Assert
        assert_eq!(movie.id, 238);
        assert_eq!(movie.genre_ids, vec![18, 80]);
        assert_eq!(movie.runtime, Some(175));
    }

    #[test]
    fn test_movie_snapshot_roundtrip_with_missing_fields() {
        // Arrange
        let json = r#"{"id":42,"title":"X"}"#;

        // Act
        let movie: Movie = serde_json::from_str(json).unwrap();
        let back: Movie = serde_json::from_str(&serde_json::to_string(&movie).unwrap()).unwrap();

        // Assert
        assert_eq!(movie.id, 42);
        assert!(movie.poster_path.is_none());
        assert_eq!(back, movie);
    }

    #[test]
    fn test_parse_failed_token_response() {
        // Arrange
        let json = r#"{"success":false,"status_code":30,"status_message":"Invalid username and/or password: You did not provide a valid login."}"#;

        // Act
        let token: RequestToken = serde_json::from_str(json).unwrap();

        // Assert
        assert!(!token.success);
        assert!(token.request_token.is_none());
        assert!(token.status_message.unwrap().contains("Invalid username"));
    }
}
