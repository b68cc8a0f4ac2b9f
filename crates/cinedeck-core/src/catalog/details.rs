//! Single movie details.

use cinedeck_api::tmdb::{ApiError, LocalCatalogApi, MovieDetails};
use tracing::instrument;

use crate::CoreError;
use crate::locale::Locale;

/// Fetches the details of `movie_id` in the locale's detail language
/// (`tr-TR`, `en-US`, ...).
///
/// # Errors
///
/// Returns `CoreError::NotFound` if TMDB reports an unknown movie and
/// `CoreError::Network` for any other failure.
#[instrument(skip_all, fields(movie_id = movie_id))]
pub async fn fetch_details(
    api: &impl LocalCatalogApi,
    movie_id: u64,
    locale: &Locale,
) -> Result<MovieDetails, CoreError> {
    let language = locale.detail_language();
    match api.movie_details(movie_id, &language).await {
        Ok(details) => Ok(details),
        Err(ApiError::Status { status: 404, .. }) => {
            Err(CoreError::NotFound(format!("movie {movie_id} not found")))
        }
        Err(e) => {
            tracing::warn!(movie_id, error = %e, "failed to load movie details");
            Err(CoreError::Network(e))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::catalog::testing::MockCatalog;

    #[tokio::test]
    async fn test_fetch_details_uses_region_tag() {
        // Arrange
        let api = MockCatalog::new(1, 1);
        let tr = Locale::default();

        // Act
        let details = fetch_details(&api, 238, &tr).await.unwrap();

        // Assert
        assert_eq!(details.id, 238);
        assert_eq!(details.runtime, Some(120));
        assert_eq!(api.details_requests(), vec![(238, String::from("tr-TR"))]);
    }

    #[tokio::test]
    async fn test_fetch_details_unknown_movie_is_not_found() {
        // Arrange
        let api = MockCatalog::new(1, 1);
        let en = Locale::parse("en-GB").unwrap();

        // Act
        let result = fetch_details(&api, 0, &en).await;

        // Assert
        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert_eq!(api.details_requests(), vec![(0, String::from("en-US"))]);
    }
}
