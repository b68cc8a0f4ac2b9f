//! `CatalogApi` and `IdentityApi` trait definitions.
#![allow(clippy::future_not_send)]

use super::category::Category;
use super::error::ApiError;
use super::types::{MovieDetails, MoviePage, RequestToken, SessionResponse};

/// TMDB movie catalog trait.
///
/// Abstracts catalog operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches one page of a movie listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the remote reports a
    /// non-success status, or JSON parsing fails.
    async fn movie_list(
        &self,
        category: Category,
        language: &str,
        page: u32,
    ) -> Result<MoviePage, ApiError>;

    /// Fetches the details of a single movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_details(&self, movie_id: u64, language: &str)
    -> Result<MovieDetails, ApiError>;
}

/// TMDB authentication trait (request token / login / session).
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(IdentityApi: Send)]
pub trait LocalIdentityApi {
    /// Requests a new anonymous request token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn create_request_token(&self) -> Result<RequestToken, ApiError>;

    /// Validates a request token against a username and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the remote rejects the
    /// credentials.
    async fn validate_with_login(
        &self,
        username: &str,
        password: &str,
        request_token: &str,
    ) -> Result<RequestToken, ApiError>;

    /// Promotes a validated request token to a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the remote rejects the
    /// token.
    async fn create_session(&self, request_token: &str) -> Result<SessionResponse, ApiError>;
}
