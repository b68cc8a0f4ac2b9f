//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 endpoints: the four paginated
//! movie listings, movie details, and the authentication endpoints.

mod api;
mod category;
mod client;
mod error;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, IdentityApi, LocalCatalogApi, LocalIdentityApi};
pub use category::{Category, ParseCategoryError};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use error::ApiError;
#[allow(clippy::module_name_repetitions)]
pub use types::{
    Genre, Movie, MovieDetails, MoviePage, RequestToken, SessionResponse, TmdbErrorResponse,
};
