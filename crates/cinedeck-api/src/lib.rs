//! API client library for cinedeck.
//!
//! Provides the TMDB v3 client used for catalog listings, movie details
//! and the request-token/session authentication handshake.

/// TMDB API client.
pub mod tmdb;
