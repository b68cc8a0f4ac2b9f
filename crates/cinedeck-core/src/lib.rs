//! Application state for cinedeck.
//!
//! Each store receives its collaborators (API client, key-value store,
//! active locale) explicitly; nothing here is a process-wide singleton.

/// Local account registration and management.
pub mod accounts;
/// Category paging, home feed and movie details.
pub mod catalog;
mod error;
/// Favorites store.
pub mod favorites;
/// Active language.
pub mod locale;
/// TMDB login flow and the active identity.
pub mod session;

pub use error::CoreError;
