//! Catalog browsing: per-category paging, the four-lane home feed and
//! movie details.

mod details;
mod home;
mod pages;

pub use details::fetch_details;
pub use home::HomeFeed;
pub use pages::{CategoryPages, FetchKind, LoadState, PageOutcome, PageTicket};

#[cfg(test)]
pub(crate) mod testing;
