//! Incremental paging for a single category.

use cinedeck_api::tmdb::{ApiError, Category, LocalCatalogApi, Movie, MoviePage};
use tracing::instrument;

use crate::CoreError;
use crate::locale::Locale;

/// Fetch activity of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No fetch in flight.
    Idle,
    /// The first page is being (re)fetched.
    Loading,
    /// The next page is being fetched.
    LoadingMore,
}

/// Kind of fetch a ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Page 1, replacing all items.
    Reset,
    /// `current_page + 1`, appended.
    More,
}

/// A fetch that has been started and must be handed back to
/// [`CategoryPages::complete`].
#[derive(Debug)]
#[must_use]
pub struct PageTicket {
    category: Category,
    locale: Locale,
    page: u32,
    kind: FetchKind,
    generation: u64,
}

impl PageTicket {
    /// Category to request.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Locale to request.
    #[must_use]
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Page number to request.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Whether this is a reset or a load-more.
    #[must_use]
    pub const fn kind(&self) -> FetchKind {
        self.kind
    }
}

/// Result of applying a fetch to the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Items were replaced by page 1 (count of items).
    Replaced(usize),
    /// A page was appended (count of new items).
    Appended(usize),
    /// Nothing was requested: a fetch is in flight or there is no next page.
    Skipped,
    /// The response belonged to a superseded fetch and was discarded.
    Stale,
}

/// Accumulated pages of one category listing.
///
/// At most one fetch is in flight: `load_more` is a no-op unless the state
/// is [`LoadState::Idle`]. A reset always proceeds and supersedes whatever
/// is in flight; responses to superseded fetches are discarded on arrival.
#[derive(Debug)]
pub struct CategoryPages {
    category: Category,
    locale: Option<Locale>,
    items: Vec<Movie>,
    current_page: u32,
    has_more: bool,
    state: LoadState,
    generation: u64,
}

impl CategoryPages {
    /// Creates an empty category. Nothing is fetched until the first reset.
    #[must_use]
    pub const fn new(category: Category) -> Self {
        Self {
            category,
            locale: None,
            items: Vec::new(),
            current_page: 1,
            has_more: false,
            state: LoadState::Idle,
            generation: 0,
        }
    }

    /// The listing this store pages through.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Locale of the items currently held, `None` before the first reset.
    #[must_use]
    pub const fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Items fetched so far, in page order.
    #[must_use]
    pub fn items(&self) -> &[Movie] {
        &self.items
    }

    /// Last successfully fetched page.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Whether another page is available.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Current fetch activity.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// `true` while the first page is being fetched.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// `true` while a further page is being fetched.
    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        self.state == LoadState::LoadingMore
    }

    /// Drops all items and supersedes any fetch in flight.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.locale = None;
        self.items.clear();
        self.current_page = 1;
        self.has_more = false;
        self.state = LoadState::Idle;
    }

    /// Starts a fetch of page 1 for `locale`, superseding any fetch in flight.
    pub fn begin_reset(&mut self, locale: Locale) -> PageTicket {
        self.generation = self.generation.wrapping_add(1);
        self.state = LoadState::Loading;
        PageTicket {
            category: self.category,
            locale,
            page: 1,
            kind: FetchKind::Reset,
            generation: self.generation,
        }
    }

    /// Starts a fetch of the next page.
    ///
    /// Returns `None` (and changes nothing) while a fetch is in flight, when
    /// there is no further page, or before the first successful reset.
    pub fn begin_load_more(&mut self) -> Option<PageTicket> {
        if self.state != LoadState::Idle || !self.has_more {
            return None;
        }
        let locale = self.locale.clone()?;
        let page = self.current_page.checked_add(1)?;
        self.state = LoadState::LoadingMore;
        Some(PageTicket {
            category: self.category,
            locale,
            page,
            kind: FetchKind::More,
            generation: self.generation,
        })
    }

    /// Applies the response of a fetch started by `begin_reset` or
    /// `begin_load_more`.
    ///
    /// A failure leaves items and page untouched and returns the state to
    /// idle.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Network` if the fetch failed.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<MoviePage, ApiError>,
    ) -> Result<PageOutcome, CoreError> {
        if ticket.generation != self.generation {
            tracing::debug!(
                category = %self.category,
                page = ticket.page,
                "discarding superseded page response"
            );
            return Ok(PageOutcome::Stale);
        }
        self.state = LoadState::Idle;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    category = %self.category,
                    page = ticket.page,
                    error = %e,
                    "failed to load movies, keeping previous items"
                );
                return Err(CoreError::Network(e));
            }
        };

        let count = page.results.len();
        self.current_page = ticket.page;
        self.has_more = ticket.page < page.total_pages;
        let outcome = match ticket.kind {
            FetchKind::Reset => {
                self.items = page.results;
                self.locale = Some(ticket.locale);
                PageOutcome::Replaced(count)
            }
            FetchKind::More => {
                self.items.extend(page.results);
                PageOutcome::Appended(count)
            }
        };
        tracing::debug!(
            category = %self.category,
            page = self.current_page,
            total_pages = page.total_pages,
            items = self.items.len(),
            "page applied"
        );
        Ok(outcome)
    }

    /// Fetches page 1 for `locale` and replaces all items.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Network` if the fetch failed; previous items stay.
    #[instrument(skip_all, fields(category = %self.category, locale = %locale))]
    pub async fn reset(
        &mut self,
        api: &impl LocalCatalogApi,
        locale: &Locale,
    ) -> Result<PageOutcome, CoreError> {
        let ticket = self.begin_reset(locale.clone());
        let result = api
            .movie_list(ticket.category, ticket.locale.as_str(), ticket.page)
            .await;
        self.complete(ticket, result)
    }

    /// Fetches and appends the next page, unless a fetch is in flight or
    /// the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Network` if the fetch failed; previous items stay.
    #[instrument(skip_all, fields(category = %self.category))]
    pub async fn load_more(
        &mut self,
        api: &impl LocalCatalogApi,
    ) -> Result<PageOutcome, CoreError> {
        let Some(ticket) = self.begin_load_more() else {
            return Ok(PageOutcome::Skipped);
        };
        let result = api
            .movie_list(ticket.category, ticket.locale.as_str(), ticket.page)
            .await;
        self.complete(ticket, result)
    }
}
