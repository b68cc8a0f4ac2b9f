//! The four-lane home feed.

use cinedeck_api::tmdb::{Category, LocalCatalogApi, Movie};
use futures::future::join_all;
use tracing::instrument;

use super::pages::{CategoryPages, PageOutcome};
use crate::CoreError;
use crate::locale::Locale;

/// One store per home category, refreshed together.
#[derive(Debug)]
pub struct HomeFeed {
    top_rated: CategoryPages,
    upcoming: CategoryPages,
    now_playing: CategoryPages,
    popular: CategoryPages,
}

impl Default for HomeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeFeed {
    /// Creates a feed with four empty lanes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top_rated: CategoryPages::new(Category::TopRated),
            upcoming: CategoryPages::new(Category::Upcoming),
            now_playing: CategoryPages::new(Category::NowPlaying),
            popular: CategoryPages::new(Category::Popular),
        }
    }

    /// The lane for `category`.
    #[must_use]
    pub const fn lane(&self, category: Category) -> &CategoryPages {
        match category {
            Category::TopRated => &self.top_rated,
            Category::Upcoming => &self.upcoming,
            Category::NowPlaying => &self.now_playing,
            Category::Popular => &self.popular,
        }
    }

    const fn lane_mut(&mut self, category: Category) -> &mut CategoryPages {
        match category {
            Category::TopRated => &mut self.top_rated,
            Category::Upcoming => &mut self.upcoming,
            Category::NowPlaying => &mut self.now_playing,
            Category::Popular => &mut self.popular,
        }
    }

    /// Lanes in display order.
    pub fn lanes(&self) -> impl Iterator<Item = &CategoryPages> {
        [&self.top_rated, &self.upcoming, &self.now_playing, &self.popular].into_iter()
    }

    /// Resets every lane for `locale`, fetching the four first pages
    /// concurrently. Lanes succeed or fail independently.
    #[instrument(skip_all, fields(locale = %locale))]
    pub async fn refresh(
        &mut self,
        api: &impl LocalCatalogApi,
        locale: &Locale,
    ) -> Vec<(Category, Result<PageOutcome, CoreError>)> {
        let fetches = [
            &mut self.top_rated,
            &mut self.upcoming,
            &mut self.now_playing,
            &mut self.popular,
        ]
        .map(|lane| async move {
            let category = lane.category();
            (category, lane.reset(api, locale).await)
        });
        let results = join_all(fetches).await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(lanes = results.len(), failed, "home feed refreshed");
        results
    }

    /// Loads the next page of one lane.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Network` if the fetch failed.
    pub async fn load_more(
        &mut self,
        api: &impl LocalCatalogApi,
        category: Category,
    ) -> Result<PageOutcome, CoreError> {
        self.lane_mut(category).load_more(api).await
    }

    /// Filters loaded top-rated and upcoming movies by a case-insensitive
    /// substring of the title or original title.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        self.top_rated
            .items()
            .iter()
            .chain(self.upcoming.items())
            .filter(|movie| {
                needle.is_empty()
                    || movie.title.to_lowercase().contains(&needle)
                    || movie
                        .original_title
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Drops every loaded item.
    pub fn clear(&mut self) {
        for lane in [
            &mut self.top_rated,
            &mut self.upcoming,
            &mut self.now_playing,
            &mut self.popular,
        ] {
            lane.clear();
        }
    }
}
