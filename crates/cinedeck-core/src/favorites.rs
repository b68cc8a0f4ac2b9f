//! Persisted favorites list.

use cinedeck_api::tmdb::Movie;
use cinedeck_db::{KeyValueStore, load_json, save_json};

use crate::CoreError;

/// Storage key of the favorites snapshot.
pub const FAVORITES_KEY: &str = "@favorites";

/// Ordered list of favorite movies, unique by id.
///
/// Every mutation updates memory first and then rewrites the whole
/// snapshot. A failed write keeps the in-memory change and is reported as
/// `CoreError::Storage`.
#[derive(Debug)]
pub struct Favorites<'a, S: ?Sized> {
    store: &'a S,
    items: Vec<Movie>,
}

impl<'a, S: KeyValueStore + ?Sized> Favorites<'a, S> {
    /// Opens the favorites list and loads the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the snapshot cannot be read.
    pub fn open(store: &'a S) -> Result<Self, CoreError> {
        let mut favorites = Self {
            store,
            items: Vec::new(),
        };
        favorites.load()?;
        Ok(favorites)
    }

    /// Replaces the in-memory list with the persisted snapshot. A missing
    /// snapshot is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the snapshot cannot be read or
    /// decoded; the in-memory list is left as it was.
    pub fn load(&mut self) -> Result<(), CoreError> {
        let items = load_json::<Vec<Movie>, _>(self.store, FAVORITES_KEY)
            .map_err(CoreError::Storage)?
            .unwrap_or_default();
        tracing::debug!(count = items.len(), "favorites loaded");
        self.items = items;
        Ok(())
    }

    /// Re-reads the snapshot. Favorites are not language-scoped, so this
    /// only re-synchronizes with storage.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn refresh(&mut self) -> Result<(), CoreError> {
        self.load()
    }

    /// Adds `movie` unless a favorite with the same id exists.
    ///
    /// Returns `false` (and writes nothing) for a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the snapshot cannot be written.
    pub fn add(&mut self, movie: Movie) -> Result<bool, CoreError> {
        if self.contains(movie.id) {
            return Ok(false);
        }
        self.items.push(movie);
        self.persist()?;
        Ok(true)
    }

    /// Removes every favorite with `movie_id`.
    ///
    /// Returns `false` (and writes nothing) if none matched.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the snapshot cannot be written.
    pub fn remove(&mut self, movie_id: u64) -> Result<bool, CoreError> {
        let before = self.items.len();
        self.items.retain(|m| m.id != movie_id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Adds `movie` if absent, removes it otherwise. Returns whether it is
    /// a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the snapshot cannot be written.
    pub fn toggle(&mut self, movie: Movie) -> Result<bool, CoreError> {
        if self.contains(movie.id) {
            self.remove(movie.id)?;
            Ok(false)
        } else {
            self.add(movie)?;
            Ok(true)
        }
    }

    /// Whether `movie_id` is a favorite.
    #[must_use]
    pub fn contains(&self, movie_id: u64) -> bool {
        self.items.iter().any(|m| m.id == movie_id)
    }

    /// Favorites in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Movie] {
        &self.items
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) -> Result<(), CoreError> {
        save_json(self.store, FAVORITES_KEY, &self.items).map_err(|e| {
            tracing::warn!(
                count = self.items.len(),
                error = %format!("{e:#}"),
                "failed to persist favorites"
            );
            CoreError::Storage(e)
        })
    }
}
