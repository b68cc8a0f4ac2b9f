//! Active language selection.

use std::fmt;

use cinedeck_db::{KeyValueStore, load_json, save_json};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Storage key of the persisted language.
pub const LANGUAGE_KEY: &str = "language";

/// Language used when nothing has been chosen yet.
pub const DEFAULT_LANGUAGE: &str = "tr";

/// A two-letter lowercase language code (ISO 639-1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Derives a locale from a language tag (`en`, `en-US`, `pt_BR`).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the primary subtag is not two
    /// ASCII letters.
    pub fn parse(tag: &str) -> Result<Self, CoreError> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if primary.len() != 2 || !primary.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(CoreError::Validation(format!(
                "invalid language tag: {tag:?}"
            )));
        }
        Ok(Self(primary))
    }

    /// The two-letter code, as sent with listing requests.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Region-qualified tag used for detail requests.
    #[must_use]
    pub fn detail_language(&self) -> String {
        match self.0.as_str() {
            "tr" => String::from("tr-TR"),
            "en" => String::from("en-US"),
            other => String::from(other),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self(String::from(DEFAULT_LANGUAGE))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Holds the active locale and keeps it persisted.
#[derive(Debug)]
pub struct LanguageContext<'a, S: ?Sized> {
    store: &'a S,
    current: Locale,
}

impl<'a, S: KeyValueStore + ?Sized> LanguageContext<'a, S> {
    /// Loads the persisted language, falling back to the default when the
    /// key is absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the store cannot be read or holds an
    /// invalid snapshot.
    pub fn load(store: &'a S) -> Result<Self, CoreError> {
        let current = load_json::<Locale, _>(store, LANGUAGE_KEY)
            .map_err(CoreError::Storage)?
            .unwrap_or_default();
        Ok(Self { store, current })
    }

    /// The active locale.
    #[must_use]
    pub const fn current(&self) -> &Locale {
        &self.current
    }

    /// Switches the active locale. Returns `false` if it was already active.
    ///
    /// The in-memory value changes even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the new value cannot be persisted.
    pub fn change(&mut self, locale: Locale) -> Result<bool, CoreError> {
        if locale == self.current {
            return Ok(false);
        }
        tracing::info!(from = %self.current, to = %locale, "language changed");
        self.current = locale;
        if let Err(e) = save_json(self.store, LANGUAGE_KEY, &self.current) {
            tracing::warn!(error = %format!("{e:#}"), "failed to persist language");
            return Err(CoreError::Storage(e));
        }
        Ok(true)
    }
}
