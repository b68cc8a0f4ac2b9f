//! `AppConfig` struct and TOML loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB access settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// `[tmdb]` section.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct TmdbConfig {
    /// v3 API key. `TMDB_API_KEY` takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API root, e.g. `https://api.themoviedb.org/3/`.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

impl TmdbConfig {
    /// Parses `base_url`, adding the trailing slash endpoint paths are
    /// joined onto.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is set but is not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        let Some(raw) = self.base_url.as_deref() else {
            return Ok(None);
        };
        let normalized = if raw.ends_with('/') {
            raw.to_owned()
        } else {
            format!("{raw}/")
        };
        Url::parse(&normalized)
            .map(Some)
            .with_context(|| format!("invalid tmdb.base_url: {raw}"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.tmdb.api_key.is_none());
        assert!(config.tmdb.base_url().unwrap().is_none());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_tmdb_section() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[tmdb]\napi_key = \"abc123\"\nbase_url = \"http://127.0.0.1:8080/3\"\n",
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.tmdb.api_key.as_deref(), Some("abc123"));
        assert_eq!(
            config.tmdb.base_url().unwrap().unwrap().as_str(),
            "http://127.0.0.1:8080/3/"
        );
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_base_url_is_error() {
        // Arrange
        let config = TmdbConfig {
            api_key: None,
            base_url: Some(String::from("not a url")),
        };

        // Act
        let result = config.base_url();

        // Assert
        assert!(result.is_err());
    }
}
