//! Config file location.

use std::path::PathBuf;

use anyhow::{Result, bail};

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// - `{dir}/config.toml` when `--dir` is given.
/// - `$XDG_CONFIG_HOME/cinedeck/config.toml` when that variable is set.
/// - `~/.config/cinedeck/config.toml` otherwise.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is set (when
/// `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_from(dir, |name| std::env::var(name).ok())
}

fn resolve_from(dir: Option<&PathBuf>, env: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }
    if let Some(config_home) = env("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(config_home).join("cinedeck").join(CONFIG_FILE));
    }
    match env("HOME").filter(|v| !v.is_empty()) {
        Some(home) => Ok(PathBuf::from(home)
            .join(".config")
            .join("cinedeck")
            .join(CONFIG_FILE)),
        None => bail!("neither XDG_CONFIG_HOME nor HOME is set"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_resolve_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/cinedeck-profile");

        // Act
        let path = resolve_from(Some(&dir), |_| None).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/cinedeck-profile/config.toml"));
    }

    #[test]
    fn test_resolve_xdg_config_home() {
        // Arrange
        let env = |name: &str| (name == "XDG_CONFIG_HOME").then(|| String::from("/xdg/config"));

        // Act
        let path = resolve_from(None, env).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/xdg/config/cinedeck/config.toml"));
    }

    #[test]
    fn test_resolve_home_fallback() {
        // Arrange
        let env = |name: &str| (name == "HOME").then(|| String::from("/home/user"));

        // Act
        let path = resolve_from(None, env).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/home/user/.config/cinedeck/config.toml"));
    }

    #[test]
    fn test_resolve_without_home_is_error() {
        // Arrange & Act
        let result = resolve_from(None, |_| None);

        // Assert
        assert!(result.is_err());
    }
}
