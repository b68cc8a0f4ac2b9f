//! Error taxonomy shared by all stores.

use cinedeck_api::tmdb::ApiError;

/// Failure of a store operation.
///
/// Every variant leaves the store's previous good state in place; the
/// caller decides whether to surface it (user-initiated actions) or only
/// log it (background fetches).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Transport failure or non-success HTTP response.
    #[error("network request failed: {0}")]
    Network(#[from] ApiError),

    /// The request token could not be acquired.
    #[error("request token error: {0}")]
    Token(String),

    /// The remote rejected the username/password, or a local password check failed.
    #[error("credential error: {0}")]
    Credential(String),

    /// The validated token could not be promoted to a session.
    #[error("session error: {0}")]
    Session(String),

    /// A persisted user or record is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before any network or storage call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The key-value store could not be read or written.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl CoreError {
    /// Message suitable for an alert or banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => String::from("Network error, please try again."),
            Self::Token(msg)
            | Self::Credential(msg)
            | Self::Session(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg) => msg.clone(),
            Self::Storage(_) => String::from("Could not save changes on this device."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_details() {
        // Arrange
        let err = CoreError::from(ApiError::Status {
            status: 500,
            code: 0,
            message: String::from("upstream exploded"),
        });

        // Act
        let message = err.user_message();

        // Assert
        assert_eq!(message, "Network error, please try again.");
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn test_user_message_passes_credential_text() {
        // Arrange
        let err = CoreError::Credential(String::from("invalid username or password"));

        // Act & Assert
        assert_eq!(err.user_message(), "invalid username or password");
    }
}
