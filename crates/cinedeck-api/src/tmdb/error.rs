//! TMDB client error type.

/// Failure of a single TMDB request.
///
/// Covers transport failures, non-success HTTP statuses and undecodable
/// bodies. No retries are performed by the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The endpoint path could not be joined onto the base URL.
    #[error("failed to join URL path: {path}")]
    Url {
        /// Endpoint path.
        path: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {path}")]
    Transport {
        /// Endpoint path.
        path: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with a non-success status.
    #[error("TMDB API error (HTTP {status}): code={code}, message={message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// TMDB `status_code`, 0 when the body was not a TMDB error object.
        code: u32,
        /// TMDB `status_message`, or the raw body.
        message: String,
    },

    /// The body was not the expected JSON document.
    #[error("failed to decode JSON response: {path}")]
    Decode {
        /// Endpoint path.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Returns the message reported by TMDB, if the remote rejected the request.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message.as_str()),
            Self::Url { .. } | Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Whether TMDB itself refused the request: a 4xx status or a TMDB
    /// error object. Gateway failures with a plain body are not rejections.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        match self {
            Self::Status { status, code, .. } => (*status >= 400 && *status < 500) || *code != 0,
            Self::Url { .. } | Self::Transport { .. } | Self::Decode { .. } => false,
        }
    }
}
