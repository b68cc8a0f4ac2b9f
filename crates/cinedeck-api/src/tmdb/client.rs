//! `TmdbClient` - TMDB API client implementation.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::{LocalCatalogApi, LocalIdentityApi};
use super::category::Category;
use super::error::ApiError;
use super::types::{MovieDetails, MoviePage, RequestToken, SessionResponse, TmdbErrorResponse};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// v3 API key, sent as the `api_key` query parameter.
    api_key: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

/// Body of `authentication/token/validate_with_login`.
#[derive(Debug, Serialize)]
struct ValidateWithLoginBody<'a> {
    username: &'a str,
    password: &'a str,
    request_token: &'a str,
}

/// Body of `authentication/session/new`.
#[derive(Debug, Serialize)]
struct CreateSessionBody<'a> {
    request_token: &'a str,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the v3 API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_key,
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Joins an endpoint path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|source| ApiError::Url {
            path: String::from(path),
            source,
        })
    }

    /// Sends a GET request with the API key and the given query params.
    #[instrument(skip_all, fields(path = %path))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let request = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query);
        self.execute(path, request).await
    }

    /// Sends a POST request with a JSON body and the API key.
    #[instrument(skip_all, fields(path = %path))]
    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let request = self
            .http_client
            .post(url)
            .query(&[("api_key", self.api_key.as_str())])
            .json(body);
        self.execute(path, request).await
    }

    /// Executes a prepared request and decodes the JSON response.
    ///
    /// Non-success statuses are turned into `ApiError::Status`, using the
    /// TMDB error body when it can be parsed.
    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            path: String::from(path),
            source,
        };

        let request = request.build().map_err(transport)?;
        // The full URL carries the API key; only the method and path are logged.
        tracing::debug!(method = %request.method(), path, "TMDB API request");

        let response = self.http_client.execute(request).await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<TmdbErrorResponse>(&body) {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    code: error_response.status_code,
                    message: error_response.status_message,
                });
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                code: 0,
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: String::from(path),
            source,
        })
    }
}

impl LocalCatalogApi for TmdbClient {
    #[instrument(skip_all, fields(category = %category, page = page))]
    async fn movie_list(
        &self,
        category: Category,
        language: &str,
        page: u32,
    ) -> Result<MoviePage, ApiError> {
        let query = [
            ("language", String::from(language)),
            ("page", page.to_string()),
        ];
        self.get_json(category.path(), &query).await
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn movie_details(
        &self,
        movie_id: u64,
        language: &str,
    ) -> Result<MovieDetails, ApiError> {
        let path = format!("movie/{movie_id}");
        let query = [("language", String::from(language))];
        self.get_json(&path, &query).await
    }
}

impl LocalIdentityApi for TmdbClient {
    #[instrument(skip_all)]
    async fn create_request_token(&self) -> Result<RequestToken, ApiError> {
        self.get_json("authentication/token/new", &[]).await
    }

    #[instrument(skip_all)]
    async fn validate_with_login(
        &self,
        username: &str,
        password: &str,
        request_token: &str,
    ) -> Result<RequestToken, ApiError> {
        let body = ValidateWithLoginBody {
            username,
            password,
            request_token,
        };
        self.post_json("authentication/token/validate_with_login", &body)
            .await
    }

    #[instrument(skip_all)]
    async fn create_session(&self, request_token: &str) -> Result<SessionResponse, ApiError> {
        let body = CreateSessionBody { request_token };
        self.post_json("authentication/session/new", &body).await
    }
}
