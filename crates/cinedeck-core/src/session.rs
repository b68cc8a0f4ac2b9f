//! TMDB login flow and the active user.

use chrono::{DateTime, Utc};
use cinedeck_api::tmdb::{ApiError, LocalIdentityApi};
use cinedeck_db::{KeyValueStore, load_json, save_json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::CoreError;

/// Storage key of the active user.
pub const USER_KEY: &str = "user";

const TOKEN_REFUSED: &str = "no request token was issued";
const INVALID_CREDENTIALS: &str = "invalid username or password";
const SESSION_REFUSED: &str = "session could not be created";

/// An authenticated TMDB session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// TMDB username the session was opened for.
    pub username: String,
    /// Opaque session id.
    pub session_id: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Profile of a user signed in through TMDB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmdbProfile {
    /// The session the profile belongs to.
    pub session: SessionIdentity,
    /// Display name, initially the TMDB username.
    pub full_name: String,
    /// Contact e-mail, empty until edited.
    #[serde(default)]
    pub email: String,
}

impl From<SessionIdentity> for TmdbProfile {
    fn from(session: SessionIdentity) -> Self {
        Self {
            full_name: session.username.clone(),
            email: String::new(),
            session,
        }
    }
}

/// A locally registered user, without secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProfile {
    /// Account id.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Login e-mail.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveUser {
    /// Signed in through TMDB.
    Tmdb(TmdbProfile),
    /// Signed in with a local account.
    Local(LocalProfile),
}

impl ActiveUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Tmdb(profile) => &profile.full_name,
            Self::Local(profile) => &profile.full_name,
        }
    }

    /// Contact e-mail (may be empty for TMDB users).
    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Tmdb(profile) => &profile.email,
            Self::Local(profile) => &profile.email,
        }
    }
}

/// Step of the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Not started.
    Idle,
    /// Requesting an anonymous request token.
    AcquiringToken,
    /// Validating the token against username and password.
    ValidatingCredentials,
    /// Exchanging the validated token for a session.
    PromotingSession,
    /// A session was created.
    Authenticated,
    /// A step failed; the flow may be run again.
    Failed,
}

/// Three-step TMDB login: request token, credential validation, session.
#[derive(Debug)]
pub struct LoginFlow {
    state: LoginState,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    /// Creates an idle flow.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LoginState::Idle,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn state(&self) -> LoginState {
        self.state
    }

    /// Runs all three steps. The first failure aborts the rest and leaves
    /// the flow in [`LoginState::Failed`].
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for a blank username or password, or if the
    ///   flow already authenticated
    /// - `CoreError::Token`, `CoreError::Credential`, `CoreError::Session`
    ///   when the remote rejects the corresponding step
    /// - `CoreError::Network` on transport or decoding failures
    #[instrument(skip_all, fields(username = %username))]
    pub async fn run(
        &mut self,
        api: &impl LocalIdentityApi,
        username: &str,
        password: &str,
    ) -> Result<SessionIdentity, CoreError> {
        if self.state == LoginState::Authenticated {
            return Err(CoreError::Validation(String::from(
                "this login has already completed",
            )));
        }
        if username.trim().is_empty() || password.is_empty() {
            return Err(CoreError::Validation(String::from(
                "username and password are required",
            )));
        }

        match self.steps(api, username.trim(), password).await {
            Ok(identity) => {
                self.state = LoginState::Authenticated;
                tracing::info!(username = %identity.username, "TMDB session created");
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(failed_at = ?self.state, error = %e, "TMDB login failed");
                self.state = LoginState::Failed;
                Err(e)
            }
        }
    }

    async fn steps(
        &mut self,
        api: &impl LocalIdentityApi,
        username: &str,
        password: &str,
    ) -> Result<SessionIdentity, CoreError> {
        self.state = LoginState::AcquiringToken;
        let token = api
            .create_request_token()
            .await
            .map_err(|e| classify(e, CoreError::Token, TOKEN_REFUSED))?;
        let request_token = match token.request_token {
            Some(t) if token.success && !t.is_empty() => t,
            _ => {
                return Err(CoreError::Token(
                    token
                        .status_message
                        .unwrap_or_else(|| String::from(TOKEN_REFUSED)),
                ));
            }
        };

        self.state = LoginState::ValidatingCredentials;
        let validated = api
            .validate_with_login(username, password, &request_token)
            .await
            .map_err(|e| classify(e, CoreError::Credential, INVALID_CREDENTIALS))?;
        if !validated.success {
            return Err(CoreError::Credential(
                validated
                    .status_message
                    .unwrap_or_else(|| String::from(INVALID_CREDENTIALS)),
            ));
        }
        let validated_token = validated
            .request_token
            .filter(|t| !t.is_empty())
            .unwrap_or(request_token);

        self.state = LoginState::PromotingSession;
        let session = api
            .create_session(&validated_token)
            .await
            .map_err(|e| classify(e, CoreError::Session, SESSION_REFUSED))?;
        match session.session_id {
            Some(session_id) if session.success && !session_id.is_empty() => Ok(SessionIdentity {
                username: username.to_owned(),
                session_id,
                created_at: Utc::now(),
            }),
            _ => Err(CoreError::Session(
                session
                    .status_message
                    .unwrap_or_else(|| String::from(SESSION_REFUSED)),
            )),
        }
    }
}

/// Maps a TMDB rejection to the step's error; everything else, server
/// failures included, is a network failure.
fn classify(err: ApiError, rejected: fn(String) -> CoreError, fallback: &str) -> CoreError {
    if !err.is_rejection() {
        return CoreError::Network(err);
    }
    let message = err
        .remote_message()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(fallback)
        .to_owned();
    rejected(message)
}

/// Holds the active user and keeps it persisted under [`USER_KEY`].
#[derive(Debug)]
pub struct AuthContext<'a, S: ?Sized> {
    pub(crate) store: &'a S,
    pub(crate) active: Option<ActiveUser>,
}

impl<'a, S: KeyValueStore + ?Sized> AuthContext<'a, S> {
    /// Loads the persisted active user, if any.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the snapshot cannot be read.
    pub fn restore(store: &'a S) -> Result<Self, CoreError> {
        let active = load_json::<ActiveUser, _>(store, USER_KEY).map_err(CoreError::Storage)?;
        Ok(Self { store, active })
    }

    /// The signed-in user.
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveUser> {
        self.active.as_ref()
    }

    /// Runs the TMDB login flow and, on success only, makes the identity
    /// the active user.
    ///
    /// # Errors
    ///
    /// Any error of [`LoginFlow::run`], or `CoreError::Storage` if the
    /// identity cannot be persisted (it stays active in memory).
    pub async fn login_with_tmdb(
        &mut self,
        api: &impl LocalIdentityApi,
        username: &str,
        password: &str,
    ) -> Result<SessionIdentity, CoreError> {
        let mut flow = LoginFlow::new();
        let identity = flow.run(api, username, password).await?;
        self.set_active(ActiveUser::Tmdb(TmdbProfile::from(identity.clone())))?;
        Ok(identity)
    }

    /// Signs out and deletes the persisted user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the key cannot be deleted.
    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.active = None;
        self.store.remove(USER_KEY).map_err(|e| {
            tracing::warn!(error = %format!("{e:#}"), "failed to clear active user");
            CoreError::Storage(e)
        })?;
        tracing::info!("signed out");
        Ok(())
    }

    pub(crate) fn set_active(&mut self, user: ActiveUser) -> Result<(), CoreError> {
        let saved = save_json(self.store, USER_KEY, &user);
        self.active = Some(user);
        saved.map_err(|e| {
            tracing::warn!(error = %format!("{e:#}"), "failed to persist active user");
            CoreError::Storage(e)
        })
    }
}
