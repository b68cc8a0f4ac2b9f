//! Local (device-only) accounts.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};
use chrono::{DateTime, Utc};
use cinedeck_db::{KeyValueStore, load_json, save_json};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::session::{ActiveUser, AuthContext, LocalProfile};

/// Storage key of the registered account list.
pub const USERS_KEY: &str = "users";

/// Minimum password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Minimum full name length (in characters).
const MIN_NAME_LEN: usize = 2;

/// E-mail shape accepted at registration.
#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("failed to compile e-mail regex"));

/// A stored local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    /// Account id.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Login e-mail, unique among accounts.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl RegisteredUser {
    /// The account without its password hash.
    #[must_use]
    pub fn profile(&self) -> LocalProfile {
        LocalProfile {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Form field a validation issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Full name.
    FullName,
    /// E-mail address.
    Email,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
    /// Terms acceptance.
    Terms,
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormIssue {
    /// Offending field.
    pub field: FormField,
    /// What is wrong with it.
    pub message: &'static str,
}

/// Registration input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Display name.
    pub full_name: String,
    /// Login e-mail.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub confirm_password: String,
    /// Whether the terms were accepted.
    pub accept_terms: bool,
}

impl RegistrationForm {
    /// Checks every field and returns all issues found (empty if valid).
    #[must_use]
    pub fn validate(&self) -> Vec<FormIssue> {
        let mut issues = Vec::new();
        if let Some(message) = name_issue(&self.full_name) {
            issues.push(FormIssue {
                field: FormField::FullName,
                message,
            });
        }
        if let Some(message) = email_issue(&self.email) {
            issues.push(FormIssue {
                field: FormField::Email,
                message,
            });
        }
        if let Some(message) = password_issue(&self.password) {
            issues.push(FormIssue {
                field: FormField::Password,
                message,
            });
        }
        if self.confirm_password.is_empty() {
            issues.push(FormIssue {
                field: FormField::ConfirmPassword,
                message: "password confirmation is required",
            });
        } else if self.confirm_password != self.password {
            issues.push(FormIssue {
                field: FormField::ConfirmPassword,
                message: "passwords do not match",
            });
        }
        if !self.accept_terms {
            issues.push(FormIssue {
                field: FormField::Terms,
                message: "the terms of use must be accepted",
            });
        }
        issues
    }
}

fn name_issue(full_name: &str) -> Option<&'static str> {
    let name = full_name.trim();
    if name.is_empty() {
        Some("full name is required")
    } else if name.chars().count() < MIN_NAME_LEN {
        Some("full name must be at least 2 characters")
    } else {
        None
    }
}

fn email_issue(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some("e-mail is required")
    } else if !EMAIL_RE.is_match(email) {
        Some("e-mail address is not valid")
    } else {
        None
    }
}

fn password_issue(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        Some("password is required")
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Some("password must be at least 8 characters")
    } else if !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_lowercase())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        Some("password must contain an uppercase letter, a lowercase letter and a digit")
    } else {
        None
    }
}

fn join_issues(issues: &[FormIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message)
        .collect::<Vec<_>>()
        .join("; ")
}

fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Storage(anyhow::anyhow!("failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(expected_hash: &str, candidate: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(expected_hash)
        .map_err(|e| CoreError::Storage(anyhow::anyhow!("invalid stored password hash: {e}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(CoreError::Storage(anyhow::anyhow!(
            "failed to verify password: {e}"
        ))),
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Millisecond timestamp id, bumped past any id already taken.
fn next_id(users: &[RegisteredUser], now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    while users.iter().any(|u| u.id == candidate.to_string()) {
        candidate = candidate.saturating_add(1);
    }
    candidate.to_string()
}

impl<S: KeyValueStore + ?Sized> AuthContext<'_, S> {
    /// All registered local accounts.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` if the list cannot be read.
    pub fn registered_users(&self) -> Result<Vec<RegisteredUser>, CoreError> {
        Ok(load_json::<Vec<RegisteredUser>, _>(self.store, USERS_KEY)
            .map_err(CoreError::Storage)?
            .unwrap_or_default())
    }

    fn save_users(&self, users: &[RegisteredUser]) -> Result<(), CoreError> {
        save_json(self.store, USERS_KEY, users).map_err(|e| {
            tracing::warn!(error = %format!("{e:#}"), "failed to persist accounts");
            CoreError::Storage(e)
        })
    }

    /// Creates a local account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an invalid form or an e-mail that
    /// is already registered, `CoreError::Storage` if the list cannot be
    /// read or written.
    pub fn register(&self, form: &RegistrationForm) -> Result<LocalProfile, CoreError> {
        let issues = form.validate();
        if !issues.is_empty() {
            return Err(CoreError::Validation(join_issues(&issues)));
        }
        let mut users = self.registered_users()?;
        if users.iter().any(|u| same_email(&u.email, &form.email)) {
            return Err(CoreError::Validation(String::from(
                "this e-mail address is already registered",
            )));
        }

        let now = Utc::now();
        let user = RegisteredUser {
            id: next_id(&users, now),
            full_name: form.full_name.trim().to_owned(),
            email: form.email.trim().to_owned(),
            password_hash: hash_password(&form.password)?,
            created_at: now,
        };
        let profile = user.profile();
        users.push(user);
        self.save_users(&users)?;
        tracing::info!(user_id = %profile.id, "local account registered");
        Ok(profile)
    }

    /// Signs in with a local account.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Credential` for an unknown e-mail or a wrong
    /// password, `CoreError::Storage` on storage failures.
    pub fn login(&mut self, email: &str, password: &str) -> Result<LocalProfile, CoreError> {
        let users = self.registered_users()?;
        let Some(user) = users.iter().find(|u| same_email(&u.email, email)) else {
            return Err(CoreError::Credential(String::from(
                "invalid e-mail or password",
            )));
        };
        if !verify_password(&user.password_hash, password)? {
            return Err(CoreError::Credential(String::from(
                "invalid e-mail or password",
            )));
        }
        let profile = user.profile();
        self.set_active(ActiveUser::Local(profile.clone()))?;
        tracing::info!(user_id = %profile.id, "signed in with local account");
        Ok(profile)
    }

    /// Changes the display name and e-mail of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if nobody is signed in or the local
    /// account no longer exists,
    /// `CoreError::Validation` for an invalid name or e-mail (or one taken
    /// by another account), `CoreError::Storage` on storage failures.
    pub fn update_profile(&mut self, full_name: &str, email: &str) -> Result<ActiveUser, CoreError> {
        let Some(current) = self.active.clone() else {
            return Err(CoreError::NotFound(String::from("no user is signed in")));
        };
        let full_name = full_name.trim().to_owned();
        let email = email.trim().to_owned();
        if let Some(message) = name_issue(&full_name) {
            return Err(CoreError::Validation(String::from(message)));
        }
        // TMDB profiles start without an e-mail and may keep it empty.
        let email_required = matches!(current, ActiveUser::Local(_));
        let email_problem = if email_required || !email.is_empty() {
            email_issue(&email)
        } else {
            None
        };
        if let Some(message) = email_problem {
            return Err(CoreError::Validation(String::from(message)));
        }

        let updated = match current {
            ActiveUser::Tmdb(mut profile) => {
                profile.full_name = full_name;
                profile.email = email;
                ActiveUser::Tmdb(profile)
            }
            ActiveUser::Local(mut profile) => {
                let mut users = self.registered_users()?;
                if users
                    .iter()
                    .any(|u| u.id != profile.id && same_email(&u.email, &email))
                {
                    return Err(CoreError::Validation(String::from(
                        "this e-mail address is already registered",
                    )));
                }
                let Some(user) = users.iter_mut().find(|u| u.id == profile.id) else {
                    return Err(CoreError::NotFound(String::from("account not found")));
                };
                user.full_name.clone_from(&full_name);
                user.email.clone_from(&email);
                self.save_users(&users)?;
                profile.full_name = full_name;
                profile.email = email;
                ActiveUser::Local(profile)
            }
        };
        self.set_active(updated.clone())?;
        tracing::info!("profile updated");
        Ok(updated)
    }

    /// Changes the password of the signed-in local user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for TMDB users or a weak new password,
    /// `CoreError::NotFound` if nobody is signed in or the account no longer
    /// exists, `CoreError::Credential` if `current` is wrong.
    pub fn change_password(&mut self, current: &str, new: &str) -> Result<(), CoreError> {
        let user_id = match &self.active {
            None => return Err(CoreError::NotFound(String::from("no user is signed in"))),
            Some(ActiveUser::Tmdb(_)) => {
                return Err(CoreError::Validation(String::from(
                    "TMDB users change their password on the TMDB website",
                )));
            }
            Some(ActiveUser::Local(profile)) => profile.id.clone(),
        };
        let mut users = self.registered_users()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Err(CoreError::NotFound(String::from("account not found")));
        };
        if !verify_password(&user.password_hash, current)? {
            return Err(CoreError::Credential(String::from(
                "current password is incorrect",
            )));
        }
        if let Some(message) = password_issue(new) {
            return Err(CoreError::Validation(String::from(message)));
        }
        user.password_hash = hash_password(new)?;
        self.save_users(&users)?;
        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }

    /// Deletes the signed-in local account (TMDB users are only signed
    /// out), then signs out.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if nobody is signed in,
    /// `CoreError::Storage` on storage failures.
    pub fn delete_account(&mut self) -> Result<(), CoreError> {
        match &self.active {
            None => return Err(CoreError::NotFound(String::from("no user is signed in"))),
            Some(ActiveUser::Local(profile)) => {
                let id = profile.id.clone();
                let mut users = self.registered_users()?;
                users.retain(|u| u.id != id);
                self.save_users(&users)?;
                tracing::info!(user_id = %id, "local account deleted");
            }
            Some(ActiveUser::Tmdb(_)) => {}
        }
        self.logout()
    }
}
