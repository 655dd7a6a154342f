//! Account registration, login and cookie sessions

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{generate_token, hash_token};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::config::MAX_SESSION_TTL_HOURS;
use crate::data::{Database, DatabaseError, SessionStore, User, UserStore};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 80;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A freshly issued session: the raw token goes to the browser only
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Normalize and check a username, returning the trimmed form
pub fn validate_username(raw: &str) -> Result<String, AuthError> {
    let username = raw.trim();
    let len = username.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(AuthError::Validation(format!(
            "Username must be between {} and {} characters.",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AuthError::Validation(
            "Username may only contain letters, digits, '_', '-' and '.'.".to_string(),
        ));
    }
    Ok(username.to_string())
}

pub fn validate_password(password: &str, confirm: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN || len > PASSWORD_MAX {
        return Err(AuthError::Validation(format!(
            "Password must be between {} and {} characters.",
            PASSWORD_MIN, PASSWORD_MAX
        )));
    }
    if password != confirm {
        return Err(AuthError::Validation("Passwords do not match.".to_string()));
    }
    Ok(())
}

/// Registration and session management on top of the user and session stores
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    sessions: SessionStore,
    ttl: Duration,
}

impl AuthService {
    /// `ttl_hours` is clamped to `1..=MAX_SESSION_TTL_HOURS`
    pub fn new(db: Database, ttl_hours: i64) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            sessions: SessionStore::new(db),
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
        }
    }

    pub fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        validate_password(password, confirm)?;

        if self.users.get_by_username(&username)?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let hash = hash_password(password)?;
        let user = match self.users.create(&username, &hash) {
            Ok(user) => user,
            // Lost a race with a concurrent registration
            Err(DatabaseError::Conflict(_)) => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a new session.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let user = self
            .users
            .get_by_username(username.trim())?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            tracing::info!(user_id = user.id, "Rejected login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let token = generate_token();
        let expires_at = now + self.ttl;
        self.sessions.create(&hash_token(&token), user.id, expires_at)?;

        match self.sessions.purge_expired(now) {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged expired sessions"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(IssuedSession {
            user,
            token,
            expires_at,
        })
    }

    /// The user behind a cookie token, if the session is still valid
    pub fn authenticate(&self, token: &str) -> Result<Option<User>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self.sessions.find_user(&hash_token(token), Utc::now())?)
    }

    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.delete(&hash_token(token))?;
        Ok(())
    }
}
