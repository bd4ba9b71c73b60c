use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::{
    password,
    repo_types::{ProfileUpdate, User},
};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{message}")]
    Invalid { field: &'static str, message: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

fn invalid(field: &'static str, message: &str) -> AuthError {
    AuthError::Invalid {
        field,
        message: message.to_string(),
    }
}

/// Reject missing or too-short registration input.
pub fn validate_registration(username: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(invalid("username", "username is required"));
    }
    if password.is_empty() {
        return Err(invalid("password", "password is required"));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(invalid("username", "username must be at least 3 characters"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("password", "password must be at least 6 characters"));
    }
    Ok(())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^[\d\s+\-()]+$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Trim every field, turn blanks into `None` and check email/phone formats.
pub fn normalize_profile(raw: ProfileUpdate) -> Result<ProfileUpdate, AuthError> {
    fn clean(v: Option<String>) -> Option<String> {
        v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }
    let profile = ProfileUpdate {
        email: clean(raw.email),
        first_name: clean(raw.first_name),
        last_name: clean(raw.last_name),
        phone: clean(raw.phone),
        address: clean(raw.address),
    };
    if let Some(email) = &profile.email {
        if !is_valid_email(email) {
            return Err(invalid("email", "invalid email format"));
        }
    }
    if let Some(phone) = &profile.phone {
        if !is_valid_phone(phone) {
            return Err(invalid("phone", "invalid phone format"));
        }
    }
    Ok(profile)
}

/// Register a user. The password is stored exactly as given, salted and hashed.
pub async fn create_user(db: &SqlitePool, username: &str, password: &str) -> Result<User, AuthError> {
    let credential = password::make_credential(password);
    match User::create(db, username, &credential).await {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AuthError::UsernameTaken),
        Err(e) => {
            error!(error = %e, "create user failed");
            Err(e.into())
        }
    }
}

/// The user owning `username`, if `password` matches.
pub async fn verify_user(db: &SqlitePool, username: &str, password: &str) -> Result<User, AuthError> {
    match User::find_by_username(db, username).await? {
        Some(user) if password::verify(password, &user.password_hash) => Ok(user),
        Some(user) => {
            debug!(user_id = user.id, "password mismatch");
            Err(AuthError::InvalidCredentials)
        }
        None => {
            // Same cost as a real check so response timing does not reveal the name.
            let _ = password::hash(password, "00000000000000000000000000000000");
            Err(AuthError::InvalidCredentials)
        }
    }
}
