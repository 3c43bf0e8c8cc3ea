use regex::Regex;
use uuid::Uuid;

use crate::auth::{self, TokenCodec};
use crate::db::Database;
use crate::error::{ApiError, FieldError};
use crate::models::{LoginInput, NewUser, RegisterInput, UserProfile};

const MIN_PASSWORD_LEN: usize = 6;

/// Registration, login, and per-request token verification.
///
/// Hashing and signing are delegated to [`crate::auth`]; this service owns
/// the orchestration and the store lookups around them.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(db: Database, tokens: TokenCodec) -> Self {
        AuthService { db, tokens }
    }

    /// Create an account and sign the first token for it.
    pub fn register(&self, input: RegisterInput) -> Result<(String, UserProfile), ApiError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "Please include a valid email"));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        if self.db.get_user_by_email(&email)?.is_some() {
            return Err(ApiError::validation(
                "email",
                "An account with this email already exists",
            ));
        }

        let password_hash = auth::hash_password(&input.password)?;
        let user = self.db.create_user(NewUser {
            name,
            email,
            password_hash,
        })?;

        let token = self.tokens.issue(user.id)?;
        Ok((token, user.profile()))
    }

    /// Verify credentials and sign a fresh token. Unknown email and wrong
    /// password are deliberately indistinguishable.
    pub fn login(&self, input: LoginInput) -> Result<(String, UserProfile), ApiError> {
        let email = input.email.trim().to_lowercase();

        let user = self
            .db
            .get_user_by_email(&email)?
            .filter(|user| auth::verify_password(&user.password_hash, &input.password))
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let token = self.tokens.issue(user.id)?;
        Ok((token, user.profile()))
    }

    /// Profile lookup for an already-authenticated id.
    pub fn current_user(&self, id: Uuid) -> Result<UserProfile, ApiError> {
        self.db
            .get_user(id)?
            .map(|user| user.profile())
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Resolve a bearer token to a user id. Used by the auth gate; every
    /// failure collapses into the same generic 401.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, ApiError> {
        self.tokens.verify(token).map_err(|e| {
            tracing::warn!("rejected bearer token: {e}");
            ApiError::Unauthorized("Not authorized to access this route".to_string())
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .unwrap()
        .is_match(email)
}
