//! Credential hashing and bearer-token issuance/verification.
//!
//! Passwords are hashed with argon2id; tokens are HS256 JWTs signed with the
//! shared secret from configuration. Both are stateless: the gate verifies
//! signature and expiry per request without touching the store.

use std::time::{Duration, SystemTime};

use anyhow::Context;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher};
use josekit::jws::{JwsHeader, HS256};
use josekit::jwt::{self, JwtPayload};
use thiserror::Error;
use uuid::Uuid;

/// Hash a password into a PHC-format argon2id string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash. Unparseable hashes count as a
/// mismatch rather than an error.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| parsed.verify_password(&[&Argon2::default()], password))
        .is_ok()
}

/// Why a token was rejected. The gate collapses all of these into one
/// generic 401 for the client; the distinction is for logging.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token invalid")]
    Invalid,
    #[error("token expired")]
    Expired,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        TokenCodec {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token for the given user id, expiring `ttl` from now.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let mut header = JwsHeader::new();
        header.set_token_type("JWT");

        let now = SystemTime::now();
        let mut payload = JwtPayload::new();
        payload.set_subject(user_id.to_string());
        payload.set_issued_at(&now);
        payload.set_expires_at(&(now + self.ttl));

        let signer = HS256
            .signer_from_bytes(&self.secret)
            .context("building token signer")?;
        jwt::encode_with_signer(&payload, &header, &signer).context("signing token")
    }

    /// Verify signature and expiry, returning the subject user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let verifier = HS256
            .verifier_from_bytes(&self.secret)
            .map_err(|_| TokenError::Invalid)?;
        let (payload, _) =
            jwt::decode_with_verifier(token, &verifier).map_err(|_| TokenError::Invalid)?;

        let expires_at = payload.expires_at().ok_or(TokenError::Invalid)?;
        if expires_at <= SystemTime::now() {
            return Err(TokenError::Expired);
        }

        payload
            .subject()
            .and_then(|sub| Uuid::parse_str(sub).ok())
            .ok_or(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"unit-test-secret".to_vec(), Duration::from_secs(3600))
    }

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password(&hash, "hunter22"));
        assert!(!verify_password(&hash, "hunter23"));
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        assert!(!verify_password("not-a-phc-string", "whatever"));
    }

    #[test]
    fn token_roundtrip() {
        let id = Uuid::new_v4();
        let token = codec().issue(id).unwrap();
        assert_eq!(codec().verify(&token).unwrap(), id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = codec().issue(Uuid::new_v4()).unwrap();
        let other = TokenCodec::new(b"different-secret".to_vec(), Duration::from_secs(3600));
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_token_is_rejected() {
        let stale = TokenCodec::new(b"unit-test-secret".to_vec(), Duration::ZERO);
        let token = stale.issue(Uuid::new_v4()).unwrap();
        assert_eq!(codec().verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mut token = codec().issue(Uuid::new_v4()).unwrap();
        token.push('x');
        assert_eq!(codec().verify(&token), Err(TokenError::Invalid));
    }
}
