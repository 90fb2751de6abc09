//! Session token primitive (spec.md §4.5). Encodes `{user_id, role}` plus an
//! absolute expiry via `jsonwebtoken`, the pack's closest analog to the
//! source's `jose`-based JWT layer (`resonance-stream` manifest pairs the
//! same crate with `postgres` + `redis`, the closest stack match here).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::Role;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(jsonwebtoken::errors::Error),

    #[error("Token is missing, malformed, or expired")]
    Invalid,
}

/// The decoded payload of a session token, as carried through the request
/// lifecycle from the boundary down to the authorization resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    algorithm: Algorithm,
    expiry: Duration,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, expiry_minutes: i64) -> Self {
        Self { secret: secret.into(), algorithm, expiry: Duration::minutes(expiry_minutes) }
    }

    /// Signs a fresh token for `(user_id, role)`, stamping the expiry
    /// `expiry_minutes` from now (P8: `verify(sign(payload))` round-trips
    /// the payload modulo this added expiry).
    pub fn sign(&self, user_id: i32, role: Role) -> Result<String, TokenError> {
        let exp = (Utc::now() + self.expiry).timestamp();
        let claims = Claims { user_id, role, exp };

        jsonwebtoken::encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(TokenError::EncodingFailed)
    }

    /// Decodes and validates a bearer token. Any failure — bad signature,
    /// malformed payload, or an expiry in the past — collapses to
    /// `TokenError::Invalid` (spec.md §4.5 "the verify function returns the
    /// decoded struct or absent").
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;

        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", Algorithm::HS256, 30)
    }

    #[test]
    fn sign_then_verify_round_trips_payload() {
        let codec = codec();
        let token = codec.sign(42, Role::Admin).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn verify_rejects_garbage() {
        let codec = codec();
        assert!(codec.verify("not.a.token").is_err());
    }

    #[test]
    fn verify_rejects_token_signed_with_different_secret() {
        let a = TokenCodec::new("secret-a", Algorithm::HS256, 30);
        let b = TokenCodec::new("secret-b", Algorithm::HS256, 30);
        let token = a.sign(1, Role::User).unwrap();
        assert!(b.verify(&token).is_err());
    }
}
