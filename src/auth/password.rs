//! Password hashing primitive (spec.md §4.5 "Auth Primitives"). Bcrypt, cost
//! 12, grounded in `original_source/backend/services/accounts.py`'s
//! `CryptContext(schemes=["bcrypt"], bcrypt__rounds=12)`.

const BCRYPT_COST: u32 = 12;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(#[from] bcrypt::BcryptError),
}

/// Hashes a plaintext password. Panics never propagate past this boundary:
/// a bcrypt failure (e.g. a password longer than 72 bytes) is surfaced as a
/// typed error, never stored.
pub fn hash(plain: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plain, BCRYPT_COST)?)
}

/// Verifies a plaintext password against a stored bcrypt hash. Returns
/// `Ok(false)` on mismatch rather than an error — only a malformed hash is a
/// `PasswordError`.
pub fn verify(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(plain, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashed).unwrap());
        assert!(!verify("wrong password", &hashed).unwrap());
    }

    #[test]
    fn distinct_hashes_for_same_input() {
        let a = hash("same password").unwrap();
        let b = hash("same password").unwrap();
        assert_ne!(a, b, "bcrypt salts each hash independently");
    }
}
