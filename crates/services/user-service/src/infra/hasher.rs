//! Password hashing seam.

use domain::Password;

use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// One-way hash and verify.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `plain_text`, rejecting passwords below the minimum length
    fn hash(&self, plain_text: &str) -> AppResult<String>;

    fn verify(&self, plain_text: &str, hash: &str) -> bool;
}

/// Argon2id with a random salt per hash
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain_text: &str) -> AppResult<String> {
        Ok(Password::new(plain_text)?.into_string())
    }

    fn verify(&self, plain_text: &str, hash: &str) -> bool {
        Password::from_hash(hash.to_string()).verify(plain_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;

    #[test]
    fn test_argon2_hash_round_trip() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("secret1").unwrap();

        assert_ne!(hash, "secret1");
        assert!(hasher.verify("secret1", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_short_password_is_validation_error() {
        let err = Argon2Hasher.hash("abc").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
