use std::fmt::Debug;

use crate::domain::DomainError;

/// One-way credential hashing
pub trait PasswordHasher: Send + Sync + Debug {
    /// Salted hash suitable for storage
    fn hash(&self, plaintext: &str) -> Result<String, DomainError>;

    /// Whether `plaintext` matches `hash`. A malformed hash is a mismatch.
    fn compare(&self, plaintext: &str, hash: &str) -> bool;
}
