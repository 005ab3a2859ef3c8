//! Argon2id credential hashing

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::user::PASSWORD_FIELD;
use crate::domain::{DomainError, PasswordHasher};

/// Hashes credentials as PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
///
/// Cost parameters apply to new hashes only. Verification reads the
/// parameters recorded in the stored hash, so raising the cost never locks
/// out existing accounts.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with the recommended Argon2id costs
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit costs: memory in KiB, passes and lanes
    pub fn with_costs(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            DomainError::configuration(format!("Invalid Argon2 cost parameters: {}", e))
        })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                DomainError::invalid_field(PASSWORD_FIELD, format!("Password cannot be hashed: {}", e))
            })
    }

    fn compare(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(stored) = PasswordHash::new(hash) else {
            return false;
        };

        // digests are compared in constant time
        self.argon2()
            .verify_password(plaintext.as_bytes(), &stored)
            .is_ok()
    }
}
