//! User infrastructure module
//!
//! Credential hashing with Argon2.

mod password;

pub use password::Argon2Hasher;
