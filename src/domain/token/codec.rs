//! Token codec trait

use std::fmt::Debug;

use crate::domain::DomainError;

use super::payload::TokenPayload;

/// Turns payloads into opaque, tamper-evident strings and back.
///
/// `decode` checks integrity only; expiration is the caller's decision.
pub trait TokenCodec: Send + Sync + Debug {
    fn encode(&self, payload: &TokenPayload) -> Result<String, DomainError>;

    /// Fails with [`DomainError::InvalidToken`] on any decryption or parse failure
    fn decode(&self, token: &str) -> Result<TokenPayload, DomainError>;
}
