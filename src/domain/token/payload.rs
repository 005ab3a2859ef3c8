//! Identity and expiration carried inside an opaque token

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Decoded token contents. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub email: String,
    /// Absolute instant after which the token is rejected
    pub expiration: DateTime<Utc>,
}

impl TokenPayload {
    pub fn new(email: impl Into<String>, expiration: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            expiration,
        }
    }

    /// Payload valid for `window` starting at `now`
    pub fn issue(email: impl Into<String>, now: DateTime<Utc>, window: Duration) -> Self {
        Self::new(email, now + window)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration < now
    }

    /// Temporal validity check, kept apart from decoding
    pub fn ensure_valid_at(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_expired_at(now) {
            return Err(DomainError::TokenExpired);
        }
        Ok(())
    }
}
