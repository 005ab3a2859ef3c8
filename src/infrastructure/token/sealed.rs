//! Authenticated-encryption token codec
//!
//! A token is `base64url(nonce || ciphertext)` where the ciphertext is the
//! AES-256-GCM sealed JSON payload. The GCM tag makes any alteration fail
//! decryption, so integrity and confidentiality rest on the one secret.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

use crate::domain::{DomainError, TokenCodec, TokenPayload};

const NONCE_LEN: usize = 12;

/// Encrypts token payloads with a key derived from the configured secret
#[derive(Clone)]
pub struct AesGcmTokenCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for AesGcmTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmTokenCodec").finish_non_exhaustive()
    }
}

impl AesGcmTokenCodec {
    /// The 256-bit key is the SHA-256 digest of `secret`
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration("Token secret cannot be empty"));
        }

        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| DomainError::configuration(format!("Invalid token key: {}", e)))?;

        Ok(Self { cipher })
    }
}

impl TokenCodec for AesGcmTokenCodec {
    fn encode(&self, payload: &TokenPayload) -> Result<String, DomainError> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| DomainError::internal(format!("Failed to serialize token: {}", e)))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| DomainError::internal("Failed to encrypt token"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn decode(&self, token: &str) -> Result<TokenPayload, DomainError> {
        let sealed = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| DomainError::InvalidToken)?;

        if sealed.len() <= NONCE_LEN {
            return Err(DomainError::InvalidToken);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DomainError::InvalidToken)?;

        serde_json::from_slice(&plaintext).map_err(|_| DomainError::InvalidToken)
    }
}
