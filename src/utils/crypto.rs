// Authenticated encryption for sealed session tokens

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use std::fmt;

/// Nonce size for AES-256-GCM encryption (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Encryption key size for AES-256 (256 bits)
pub const KEY_SIZE: usize = 32;

/// Authentication tag appended by GCM (128 bits)
pub const TAG_SIZE: usize = 16;

/// Errors raised by [`Cipher`] implementations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Encryption failed")]
    SealFailed,

    /// Wrong key, tampering and truncation all collapse into this variant
    #[error("Ciphertext failed authentication")]
    AuthenticationFailed,
}

/// Authenticated encryption capability used to protect session payloads
///
/// Implementations own their key material and must be safe to call from many
/// threads at once. `seal` is allowed (and expected) to be non-deterministic.
pub trait Cipher: Send + Sync {
    /// Encrypt and authenticate `plaintext`, embedding any nonce in the output
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying primitive refuses the input
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Verify and decrypt a value previously produced by [`Cipher::seal`]
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::AuthenticationFailed`] if the ciphertext was
    /// truncated, modified, or sealed under a different key
    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// AES-256-GCM cipher with a random 96-bit nonce per seal
///
/// Output layout is `nonce || ciphertext || tag`.
#[derive(Clone)]
pub struct Aes256GcmCipher {
    inner: Aes256Gcm,
}

impl Aes256GcmCipher {
    /// Create a cipher from raw key bytes
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] unless `key` is exactly
    /// [`KEY_SIZE`] bytes
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let inner = Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self { inner })
    }
}

impl fmt::Debug for Aes256GcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes256GcmCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Cipher for Aes256GcmCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        // Fresh nonce from the thread-local generator on every call
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .inner
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::SealFailed)?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::AuthenticationFailed);
        }

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);
        self.inner
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| CipherError::AuthenticationFailed)
    }
}

/// Generate a random key suitable for [`Aes256GcmCipher::new`]
#[must_use]
pub fn generate_key() -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    rand::rng().fill_bytes(&mut key);
    key
}
