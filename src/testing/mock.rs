//! Mock objects and fake implementations for testing

use crate::utils::crypto::{Cipher, CipherError};

/// Cipher that refuses every operation
pub struct FailingCipher {
    error: CipherError,
}

impl FailingCipher {
    /// Fail every seal with `error`
    #[must_use]
    pub fn new(error: CipherError) -> Self {
        Self { error }
    }

    /// Fail as a cipher configured with a key of `len` bytes would
    #[must_use]
    pub fn bad_key_length(len: usize) -> Self {
        Self::new(CipherError::InvalidKeyLength {
            expected: crate::utils::crypto::KEY_SIZE,
            actual: len,
        })
    }
}

impl Cipher for FailingCipher {
    fn seal(&self, _plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Err(self.error.clone())
    }

    fn open(&self, _ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Err(CipherError::AuthenticationFailed)
    }
}

/// Identity "cipher" exposing the plaintext payload
///
/// Provides no protection at all; it only exercises the codec through a
/// second [`Cipher`] implementation.
pub struct PassthroughCipher;

impl Cipher for PassthroughCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(plaintext.to_vec())
    }

    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(ciphertext.to_vec())
    }
}
