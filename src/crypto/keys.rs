//! Per-secret symmetric keys.
//!
//! Every stored secret gets its own freshly generated AES-256 key.  Keys
//! are never derived from a master secret, user input, or the handle, and
//! the only place a key is ever written is next to its one ciphertext.

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use zeroize::Zeroize;

use crate::errors::{OnceSecretError, Result};

/// Length of a per-secret key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte encryption key that zeroes its memory when dropped.
///
/// Deliberately not `Clone`, `Copy` or `Debug`: a key is created for one
/// secret, handed to the store once and dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
}

impl SecretKey {
    /// Generate a brand-new random key from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(generated.as_slice());
        generated.as_mut_slice().zeroize();
        Self { bytes }
    }

    /// Rebuild a key from bytes read back out of the store.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        if raw.len() != KEY_LEN {
            return Err(OnceSecretError::DecryptionFailed);
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Access the raw key bytes (e.g. to bind them into a SQL statement).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_distinct() {
        let a = SecretKey::generate();
        let b = SecretKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(SecretKey::from_slice(&[0u8; 16]).is_err());
        assert!(SecretKey::from_slice(&[0u8; KEY_LEN]).is_ok());
    }
}
