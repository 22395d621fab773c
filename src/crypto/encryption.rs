//! AES-256-GCM authenticated encryption of a single secret.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::{Zeroize, Zeroizing};

use super::keys::SecretKey;
use crate::errors::{OnceSecretError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under the secret's own `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| OnceSecretError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| OnceSecretError::EncryptionFailed(format!("encryption error: {e}")))?;

    // One blob per record: the store only has to keep a single column.
    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Any failure (short buffer, wrong key, flipped bit) is reported as
/// `DecryptionFailed`; no partial plaintext ever leaves this function.
pub fn decrypt(key: &SecretKey, ciphertext_with_nonce: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(OnceSecretError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| OnceSecretError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| OnceSecretError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// Decrypt and interpret the plaintext as UTF-8 text.
///
/// Secrets always enter the system as text, so bytes that do not decode
/// are treated like any other integrity failure.
pub fn decrypt_to_string(key: &SecretKey, ciphertext_with_nonce: &[u8]) -> Result<Zeroizing<String>> {
    let mut bytes = decrypt(key, ciphertext_with_nonce)?;
    let taken = std::mem::take(&mut *bytes);

    String::from_utf8(taken).map(Zeroizing::new).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        OnceSecretError::DecryptionFailed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ciphertext_carries_nonce_and_tag() {
        let key = SecretKey::generate();
        let ct = encrypt(&key, b"hello").unwrap();
        assert_eq!(ct.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn buffer_shorter_than_nonce_and_tag_is_rejected() {
        let key = SecretKey::generate();
        let result = decrypt(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(matches!(result, Err(OnceSecretError::DecryptionFailed)));
    }

    #[test]
    fn non_utf8_plaintext_is_an_integrity_failure() {
        let key = SecretKey::generate();
        let ct = encrypt(&key, &[0xFF, 0xFE, 0xFD]).unwrap();
        assert!(decrypt(&key, &ct).is_ok());
        assert!(matches!(
            decrypt_to_string(&key, &ct),
            Err(OnceSecretError::DecryptionFailed)
        ));
    }
}
