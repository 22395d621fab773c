//! Secret lifecycle engine: submit once, retrieve once.
//!
//! `SecretEngine` ties the handle generator, the per-secret cipher and an
//! injected `SecretStore` together.  It keeps no state of its own between
//! calls, so it can be shared behind an `Arc` by any number of threads;
//! single delivery is enforced by the store's atomic take.

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::handle::{is_well_formed, new_handle_with_len, DEFAULT_HANDLE_LEN};
use crate::crypto::{decrypt_to_string, encrypt, SecretKey};
use crate::errors::{OnceSecretError, Result};
use crate::store::SecretStore;

/// Default number of handles tried before `submit` gives up.
pub const DEFAULT_MAX_INSERT_ATTEMPTS: u32 = 5;

/// Orchestrates `submit` and `retrieve` over a secret store.
pub struct SecretEngine<S> {
    store: S,
    handle_len: usize,
    max_insert_attempts: u32,
}

impl<S: SecretStore> SecretEngine<S> {
    /// Build an engine with default handle length and retry budget.
    pub fn new(store: S) -> Self {
        Self {
            store,
            handle_len: DEFAULT_HANDLE_LEN,
            max_insert_attempts: DEFAULT_MAX_INSERT_ATTEMPTS,
        }
    }

    /// Build an engine using the handle length and retry budget from
    /// already-validated `settings`.
    pub fn with_settings(store: S, settings: &Settings) -> Self {
        Self {
            store,
            handle_len: settings.handle_length,
            max_insert_attempts: settings.max_insert_attempts.max(1),
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encrypt `plaintext` under a fresh key and store it.
    ///
    /// Returns only the handle; the key and ciphertext never leave the
    /// engine.  Empty input is rejected before any key or handle exists.
    pub fn submit(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Err(OnceSecretError::EmptyInput);
        }

        let key = SecretKey::generate();
        let ciphertext = encrypt(&key, plaintext.as_bytes())?;

        // Bounded loop with fresh randomness each round.
        for attempt in 1..=self.max_insert_attempts {
            let handle = new_handle_with_len(self.handle_len);
            match self.store.insert(&handle, &key, &ciphertext) {
                Ok(()) => {
                    tracing::info!(attempt, "secret stored");
                    return Ok(handle);
                }
                Err(OnceSecretError::DuplicateHandle) => {
                    tracing::warn!(attempt, "handle collision, retrying with a new handle");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(
            attempts = self.max_insert_attempts,
            "gave up allocating a unique handle"
        );
        Err(OnceSecretError::ExhaustedRetries {
            attempts: self.max_insert_attempts,
        })
    }

    /// Take the secret behind `handle` out of the store and decrypt it.
    ///
    /// `Ok(None)` means "expired or invalid": the handle was never issued,
    /// was malformed, or has already been used.  The record is deleted
    /// before decryption, so a decryption failure still burns the secret.
    pub fn retrieve(&self, handle: &str) -> Result<Option<Zeroizing<String>>> {
        if !is_well_formed(handle) {
            tracing::debug!("rejected malformed handle");
            return Ok(None);
        }

        let Some(taken) = self.store.take_by_handle(handle)? else {
            tracing::debug!("no active secret for handle");
            return Ok(None);
        };

        match decrypt_to_string(&taken.key, &taken.ciphertext) {
            Ok(plaintext) => {
                tracing::info!("secret retrieved and destroyed");
                Ok(Some(plaintext))
            }
            Err(e) => {
                tracing::error!("stored secret failed integrity check; record destroyed");
                Err(e)
            }
        }
    }
}
