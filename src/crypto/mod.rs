//! Cryptographic primitives for OnceSecret.
//!
//! This module provides:
//! - Retrieval handle generation (`handle`)
//! - Per-secret key generation (`keys`)
//! - AES-256-GCM encryption and decryption (`encryption`)

pub mod encryption;
pub mod handle;
pub mod keys;

pub use encryption::{decrypt, decrypt_to_string, encrypt};
pub use handle::{is_well_formed, new_handle, new_handle_with_len};
pub use keys::SecretKey;
