//! Retrieval handle generation.
//!
//! A handle is the only thing standing between a stored secret and
//! anyone who can reach the server, so it is drawn uniformly from the
//! 62-symbol alphanumeric alphabet with a cryptographically secure RNG.
//! Handles are pure lookup identifiers: they are not derived from, and
//! reveal nothing about, the secret's key.

use rand::distr::Alphanumeric;
use rand::Rng;

/// Default handle length. 62^16 is roughly 4.7e28 possible handles.
pub const DEFAULT_HANDLE_LEN: usize = 16;

/// Shortest handle the configuration will accept.
pub const MIN_HANDLE_LEN: usize = 16;

/// Longest handle the store's column can hold.
pub const MAX_HANDLE_LEN: usize = 255;

/// Generate a handle of `DEFAULT_HANDLE_LEN` characters.
pub fn new_handle() -> String {
    new_handle_with_len(DEFAULT_HANDLE_LEN)
}

/// Generate a handle of exactly `len` alphanumeric characters.
///
/// `rand::rng()` is a ChaCha-based CSPRNG reseeded from the OS, never a
/// time-seeded generator.
pub fn new_handle_with_len(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Returns `true` if `candidate` could have been produced by this module.
///
/// Used to answer obviously malformed handles without touching the store.
pub fn is_well_formed(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() <= MAX_HANDLE_LEN
        && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}
