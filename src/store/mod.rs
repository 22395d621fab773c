//! Secret store — durable mapping from handle to (key, ciphertext).
//!
//! The engine only talks to the `SecretStore` trait, so the backing
//! storage is an injected capability rather than a process-wide
//! connection.  Two implementations ship with the crate:
//! - `SqliteStore`, the durable store used by the CLI and the server
//! - `MemoryStore`, an in-process map for tests and simulations

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::crypto::SecretKey;
use crate::errors::Result;

/// Key material and ciphertext removed from the store by `take_by_handle`.
///
/// Once a caller holds one of these, the record no longer exists.
pub struct TakenSecret {
    pub key: SecretKey,
    pub ciphertext: Vec<u8>,
}

/// Storage backend for one-time secrets.
///
/// # Invariants
///
/// - At most one record exists per handle; `insert` never overwrites.
/// - `take_by_handle` is atomic: for any handle, at most one call ever
///   returns `Some`, no matter how many callers race.
pub trait SecretStore: Send + Sync {
    /// Provision the schema. Idempotent; safe to call on every startup.
    fn create_table(&self) -> Result<()>;

    /// Persist a new record.
    ///
    /// Fails with `DuplicateHandle` if `handle` is already taken and with
    /// `Storage` on any other backend failure.
    fn insert(&self, handle: &str, key: &SecretKey, ciphertext: &[u8]) -> Result<()>;

    /// Look up the active record for `handle` and delete it in the same
    /// transaction.
    ///
    /// Returns `None` when nothing matches: an already consumed handle and
    /// one that never existed are indistinguishable.
    fn take_by_handle(&self, handle: &str) -> Result<Option<TakenSecret>>;
}
