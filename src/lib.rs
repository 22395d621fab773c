pub mod cli;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod errors;
pub mod server;
pub mod store;

pub use engine::SecretEngine;
pub use errors::{OnceSecretError, Result};
pub use store::{MemoryStore, SecretStore, SqliteStore};
