use thiserror::Error;

/// All errors that can occur in OnceSecret.
///
/// A handle that matches nothing is not an error: `SecretEngine::retrieve`
/// answers it with `Ok(None)`.
#[derive(Debug, Error)]
pub enum OnceSecretError {
    // --- Input errors ---
    #[error("Cannot store an empty message")]
    EmptyInput,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — secret is corrupted or was tampered with")]
    DecryptionFailed,

    // --- Store errors ---
    #[error("Handle already exists in the secret store")]
    DuplicateHandle,

    #[error("Could not allocate a unique handle after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Transport errors ---
    #[error("Server error: {0}")]
    Server(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for OnceSecret results.
pub type Result<T> = std::result::Result<T, OnceSecretError>;
