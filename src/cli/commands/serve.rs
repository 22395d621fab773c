//! `oncesecret serve` — run the HTTP front end.

use tokio::net::TcpListener;

use crate::cli::{load_settings, open_engine, Cli};
use crate::errors::{OnceSecretError, Result};
use crate::server::{self, AppState};

/// Execute the `serve` command. Blocks until Ctrl-C.
pub fn execute(cli: &Cli, bind: Option<&str>) -> Result<()> {
    let mut settings = load_settings(cli)?;
    if let Some(addr) = bind {
        settings.bind_addr = addr.to_string();
    }

    let engine = open_engine(&settings)?;
    let pending = engine.store().pending_count()?;
    tracing::info!(
        database = %settings.database_path.display(),
        pending,
        "secret store ready"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let listener = TcpListener::bind(&settings.bind_addr)
            .await
            .map_err(|e| OnceSecretError::Server(format!("bind {}: {e}", settings.bind_addr)))?;

        let state = AppState::new(engine, settings.base_url.clone());
        server::serve(listener, state).await
    })
}
