//! `oncesecret init` — provision the secret store.

use crate::cli::output;
use crate::cli::{load_settings, open_store, Cli};
use crate::errors::Result;

/// Execute the `init` command. Safe to run any number of times.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;
    let pending = store.pending_count()?;

    output::success(&format!(
        "Secret store ready at {}",
        settings.database_path.display()
    ));
    output::info(&format!("{pending} secret(s) waiting to be retrieved"));
    output::tip("Store a secret: oncesecret save");

    Ok(())
}
