//! `oncesecret get` — retrieve a secret, destroying it in the process.

use crate::cli::output;
use crate::cli::{handle_from_arg, load_settings, open_engine, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, handle: &str) -> Result<()> {
    let settings = load_settings(cli)?;
    let engine = open_engine(&settings)?;

    match engine.retrieve(handle_from_arg(handle))? {
        Some(plaintext) => println!("{}", plaintext.as_str()),
        None => output::warning("Either the secret expired or the handle is wrong."),
    }

    Ok(())
}
