//! `oncesecret save` — store a secret and print its one-time handle.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, open_engine, Cli};
use crate::config::Settings;
use crate::errors::{OnceSecretError, Result};

/// Execute the `save` command.
pub fn execute(cli: &Cli, text: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let secret = read_secret(text)?;

    let engine = open_engine(&settings)?;
    let handle = engine.submit(&secret)?;

    // stdout gets exactly one line so the result can be piped.
    match settings.base_url {
        Some(ref base) => println!("{}", Settings::retrieval_url(base, &handle)),
        None => println!("{handle}"),
    }

    if io::stdout().is_terminal() {
        output::success("Secret stored. It can be retrieved exactly once.");
        if settings.base_url.is_none() {
            output::tip("Set base_url in .oncesecret.toml to print full links.");
        }
    }

    Ok(())
}

/// Determine the secret from one of three sources.
fn read_secret(text: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = text {
        // Source 1: Inline value on the command line.
        output::warning("Secret provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        // Source 2: Piped input; only the final line break is dropped.
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        strip_final_newline(&mut buf);
        return Ok(buf);
    }

    // Source 3: Interactive secure prompt (default).
    dialoguer::Password::new()
        .with_prompt("Secret")
        .allow_empty_password(true)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| OnceSecretError::CommandFailed(format!("input prompt: {e}")))
}

/// Drop one trailing `\n` (or `\r\n`); any earlier blank lines belong to
/// the secret.
fn strip_final_newline(buf: &mut String) {
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
}
