use clap::Parser;
use oncesecret::cli::{init_logging, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // The server is chatty by default; one-shot commands only warn.
    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_logging(&cli, default_level);

    let result = match cli.command {
        Commands::Init => oncesecret::cli::commands::init::execute(&cli),
        Commands::Save { ref text } => {
            oncesecret::cli::commands::save::execute(&cli, text.as_deref())
        }
        Commands::Get { ref handle } => oncesecret::cli::commands::get::execute(&cli, handle),
        Commands::Serve { ref bind } => {
            oncesecret::cli::commands::serve::execute(&cli, bind.as_deref())
        }
        Commands::Completions { shell } => oncesecret::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        oncesecret::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
