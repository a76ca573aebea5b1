//! Quartermaster
//!
//! Resolves configuration from the command line, config files and defaults,
//! sets up logging, then runs the bot against the local console.

use anyhow::Result;
use quartermaster::bot::{Bot, ConsoleChat};
use quartermaster::cli::Cli;
use quartermaster::config::{ConfigLoader, Settings};
use quartermaster::error::{ConfigResult, EXIT_USAGE};
use quartermaster::logging::init_logging;
use tracing::{debug, info};

fn resolve_settings(cli: &Cli) -> ConfigResult<Settings> {
    ConfigLoader::from_current_dir()?.resolve(cli)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(EXIT_USAGE);
        }
        Err(e) => e.exit(),
    };

    // Nothing is logged until settings exist, so failures go straight to stderr
    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}\n");
            eprintln!("{}", Cli::help_text());
            std::process::exit(e.exit_code());
        }
    };

    init_logging(&settings)?;

    if let Some(path) = &settings.token_file {
        info!(path = %path.display(), "Read API key from token file");
    }
    debug!(
        settings = %serde_json::to_string(&settings)?,
        "Resolved configuration"
    );

    let mut bot = Bot::new(&settings);
    let operator = std::env::var("USER").unwrap_or_else(|_| "operator".to_string());
    let mut chat = ConsoleChat::stdio(operator);
    bot.run(&mut chat).await
}
