use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxspread::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxspread::AppCommand {
    fn from(cmd: Commands) -> fxspread::AppCommand {
        match cmd {
            Commands::Quote { spread, url, copy } => {
                fxspread::AppCommand::Quote { spread, url, copy }
            }
            Commands::Watch { spread, url } => fxspread::AppCommand::Watch { spread, url },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the current quotation once
    Quote {
        /// Spread in percent applied to the quotation
        #[arg(short, long, allow_hyphen_values = true)]
        spread: Option<String>,

        /// Share link carrying a `spread` query parameter
        #[arg(short, long)]
        url: Option<String>,

        /// Copy the resulting price to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Watch the live quotation and edit the spread interactively
    Watch {
        /// Initial spread in percent
        #[arg(short, long, allow_hyphen_values = true)]
        spread: Option<String>,

        /// Share link carrying a `spread` query parameter
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxspread::cli::setup::setup(),
        Some(cmd) => fxspread::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
