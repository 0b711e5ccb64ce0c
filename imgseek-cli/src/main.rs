//! imgseek CLI - terminal front end for the imgseek image search service.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use imgseek_core::{AuthProvider, GUEST_UNLOCK_MESSAGE};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;
use utils::Context;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (bad URL, missing identity handoff, guest gate not passed)
  69  Service unavailable (network failure, non-success response)
  74  Session store I/O error
  77  Not signed in";

#[derive(Parser)]
#[command(name = "imgseek")]
#[command(author, version, about = "Search images from the terminal", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// REST base URL (overrides IMGSEEK_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Session store file (overrides IMGSEEK_STORE)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Use the deterministic mock API instead of the server (for testing)
    #[arg(long, global = true)]
    mock: bool,

    /// Suppress notifications and warnings
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the address that starts sign-in with an external provider
    Login {
        /// Identity provider: google, github or facebook
        #[arg(short, long, default_value = "google")]
        provider: AuthProvider,
    },

    /// Complete sign-in from the address the provider redirected to
    Callback {
        /// Redirect address carrying email, name and profilePic parameters
        #[arg(value_name = "URL")]
        address: String,
    },

    /// Continue as a guest
    Guest {
        /// Message relayed from the guest access frame
        #[arg(long, value_name = "MESSAGE", default_value = GUEST_UNLOCK_MESSAGE)]
        signal: String,
    },

    /// Show the current session
    Whoami,

    /// Search for images
    Search {
        /// Search term (ignored for guests, who only see the discovery feed)
        #[arg(value_name = "TERM")]
        term: String,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent searches
    History,

    /// Clear search history
    ClearHistory,

    /// Show the most popular searches
    Top,

    /// Sign out
    Logout,

    /// Interactive search session
    Shell,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,imgseek_core=debug,imgseek=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::build(cli.api_url, cli.store, cli.mock, cli.quiet)?;

    match cli.command {
        Commands::Login { provider } => commands::session::login(&ctx, provider),
        Commands::Callback { address } => commands::session::callback(&ctx, &address),
        Commands::Guest { signal } => commands::session::guest(&ctx, &signal),
        Commands::Whoami => commands::session::whoami(&ctx),
        Commands::Search { term, pages, json } => {
            commands::search::execute(&ctx, &term, pages, json).await
        }
        Commands::History => commands::history::show(&ctx).await,
        Commands::ClearHistory => commands::history::clear(&ctx).await,
        Commands::Top => commands::history::top(&ctx).await,
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Shell => commands::shell::execute(&ctx).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit = match run(cli).await {
        Ok(()) => ExitCode::success(),
        Err(e) => ExitCode::from_anyhow(&e),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
