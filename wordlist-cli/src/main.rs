use std::{path::PathBuf, process};

use clap::Parser;
use commands::{handle_get, handle_search, Commands};
use dotenv::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wordlist_catalog::{load_catalog, models::Catalog};

pub mod commands;
pub mod progress;

/// Search and download wordlists from online archives
#[derive(Parser)]
#[command(name = "wordlistcli", version, arg_required_else_help = true)]
struct WordlistCli {
    /// Catalog file to read instead of the bundled one
    #[arg(long, global = true, env = "WORDLISTCLI_SOURCE")]
    source: Option<PathBuf>,
    /// More output per occurrence (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    commands: Commands,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = WordlistCli::parse();
    init_logging(cli.verbose);

    let catalog = match load(cli.source) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Error while loading repository: {}", e);
            process::exit(1);
        }
    };

    let successful = match cli.commands {
        Commands::Get {
            file_name,
            destination,
            decompress,
            retries,
            retry_delay,
        } => handle_get(
            &catalog,
            &file_name,
            &destination,
            decompress,
            retries,
            retry_delay,
        )
        .await
        .is_ok(),
        Commands::Search { search_term, group } => {
            handle_search(&catalog, &search_term, group).is_ok()
        }
    };

    if !successful {
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: Option<PathBuf>) -> Result<Catalog, wordlist_catalog::errors::CatalogError> {
    match source {
        Some(path) => load_catalog(&path),
        None => Catalog::bundled(),
    }
}
