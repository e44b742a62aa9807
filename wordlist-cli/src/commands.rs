use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Subcommand;
use tracing::{error, info, warn};
use wordlist_catalog::models::{Catalog, SearchScope, WordlistRepository};
use wordlist_core::{
    downloader::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY},
    extract, CancellationToken, Downloader, Extracted, TransferOptions, TransferOutcome,
    TransferRequest,
};

use crate::progress::TransferProgress;

#[derive(Subcommand)]
pub enum Commands {
    /// Download wordlists
    Get {
        /// File name of the wordlist to download
        file_name: String,
        /// Directory where you want to store the downloaded wordlist
        destination: PathBuf,
        /// Decompress the wordlist after download
        #[arg(short, long)]
        decompress: bool,
        /// Attempts before giving up on a server that keeps failing
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_ATTEMPTS,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        retries: u32,
        /// Seconds to wait between two attempts
        #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_secs())]
        retry_delay: u64,
    },
    /// Search wordlists
    Search {
        /// What to search
        search_term: String,
        /// Search in group category instead of file name, e.g. discovery, fuzzing
        #[arg(short, long)]
        group: bool,
    },
}

pub async fn handle_get(
    catalog: &Catalog,
    file_name: &str,
    destination: &Path,
    decompress: bool,
    retries: u32,
    retry_delay: u64,
) -> Result<(), ()> {
    let entry = match catalog.resolve(file_name) {
        Ok(entry) => entry,
        Err(e) => {
            error!("{}", e);
            return Err(());
        }
    };

    let request = match TransferRequest::new(&entry.url, destination, decompress) {
        Ok(request) => request,
        Err(e) => {
            error!("{}", e);
            return Err(());
        }
    };

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let options = TransferOptions {
        max_attempts: retries,
        retry_delay: Duration::from_secs(retry_delay),
        ..TransferOptions::default()
    };

    let mut progress = TransferProgress::new();
    let mut downloader = match Downloader::new(options, cancel, |event| progress.on_event(event)) {
        Ok(downloader) => downloader,
        Err(e) => {
            interrupt.abort();
            error!("{}", e);
            return Err(());
        }
    };

    let outcome = downloader.download(&request).await;
    drop(downloader);
    interrupt.abort();

    let path = match outcome {
        Ok(TransferOutcome::Completed { path, .. }) => {
            info!("Download completed: {}", path.display());
            path
        }
        Ok(TransferOutcome::AlreadyExists { path }) => path,
        Ok(TransferOutcome::Cancelled { partial }) => {
            progress.abandon();
            warn!(
                "Interrupted, {} kept. Run again to resume.",
                partial.display()
            );
            return Err(());
        }
        Err(e) => {
            progress.abandon();
            error!(
                "Error while downloading {}: {}",
                request.destination.display(),
                e
            );
            return Err(());
        }
    };

    if request.decompress {
        return handle_decompress(path).await;
    }
    Ok(())
}

async fn handle_decompress(path: PathBuf) -> Result<(), ()> {
    let archive = path.clone();
    let extraction = tokio::task::spawn_blocking(move || extract(&archive));
    let joined = tokio::select! {
        joined = extraction => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted while decompressing {}", path.display());
            return Err(());
        }
    };
    match joined {
        Ok(Ok(Extracted::Tarball { dir, entries })) => {
            info!("Extracted {} entries into {}", entries, dir.display());
            Ok(())
        }
        Ok(Ok(Extracted::Gzip { output })) => {
            info!("Decompressed to {}", output.display());
            Ok(())
        }
        Ok(Ok(Extracted::Unsupported { .. })) => Ok(()),
        Ok(Err(e)) => {
            error!("Unable to decompress {}: {}", path.display(), e);
            Err(())
        }
        Err(e) => {
            error!("Unable to decompress {}: {}", path.display(), e);
            Err(())
        }
    }
}

pub fn handle_search(catalog: &Catalog, search_term: &str, group: bool) -> Result<(), ()> {
    let scope = if group {
        info!("searching in group...");
        SearchScope::Group
    } else {
        SearchScope::Name
    };

    let result = catalog.search(search_term, scope);
    if result.is_empty() {
        error!("no wordlists found");
        return Ok(());
    }

    for found in &result.matches {
        println!("    {}", found);
    }
    Ok(())
}
