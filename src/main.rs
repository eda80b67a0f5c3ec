//! # RunRepeat Bridge
//!
//! Feed bridge for the shoe review site [RunRepeat](https://runrepeat.com):
//! scrapes the newest review articles for a shoe category and emits them as
//! JSON Feed and/or Atom documents.
//!
//! ## Usage
//!
//! ```sh
//! runrepeat_bridge -s running-shoes -n 3 -j feed.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Listing scan**: open the catalog for the requested category, sorted
//!    newest first, and extract up to 30 article summaries
//! 2. **Detail extraction**: per summary, fetch the review page and build
//!    the HTML content fragment, preferring the 7-day article cache
//! 3. **Output**: serialize the collection as JSON Feed / Atom
//!
//! Pages come from one of two interchangeable sources: a headless Chrome
//! session that walks the site's consent and sort UI (default, cargo
//! feature `browser`), or a plain HTTP fetcher (`--static-fetch`).

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cache;
mod cli;
mod collector;
mod dom;
mod error;
mod models;
mod outputs;
mod sources;
mod utils;

use cache::{ArticleCache, FileCache, MemoryCache};
use cli::Cli;
use collector::Collector;
use error::BridgeError;
use models::{Collection, ARTICLE_CACHE_TTL};
#[cfg(feature = "browser")]
use sources::browser::BrowserSource;
use sources::fetch::FetchSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    info!(
        shoe_type = %args.shoe_type,
        limit = args.limit,
        static_fetch = args.static_fetch,
        "runrepeat bridge starting up"
    );

    let cache: Box<dyn ArticleCache> = match &args.cache_file {
        Some(path) => {
            debug!(%path, "using file-backed article cache");
            Box::new(FileCache::open(path, ARTICLE_CACHE_TTL).await?)
        }
        None => Box::new(MemoryCache::new(ARTICLE_CACHE_TTL)),
    };

    let collection = collect(&args, cache).await?;
    info!(
        items = collection.items.len(),
        icon = collection.icon.is_some(),
        "collection finished"
    );

    if let Some(path) = &args.json_output {
        outputs::json::write_feed(&collection, args.shoe_type, path).await?;
    }
    if let Some(path) = &args.atom_output {
        outputs::atom::write_feed(&collection, args.shoe_type, path).await?;
    }
    if args.json_output.is_none() && args.atom_output.is_none() {
        println!("{}", outputs::json::render_feed(&collection, args.shoe_type)?);
    }

    Ok(())
}

/// Run the collector against the backend selected on the command line.
async fn collect(args: &Cli, cache: Box<dyn ArticleCache>) -> Result<Collection, BridgeError> {
    if args.static_fetch {
        let source = FetchSource::new()?;
        let collector = Collector::new(source, cache, args.lab_sections);
        return Ok(collector.collect(args.shoe_type, args.limit).await);
    }

    #[cfg(feature = "browser")]
    {
        let source = BrowserSource::launch()?;
        let collector = Collector::new(source, cache, args.lab_sections);
        return Ok(collector.collect(args.shoe_type, args.limit).await);
    }

    #[cfg(not(feature = "browser"))]
    {
        tracing::warn!("built without the browser feature; falling back to static fetch");
        let source = FetchSource::new()?;
        let collector = Collector::new(source, cache, args.lab_sections);
        return Ok(collector.collect(args.shoe_type, args.limit).await);
    }
}
