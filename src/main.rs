//! NASA Sky Explorer - Astronomy Picture of the Day proxy and viewer
//!
//! `serve` runs the HTTP proxy; `show` and `favorites` use the cache-first
//! client against a running proxy.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skyexplorer::cache::{FavoriteSet, FileStore, KeyValueStore, MemoryStore};
use skyexplorer::cli::{
    parse_date_arg, render_record, Cli, Command, FavoritesCommand, ServeArgs, ShowArgs,
};
use skyexplorer::client::{HttpFetcher, PictureHook};
use skyexplorer::data::{format_date, random_date, ApodClient, PictureRecord};
use skyexplorer::proxy::{create_router, AppState};

/// Sets up logging to stderr so command output stays clean
///
/// `RUST_LOG` takes full filter directives (`skyexplorer=debug,tower_http=info`);
/// unset or invalid falls back to `info`.
fn init_tracing() {
    FmtSubscriber::builder()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Opens the persisted client store, falling back to memory
fn open_store() -> Arc<dyn KeyValueStore> {
    match FileStore::new() {
        Some(store) => Arc::new(store),
        None => {
            warn!("no cache directory available; cache and favorites will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.proxy_config()?;
    if config.mock_mode {
        info!("Mock mode enabled; upstream will not be called");
    } else if config.api_key().is_none() {
        warn!("NASA_API_KEY is not set; /api/apod will answer 500");
    }

    let upstream = Arc::new(ApodClient::with_base_url(args.upstream_url.clone()));
    let app = create_router(AppState::new(upstream, config));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads a record through the cache hook, failing with its error message
async fn load_record(
    store: Arc<dyn KeyValueStore>,
    api_base: &str,
    date: chrono::NaiveDate,
) -> anyhow::Result<PictureRecord> {
    let hook = PictureHook::new(HttpFetcher::new(api_base), store);
    let state = hook.load(date, false).await;
    match (state.record, state.error) {
        (Some(record), _) => Ok(record),
        (None, Some(error)) => bail!(error),
        (None, None) => bail!("No record loaded for {}", format_date(date)),
    }
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let date = match args.date.as_deref() {
        Some(raw) => parse_date_arg(raw)?,
        None if args.random => random_date(),
        None => Utc::now().date_naive(),
    };

    let record = load_record(open_store(), &args.api_base, date).await?;
    println!("{}", render_record(&record));
    Ok(())
}

async fn favorites(command: FavoritesCommand) -> anyhow::Result<()> {
    let store = open_store();

    match command {
        FavoritesCommand::List => {
            let favorites = FavoriteSet::load(store);
            if favorites.is_empty() {
                println!("No favorites saved yet.");
            }
            for fav in favorites.list() {
                println!("{}  {}", fav.date, fav.title);
            }
        }
        FavoritesCommand::Add { date, api_base } => {
            let date = parse_date_arg(&date)?;
            let record = load_record(store.clone(), &api_base, date).await?;
            let outcome = FavoriteSet::load(store).add(record)?;
            println!("{}", outcome);
        }
        FavoritesCommand::Remove { date } => {
            let date = format_date(parse_date_arg(&date)?);
            if FavoriteSet::load(store).remove(&date)? {
                println!("Removed {} from favorites", date);
            } else {
                println!("{} is not in favorites", date);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Show(args) => show(args).await,
        Command::Favorites(command) => favorites(command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_keeps_target_directives() {
        let filter = log_filter(Some("skyexplorer=debug,tower_http=warn".to_string()));
        let rendered = filter.to_string();
        assert!(rendered.contains("skyexplorer=debug"), "{rendered}");
        assert!(rendered.contains("tower_http=warn"), "{rendered}");
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("skyexplorer=verbose".to_string())).to_string(), "info");
    }
}
