//! Command-line interface parsing for NASA Sky Explorer
//!
//! This module handles parsing of CLI arguments using clap. `serve` settings
//! fall back to environment variables so the proxy can be configured the same
//! way in containers and serverless platforms.

use std::time::Duration;

use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::client::DEFAULT_API_BASE;
use crate::data::apod::APOD_BASE_URL;
use crate::data::{validate_date, DateError, PictureRecord};
use crate::proxy::{ProxyConfig, RateLimit};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A date argument was unparsable or too early
    #[error(transparent)]
    InvalidDate(#[from] DateError),

    /// Only one half of the rate limit pair was given
    #[error("Rate limiting needs both RATE_LIMIT_WINDOW_SECS and RATE_LIMIT_MAX")]
    IncompleteRateLimit,

    /// A rate limit value was zero
    #[error("Rate limit window and count must be greater than zero")]
    InvalidRateLimit,
}

/// NASA Sky Explorer - proxy and cached viewer for the Astronomy Picture of the Day
#[derive(Parser, Debug)]
#[command(name = "skyexplorer")]
#[command(about = "Astronomy Picture of the Day proxy and cached viewer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the APOD proxy server
    Serve(ServeArgs),
    /// Show the picture for a date, using the local cache when possible
    Show(ShowArgs),
    /// Manage saved favorites
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

/// Proxy server settings
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// NASA API key used for upstream requests
    #[arg(long, env = "NASA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Answer with a placeholder record instead of calling NASA
    #[arg(long, env = "APOD_MOCK_MODE", value_parser = BoolishValueParser::new())]
    pub mock: bool,

    /// Only origin allowed to make cross-origin requests
    #[arg(long, env = "CLIENT_ORIGIN")]
    pub client_origin: Option<String>,

    /// Rate limit window in seconds (requires --rate-limit-max)
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: Option<u64>,

    /// Requests allowed per rate limit window (requires --rate-limit-window-secs)
    #[arg(long, env = "RATE_LIMIT_MAX")]
    pub rate_limit_max: Option<u64>,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Upstream APOD endpoint
    #[arg(long, env = "APOD_UPSTREAM_URL", default_value = APOD_BASE_URL)]
    pub upstream_url: String,
}

impl ServeArgs {
    /// Builds the proxy configuration from the parsed arguments.
    ///
    /// # Returns
    /// * `Ok(ProxyConfig)` with rate limiting enabled only when both values are set
    /// * `Err(CliError)` if exactly one rate limit value is set, or either is zero
    pub fn proxy_config(&self) -> Result<ProxyConfig, CliError> {
        let rate_limit = match (self.rate_limit_window_secs, self.rate_limit_max) {
            (None, None) => None,
            (Some(0), _) | (_, Some(0)) => return Err(CliError::InvalidRateLimit),
            (Some(window), Some(max_requests)) => Some(RateLimit {
                max_requests,
                window: Duration::from_secs(window),
            }),
            _ => return Err(CliError::IncompleteRateLimit),
        };

        Ok(ProxyConfig {
            api_key: self.api_key.clone(),
            mock_mode: self.mock,
            allowed_origin: self.client_origin.clone(),
            rate_limit,
        })
    }
}

/// Settings for `show`
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Date to show (defaults to today, UTC)
    #[arg(long)]
    pub date: Option<String>,

    /// Show a random day since the first APOD
    #[arg(long, conflicts_with = "date")]
    pub random: bool,

    /// Base URL of the proxy
    #[arg(long, env = "APOD_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// List saved favorites
    List,
    /// Save the picture for a date
    Add {
        /// Date to save
        date: String,

        /// Base URL of the proxy
        #[arg(long, env = "APOD_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,
    },
    /// Remove the picture saved for a date
    Remove {
        /// Date to remove
        date: String,
    },
}

/// Parses and validates a date argument.
///
/// # Arguments
/// * `s` - The date string from the command line
///
/// # Returns
/// * `Ok(NaiveDate)` for any parsable date on or after 1995-06-16
/// * `Err(CliError::InvalidDate)` otherwise
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    Ok(validate_date(s)?)
}

/// Renders a record for terminal output
pub fn render_record(record: &PictureRecord) -> String {
    let mut out = format!("{}\n{}\n\n{}\n\n", record.title, record.date, record.explanation);
    out.push_str(&format!("{:?}: {}\n", record.media_type, record.url));
    if let Some(hd_url) = &record.hd_url {
        out.push_str(&format!("HD: {}\n", hd_url));
    }
    out.push_str(&format!("© {}", record.copyright_label()));
    out
}
