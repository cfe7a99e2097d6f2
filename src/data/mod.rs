//! Core data models for NASA Sky Explorer
//!
//! This module contains the picture record shared by the proxy and the client,
//! date parsing/normalization, and the upstream APOD API client.

pub mod apod;
pub mod date;

pub use apod::{upstream_error_message, ApodClient, ApodError, Upstream, UpstreamReply};
pub use date::{
    first_apod_date, format_date, normalize_date, parse_date, random_date, random_date_between,
    validate_date, DateError, FIRST_APOD_DATE,
};

use serde::{Deserialize, Serialize};

/// Label shown when a record carries no copyright holder
pub const DEFAULT_COPYRIGHT: &str = "NASA";

/// A single Astronomy Picture of the Day entry
///
/// Field names follow the upstream wire format so that records can be stored
/// and forwarded without translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureRecord {
    /// Calendar date of the record (YYYY-MM-DD)
    pub date: String,
    /// Title of the picture
    pub title: String,
    /// Description text
    pub explanation: String,
    /// Whether `url` points at an image or a video
    pub media_type: MediaType,
    /// Resource locator of the standard-resolution media
    pub url: String,
    /// Resource locator of the high-resolution image, if any
    #[serde(rename = "hdurl", default, skip_serializing_if = "Option::is_none")]
    pub hd_url: Option<String>,
    /// Opaque version tag from upstream
    pub service_version: String,
    /// Copyright holder, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

impl PictureRecord {
    /// Returns the copyright holder, or the fallback label when absent
    pub fn copyright_label(&self) -> &str {
        self.copyright.as_deref().unwrap_or(DEFAULT_COPYRIGHT)
    }
}

/// Media kinds published by APOD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}
