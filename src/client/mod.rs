//! Client side of the proxy
//!
//! Loads picture records through the proxy with a persisted, date-keyed cache
//! in front of it.

mod fetcher;
mod hook;

pub use fetcher::{parse_record, ClientError, HttpFetcher, PictureFetcher, DEFAULT_API_BASE};
pub use hook::{PictureHook, PictureState};
