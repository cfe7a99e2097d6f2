//! NASA Sky Explorer Library
//!
//! A proxy for NASA's Astronomy Picture of the Day API and a cache-first
//! client for it. Modules are exposed for the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod client;
pub mod data;
pub mod proxy;
