//! FCC filings scraper module.

mod client;
mod parser;
mod types;

pub use client::{FccClient, DEFAULT_USER_AGENT};
pub use types::{DownloadStatus, Product};
