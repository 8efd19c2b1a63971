//! HTTP client and page scraping for the coinshell crypto terminal.
//!
//! This crate provides the network layer every provider sits on:
//!
//! - [`ApiClient`] - HTTP client with timeouts, retries and backoff
//! - [`url::Endpoints`] - Configurable upstream base URLs
//! - [`scrape::parse_table`] - Header/body extraction from HTML tables
//! - [`scrape::parse_cards`] - Link lists from card-style page sections
//! - [`scrape::parse_blocks`] - Text fragments of every element matching a selector

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/coinshell/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
pub mod scrape;
pub mod url;

pub use client::{ApiClient, ClientConfig, FetchError};
pub use scrape::{ScrapedRow, ScrapedTable};
pub use url::Endpoints;
