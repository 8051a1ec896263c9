//! hdx - export a helpdesk account to a local directory tree.
//!
//! This crate provides the core functionality for the `hdx` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`client`] - REST client for the helpdesk API
//! - [`config`] - Configuration loading
//! - [`export`] - Sharded layout, incremental filter, idempotent writes,
//!   bounded dispatch and run summaries
//! - [`model`] - The ticket fields the exporter reads back from disk
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod model;

pub use error::{Error, Result};
