//! CLI command implementations
//!
//! - start: run the web server
//! - config: show or validate the effective configuration

pub mod config;
pub mod start;
