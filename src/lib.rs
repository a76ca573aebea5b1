//! Quartermaster chat bot library
//!
//! Exports the configuration resolver, CLI definitions, logging setup and the
//! bot client for testing and embedding.

pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
