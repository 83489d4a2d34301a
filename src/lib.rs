//! Things 3 to Google Tasks migration library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod google;
pub mod logging;
pub mod migrate;
pub mod things;
