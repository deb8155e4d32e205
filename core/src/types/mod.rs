//! Plain data shared across the crate: commands, results, configuration.

pub mod command;
pub mod config;
pub mod result;
