//! Configuration module.
//!
//! Provides CLI argument parsing and configuration management.

#[allow(clippy::module_inception)]
mod config;

pub use config::{AppConfig, BatchArgs, Command, SingleArgs, SynthArgs};
