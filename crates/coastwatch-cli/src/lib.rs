//! coastwatch command-line client.
//!
//! Loads `config.toml`, builds the providers and the pipeline from it, runs
//! one pipeline pass per invocation and prints the result as text or JSON.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod secret;
