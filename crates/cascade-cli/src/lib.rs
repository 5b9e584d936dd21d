//! Command-line definitions and settings for the `cascade` binary.

pub mod cli;
pub mod config;
