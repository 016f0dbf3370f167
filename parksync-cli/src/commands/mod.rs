//! CLI subcommands.

pub mod common;
pub mod config;
pub mod refresh;
pub mod serve;
pub mod sweep;
