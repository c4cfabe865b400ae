//! # Stratus CLI
//!
//! Drives the adapting strategies from the command line. The provider is the
//! in-memory mock, seeded from the configuration file on every invocation.

pub mod cli;
pub mod commands;
pub mod config;
