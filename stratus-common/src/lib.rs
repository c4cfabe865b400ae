//! # Stratus Common
//!
//! Shared utilities for the Stratus crates.
//!
//! ## Logging
//!
//! ```rust,ignore
//! stratus_common::init_logging("info").unwrap();
//! tracing::info!("ready");
//! ```

pub mod logging;

pub use logging::{init_logging, init_logging_json};
