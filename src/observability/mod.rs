//! # Observability Infrastructure
//!
//! Structured logging through `tracing`.

pub mod logging;

pub use logging::{init_logging, log_config_info};
