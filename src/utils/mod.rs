//! Utility functions and helpers
//!
//! Paths for config and persisted layouts, plus the tracing setup.

pub mod app_paths;
pub mod logging;
