//! Configuration module
//!
//! Picker display settings, icons, storage location and log filter,
//! loaded from a TOML file.

pub mod config;

pub use config::Config;
