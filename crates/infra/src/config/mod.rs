//! Configuration loading
//!
//! Layers defaults, an optional JSON or TOML file and environment variables
//! into a validated [`edubrain_domain::ClientConfig`].

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_file, parse_config, probe_config_paths};
