//! Configuration loading and management
//!
//! This module provides utilities for loading sandbox configuration from
//! environment variables and files, and for reading the variables and
//! secrets input files.

pub mod loader;

// Re-export commonly used items
pub use loader::{
    load, load_from_env, load_from_file, load_secrets, load_variables, probe_config_paths,
};
