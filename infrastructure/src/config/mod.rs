//! TOML configuration for the roundtable engine

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileEngineConfig, FilePersonaConfig};
pub use loader::ConfigLoader;
