//! Infrastructure layer for roundtable
//!
//! Adapters filling the application layer's ports: in-memory session
//! storage, the persona catalog, the scripted completion gateway, and the
//! TOML configuration loader.

pub mod catalog;
pub mod config;
pub mod gateway;
pub mod store;

pub use catalog::MemoryPersonaCatalog;
pub use config::{ConfigLoader, FileConfig, FileEngineConfig, FilePersonaConfig};
pub use gateway::ScriptedGateway;
pub use store::MemorySessionStore;
