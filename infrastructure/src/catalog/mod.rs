//! Persona catalog adapters

mod memory;

pub use memory::MemoryPersonaCatalog;
