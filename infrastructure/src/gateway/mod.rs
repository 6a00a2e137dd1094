//! Completion gateway adapters

mod scripted;

pub use scripted::ScriptedGateway;
