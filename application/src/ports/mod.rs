//! Ports: interfaces the application layer expects its collaborators to fill

pub mod completion_gateway;
pub mod persona_catalog;
pub mod session_store;

pub use completion_gateway::{CompletionGateway, GatewayError};
pub use persona_catalog::PersonaCatalog;
pub use session_store::SessionStore;
