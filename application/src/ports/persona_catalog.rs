//! Persona catalog port
//!
//! Resolves an agent identifier to display metadata and a system prompt.
//! The orchestration engine consumes only the profile; everything else about
//! a persona (markdown sources, capability tagging, categories) is the
//! catalog's concern.

use async_trait::async_trait;
use roundtable_domain::{AgentId, PersonaProfile};

/// Catalog of conversational personas
#[async_trait]
pub trait PersonaCatalog: Send + Sync {
    /// Resolve an id to its profile, or `None` when unknown
    async fn resolve(&self, id: &AgentId) -> Option<PersonaProfile>;

    /// The persona's own system prompt, when it declares one
    async fn system_prompt(&self, id: &AgentId) -> Option<String>;
}
