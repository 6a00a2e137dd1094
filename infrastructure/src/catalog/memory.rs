//! In-process persona catalog
//!
//! Personas are registered up front (usually from the TOML config) and
//! resolved by id. Lookup is case-insensitive because [`AgentId`] normalizes
//! on construction.

use async_trait::async_trait;
use roundtable_application::PersonaCatalog;
use roundtable_domain::{AgentId, PersonaProfile};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct CatalogEntry {
    profile: PersonaProfile,
    system_prompt: Option<String>,
}

/// In-memory implementation of [`PersonaCatalog`]
#[derive(Default)]
pub struct MemoryPersonaCatalog {
    entries: RwLock<HashMap<AgentId, CatalogEntry>>,
}

impl MemoryPersonaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persona, replacing any previous entry with the same id
    pub async fn register(&self, profile: PersonaProfile, system_prompt: Option<String>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            profile.id.clone(),
            CatalogEntry {
                profile,
                system_prompt,
            },
        );
    }

    /// All registered profiles, sorted by id for stable listings
    pub async fn all(&self) -> Vec<PersonaProfile> {
        let entries = self.entries.read().await;
        let mut profiles: Vec<PersonaProfile> =
            entries.values().map(|e| e.profile.clone()).collect();
        profiles.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        profiles
    }
}

#[async_trait]
impl PersonaCatalog for MemoryPersonaCatalog {
    async fn resolve(&self, id: &AgentId) -> Option<PersonaProfile> {
        self.entries.read().await.get(id).map(|e| e.profile.clone())
    }

    async fn system_prompt(&self, id: &AgentId) -> Option<String> {
        self.entries
            .read()
            .await
            .get(id)
            .and_then(|e| e.system_prompt.clone())
    }
}
