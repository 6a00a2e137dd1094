//! Raw TOML configuration data types
//!
//! These structs mirror the structure of the config file exactly. Conversion
//! into domain types is lossy on purpose: an unknown turn-ordering string
//! falls back to round-robin instead of failing startup.

use chrono::Duration;
use roundtable_domain::{PersonaProfile, SessionConfig, TurnOrdering};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Engine-level defaults for new sessions
    pub engine: FileEngineConfig,
    /// Personas available to the catalog
    pub personas: Vec<FilePersonaConfig>,
}

impl FileConfig {
    /// Profiles plus optional system prompts, ready to seed the catalog
    pub fn catalog_entries(&self) -> Vec<(PersonaProfile, Option<String>)> {
        self.personas
            .iter()
            .map(|p| (p.profile(), p.system_prompt.clone()))
            .collect()
    }
}

/// `[engine]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Default turn ordering for new sessions
    pub turn_ordering: String,
    /// Persona id acting as moderator unless a session overrides it
    pub default_moderator: Option<String>,
    /// Advisory round budget per session
    pub max_turns: u32,
    /// Sessions idle longer than this many hours are reclaimed
    pub idle_sweep_hours: i64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            turn_ordering: "round-robin".to_string(),
            default_moderator: None,
            max_turns: 10,
            idle_sweep_hours: 24,
        }
    }
}

impl FileEngineConfig {
    /// Session defaults derived from this section
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::default()
            .with_turn_ordering(TurnOrdering::from_str_lossy(&self.turn_ordering));
        if let Some(moderator) = &self.default_moderator {
            config = config.with_moderator(moderator.as_str());
        }
        config.max_turns = self.max_turns;
        config
    }

    pub fn idle_sweep_age(&self) -> Duration {
        Duration::hours(self.idle_sweep_hours)
    }
}

/// One `[[personas]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePersonaConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_icon() -> String {
    "💬".to_string()
}

impl FilePersonaConfig {
    pub fn profile(&self) -> PersonaProfile {
        PersonaProfile::new(
            self.id.as_str(),
            self.name.as_str(),
            self.icon.as_str(),
            self.category.as_str(),
        )
        .with_capabilities(self.capabilities.clone())
    }
}
