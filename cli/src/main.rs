//! CLI entrypoint for roundtable
//!
//! Wires the layers together: configuration and adapters from the
//! infrastructure crate injected into the application's party service.

mod args;
mod render;

use anyhow::{anyhow, Result};
use args::{Cli, Command};
use clap::Parser;
use roundtable_application::{ContinueTarget, PartyService, RoundResponse};
use roundtable_domain::{AgentId, TurnOrdering};
use roundtable_infrastructure::{
    ConfigLoader, FileConfig, MemoryPersonaCatalog, MemorySessionStore, ScriptedGateway,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Single-user CLI sessions all belong to the same owner
const LOCAL_OWNER: &str = "local";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!(e))?
    };

    match cli.command {
        Command::Run {
            topic,
            agents,
            ordering,
            moderator,
            rounds,
            message,
        } => {
            run_party(
                &config, &topic, &agents, ordering, moderator, rounds, message, cli.json,
            )
            .await
        }
        Command::Personas => list_personas(&config, cli.json).await,
    }
}

async fn build_catalog(config: &FileConfig) -> Arc<MemoryPersonaCatalog> {
    let catalog = Arc::new(MemoryPersonaCatalog::new());
    for (profile, system_prompt) in config.catalog_entries() {
        catalog.register(profile, system_prompt).await;
    }
    if catalog.all().await.is_empty() {
        info!("No personas configured; seeding the built-in demo roster");
        for (profile, prompt) in demo_roster() {
            catalog.register(profile, prompt).await;
        }
    }
    catalog
}

fn demo_roster() -> Vec<(roundtable_domain::PersonaProfile, Option<String>)> {
    use roundtable_domain::PersonaProfile;
    vec![
        (
            PersonaProfile::new("alice", "Alice", "🦊", "engineering")
                .with_capabilities(vec!["architecture".to_string(), "performance".to_string()]),
            Some("You are Alice, a pragmatic systems engineer.".to_string()),
        ),
        (
            PersonaProfile::new("bob", "Bob", "🐻", "design")
                .with_capabilities(vec!["ux".to_string(), "accessibility".to_string()]),
            Some("You are Bob, a detail-oriented product designer.".to_string()),
        ),
        (
            PersonaProfile::new("carol", "Carol", "🐱", "product")
                .with_capabilities(vec!["roadmapping".to_string(), "metrics".to_string()]),
            Some("You are Carol, a data-driven product manager.".to_string()),
        ),
        (
            PersonaProfile::new("maven", "Maven", "🦉", "facilitation")
                .with_capabilities(vec!["summarizing".to_string()]),
            Some("You are Maven, an even-handed discussion moderator.".to_string()),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
async fn run_party(
    config: &FileConfig,
    topic: &str,
    agents: &[String],
    ordering: Option<String>,
    moderator: Option<String>,
    rounds: u32,
    message: Option<String>,
    json: bool,
) -> Result<()> {
    let catalog = build_catalog(config).await;
    let gateway = Arc::new(ScriptedGateway::new());
    let store = Arc::new(MemorySessionStore::new());
    let service = PartyService::new(gateway, catalog, store);

    let mut session_config = config.engine.session_config();
    if let Some(ordering) = &ordering {
        session_config.turn_ordering = TurnOrdering::from_str_lossy(ordering);
    }
    if let Some(moderator) = &moderator {
        session_config = session_config.with_moderator(moderator.as_str());
    }

    let agent_ids: Vec<AgentId> = agents.iter().map(|s| AgentId::new(s.as_str())).collect();
    let outcome = service
        .start_session(LOCAL_OWNER, &agent_ids, topic, Some(session_config), None)
        .await?;

    if !outcome.skipped.is_empty() {
        let skipped: Vec<String> = outcome.skipped.iter().map(|id| id.to_string()).collect();
        eprintln!("Skipped unavailable personas: {}", skipped.join(", "));
    }

    let mut all_responses: Vec<RoundResponse> = Vec::new();
    if !json {
        println!();
        println!("Topic: {}", topic);
        println!();
        render::print_round_header(1);
        render::print_responses(&outcome.responses, &outcome.participants);
    }
    all_responses.extend(outcome.responses);

    let mut total_turns = outcome.total_turns;
    for round in 2..=rounds {
        // The user message (if any) opens the second round
        let user_message = if round == 2 { message.as_deref() } else { None };
        let continued = service
            .continue_session(
                LOCAL_OWNER,
                ContinueTarget::Existing(outcome.session_id.clone()),
                user_message,
                None,
            )
            .await?;
        if !json {
            render::print_round_header(round);
            render::print_responses(&continued.responses, &outcome.participants);
        }
        total_turns = continued.total_turns;
        all_responses.extend(continued.responses);
    }

    if json {
        let payload = serde_json::json!({
            "session_id": outcome.session_id,
            "total_turns": total_turns,
            "responses": all_responses,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{} round(s) played.", total_turns);
    }
    Ok(())
}

async fn list_personas(config: &FileConfig, json: bool) -> Result<()> {
    let catalog = build_catalog(config).await;
    let profiles = catalog.all().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
    } else {
        render::print_personas(&profiles);
    }
    Ok(())
}
