//! Console rendering for party transcripts

use colored::Colorize;
use roundtable_application::{ContributionKind, RoundResponse};
use roundtable_domain::{Participant, PersonaProfile};

/// Print one round's contributions as a readable transcript block
pub fn print_responses(responses: &[RoundResponse], participants: &[Participant]) {
    for response in responses {
        let icon = participants
            .iter()
            .find(|p| p.agent_id == response.agent_id)
            .map(|p| p.icon.as_str())
            .unwrap_or("💬");

        let header = format!("{} {}", icon, response.display_name);
        let header = match response.kind {
            ContributionKind::ModeratorIntro => {
                format!("{} {}", header.cyan().bold(), "(intro)".dimmed())
            }
            ContributionKind::ModeratorSummary => {
                format!("{} {}", header.cyan().bold(), "(summary)".dimmed())
            }
            ContributionKind::ModeratorDirection => {
                format!("{} {}", header.cyan().bold(), "(direction)".dimmed())
            }
            ContributionKind::Contribution => header.green().bold().to_string(),
        };

        println!("{}", header);
        if response.success {
            println!("{}", response.content);
        } else {
            println!("{}", response.content.red());
        }
        println!();
    }
}

pub fn print_round_header(round: u32) {
    println!("{}", format!("─── Round {} ───", round).dimmed());
    println!();
}

/// Print the persona catalog as a listing
pub fn print_personas(profiles: &[PersonaProfile]) {
    for profile in profiles {
        let capabilities = if profile.capabilities.is_empty() {
            String::new()
        } else {
            format!("  [{}]", profile.capabilities.join(", "))
        };
        println!(
            "{} {}  {} {}{}",
            profile.icon,
            profile.id.to_string().bold(),
            profile.name,
            format!("({})", profile.category).dimmed(),
            capabilities.dimmed()
        );
    }
}
