//! Prompt templates for the party flow

use crate::participant::Participant;

/// Templates for the prompts handed to the completion provider at each
/// facilitation point. These decide *what to ask for*; generation itself is
/// always the provider's job.
pub struct PartyPromptTemplate;

impl PartyPromptTemplate {
    /// System prompt for a moderator persona with no catalog prompt of its own
    pub fn moderator_system() -> &'static str {
        r#"You are the moderator of a panel discussion between several personas.
Your job is to keep the conversation focused, give everyone room to speak,
and periodically pull the threads together. You do not argue positions of
your own. Be brief and structured."#
    }

    /// System prompt for a regular participant with no catalog prompt of its own
    pub fn participant_system() -> &'static str {
        r#"You are a named persona taking part in a panel discussion.
Speak in your own voice, stay on topic, and build on what previous speakers
said rather than repeating it. Address other participants by name when you
respond to their points."#
    }

    /// Context block appended to every participant's system prompt so each
    /// persona knows who else is at the table.
    pub fn party_context(topic: &str, own_name: &str, others: &[&Participant]) -> String {
        let roster = others
            .iter()
            .map(|p| format!("{} {}", p.icon, p.display_name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"Discussion topic: {}
You are speaking as {}. Also at the table: {}."#,
            topic, own_name, roster
        )
    }

    /// Instruction for a regular contribution within the current round.
    ///
    /// `user_context` is extra framing supplied by whoever opened the round;
    /// it reaches every speaker in that round verbatim.
    pub fn contribution_prompt(topic: &str, user_context: Option<&str>) -> String {
        let mut prompt = format!(
            r#"Contribute your perspective on the topic: {}

Keep it short. If earlier speakers made points this round, react to them.
You may hand the floor to another participant with an @mention."#,
            topic
        );
        if let Some(extra) = user_context {
            prompt.push_str(&format!("\n\nAdditional context from the user: {}", extra));
        }
        prompt
    }

    /// Instruction for the moderator to open the discussion
    pub fn intro_prompt(topic: &str, participants: &[&Participant]) -> String {
        let mut prompt = format!(
            r#"You are opening a panel discussion on the topic: {}

The participants are:
"#,
            topic
        );

        for p in participants {
            prompt.push_str(&format!("- {} {}\n", p.icon, p.display_name));
        }

        prompt.push_str(
            r#"
Introduce the topic in two or three sentences, welcome the participants,
and pose one concrete starting question to the group."#,
        );

        prompt
    }

    /// Instruction for the moderator to summarize the completed round.
    ///
    /// `contributions` are the round's non-summary assistant messages,
    /// attributed by display name.
    pub fn summary_prompt(topic: &str, contributions: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Topic under discussion: {}

This round's contributions:
"#,
            topic
        );

        for (name, content) in contributions {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", name, content));
        }

        prompt.push_str(
            r#"
Summarize the points of agreement and disagreement in a few sentences.
Then either suggest a direction for the next round or ask the group one
follow-up question."#,
        );

        prompt
    }

    /// Instruction for the moderator to hand the floor to a specific
    /// participant, citing up to three of their declared capabilities.
    pub fn direction_prompt(target: &Participant, capabilities: &[String], context: Option<&str>) -> String {
        let cited = capabilities
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            "Address {} directly and invite them to speak next.",
            target.display_name
        );
        if !cited.is_empty() {
            prompt.push_str(&format!(
                " Their background in {} is relevant here.",
                cited
            ));
        }
        if let Some(context) = context {
            prompt.push_str(&format!(" Current thread: {}", context));
        }
        prompt
    }
}
