//! `@mention` scanning and floor-handoff resolution

pub mod parser;

pub use parser::{find_handoff, handoff_target, parse_mentions, MentionScan};
