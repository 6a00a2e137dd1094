//! Prompt assembly for participants and the moderator

pub mod template;

pub use template::PartyPromptTemplate;
