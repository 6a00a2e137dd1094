//! Participants and their catalog profiles

pub mod entities;

pub use entities::{Participant, PersonaProfile};
