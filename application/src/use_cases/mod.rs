//! Use cases: application services orchestrating the domain through ports

pub mod outcomes;
pub mod party_service;

pub use outcomes::{
    ContinueOutcome, ContributionKind, RoundResponse, SessionSummary, StartOutcome,
};
pub use party_service::{ContinueTarget, PartyService};
