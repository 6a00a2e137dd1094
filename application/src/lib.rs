//! Application layer for roundtable
//!
//! Defines the ports the outside world must implement (completion gateway,
//! persona catalog, session store) and the use cases that drive party-mode
//! discussions through them. Depends only on the domain layer.

pub mod ports;
pub mod use_cases;

pub use ports::{CompletionGateway, GatewayError, PersonaCatalog, SessionStore};
pub use use_cases::{
    ContinueOutcome, ContinueTarget, ContributionKind, PartyService, RoundResponse,
    SessionSummary, StartOutcome,
};
