//! Turn-ordering strategies for the speaking rotation

pub mod strategy;

pub use strategy::{
    next_speaker, scored_candidates, speakers_for_round, NoJitter, RandomJitter, ScoredSpeaker,
    TieBreaker, MAX_JITTER,
};
