//! When the moderator speaks: intro and per-round summary checks

pub mod facilitator;

pub use facilitator::{has_moderator, should_intro, should_summarize};
