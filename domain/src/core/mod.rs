//! Core domain types shared across modules

pub mod error;
pub mod ids;
pub mod topic;
