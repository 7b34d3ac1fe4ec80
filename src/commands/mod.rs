//! Command implementations for Repogen CLI

pub mod completions;
pub mod generate;
pub mod inspect;
