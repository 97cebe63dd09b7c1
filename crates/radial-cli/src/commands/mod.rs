//! Subcommand implementations.

pub mod clear;
pub mod index;
pub mod launch;
pub mod menu;
pub mod query;
pub mod status;
