//! CLI command modules.

pub mod hash;
pub mod knock;
