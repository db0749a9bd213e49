//! CLI command handlers

pub mod commands;
pub mod display;

pub use commands::{dump, export, load, plan, project, reset, select, set, show, watch};
