//! Outreach Roadmap - funnel planning for outbound sales channels
//!
//! Given an offer, observed funnel counts and target conversion rates for
//! each outreach channel, this library computes:
//!
//! - current KPIs and their gap to target
//! - a forward projection of what an outreach volume yields
//! - a backward action plan from a revenue goal to the outreach volume
//! - a styled Excel report with live formulas
//!
//! # Example
//!
//! ```
//! use outreach_roadmap::core::{compute_kpis, plan_from_revenue_goal};
//! use outreach_roadmap::types::{AppState, Channel};
//!
//! let state = AppState::default();
//! let data = state.channel(Channel::Email);
//!
//! let kpis = compute_kpis(&state.program_settings, &data.current_performance, Channel::Email);
//! assert_eq!(kpis.current_revenue, 25_000.0);
//!
//! let plan = plan_from_revenue_goal(&data.reference_targets, &state.program_settings, Channel::Email);
//! assert_eq!(plan.final_action_count(), 2084.0);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::RoadmapConfig;
pub use error::{RoadmapError, RoadmapResult};
pub use types::{AppState, Channel};
