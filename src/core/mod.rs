//! Funnel calculation engine
//!
//! Every function here is pure: it reads a snapshot and returns derived
//! values. Divisions by zero or negative denominators yield 0.

pub mod funnel;
pub mod kpi;
pub mod planner;
pub mod projector;

pub use funnel::{funnel_conversion, revenue_progress};
pub use kpi::{compute_kpis, gap_analysis, GapStatus, KpiGap, KpiMetric, KpiSet, MetricUnit};
pub use planner::{plan_from_revenue_goal, plan_steps, round_up_count, ActionPlan, Divisor, PlanStep};
pub use projector::{project_from_volume, Projection};

/// `numerator / denominator`, or 0 when the denominator is not positive
pub(crate) fn guarded_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is not positive
pub(crate) fn percent_of(numerator: f64, denominator: f64) -> f64 {
    guarded_div(numerator, denominator) * 100.0
}
