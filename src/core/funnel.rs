//! Dashboard-side derived figures: conversion ladder and goal progress

use super::kpi::{KpiMetric, KpiSet};
use super::planner::{plan_steps, Divisor};
use super::percent_of;
use crate::types::{Channel, Stage, StageValue};

/// Conversion ladder normalised to 100 at the top of the funnel.
///
/// Each following stage multiplies the previous one by the current
/// (observed) rate as a fraction. Revenue is not part of the ladder.
pub fn funnel_conversion(kpis: &KpiSet, channel: Channel) -> Vec<StageValue> {
    let steps = plan_steps(channel);
    let mut current = 100.0;
    let mut ladder = vec![StageValue {
        stage: Stage::OutreachSent,
        value: current,
    }];

    for i in (1..steps.len()).rev() {
        if let Divisor::Rate(field) = steps[i].divisor {
            current *= KpiMetric::from_target(field).current(kpis) / 100.0;
            ladder.push(StageValue {
                stage: steps[i - 1].stage,
                value: current,
            });
        }
    }
    ladder
}

/// Share of the revenue goal already earned, capped at 100
pub fn revenue_progress(current_revenue: f64, goal: f64) -> f64 {
    percent_of(current_revenue, goal).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute_kpis;
    use crate::types::AppState;

    #[test]
    fn test_linkedin_ladder() {
        let state = AppState::default();
        let kpis = compute_kpis(
            &state.program_settings,
            &state.linkedin.current_performance,
            Channel::LinkedIn,
        );
        let ladder = funnel_conversion(&kpis, Channel::LinkedIn);
        let values: Vec<f64> = ladder.iter().map(|s| s.value).collect();
        // 30% accept, 10% reply, 50% book, 80% show, 25% close
        let expected = [100.0, 30.0, 3.0, 1.5, 1.2, 0.3];
        assert_eq!(values.len(), expected.len());
        for (got, want) in values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{} != {}", got, want);
        }
        assert_eq!(ladder[1].stage, Stage::AcceptedRequests);
        assert_eq!(ladder.last().map(|s| s.stage), Some(Stage::DealsClosed));
    }

    #[test]
    fn test_direct_reply_ladder() {
        let state = AppState::default();
        let kpis = compute_kpis(
            &state.program_settings,
            &state.email.current_performance,
            Channel::Email,
        );
        let ladder = funnel_conversion(&kpis, Channel::Email);
        assert_eq!(ladder.len(), 5);
        assert_eq!(ladder[1].stage, Stage::PositiveReplies);
        assert!((ladder[1].value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_revenue_progress() {
        assert_eq!(revenue_progress(15_000.0, 100_000.0), 15.0);
        assert_eq!(revenue_progress(150_000.0, 100_000.0), 100.0);
        assert_eq!(revenue_progress(15_000.0, 0.0), 0.0);
    }
}
