//! Forward projector: what a given outreach volume yields at target rates

use super::planner::plan_steps;
use crate::types::{Channel, ProgramSettings, ReferenceTargets, Stage, StageValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub channel: Channel,
    pub volume: f64,
    /// Every stage after the input volume, ending with revenue
    pub stages: Vec<StageValue>,
}

impl Projection {
    pub fn value(&self, stage: Stage) -> Option<f64> {
        if stage == Stage::OutreachSent {
            return Some(self.volume);
        }
        self.stages.iter().find(|s| s.stage == stage).map(|s| s.value)
    }

    pub fn revenue(&self) -> f64 {
        self.value(Stage::Revenue).unwrap_or(0.0)
    }
}

/// Multiply `volume` through the target rates and offer price.
///
/// Walks the planning table from the outreach end: each step's divisor
/// becomes a multiplier and the result belongs to the step before it.
pub fn project_from_volume(
    targets: &ReferenceTargets,
    settings: &ProgramSettings,
    channel: Channel,
    volume: f64,
) -> Projection {
    let steps = plan_steps(channel);
    let mut current = volume.max(0.0);
    let mut stages = Vec::with_capacity(steps.len());

    for i in (0..steps.len()).rev() {
        current *= steps[i].divisor.factor(targets, settings);
        let stage = if i == 0 {
            Stage::Revenue
        } else {
            steps[i - 1].stage
        };
        stages.push(StageValue {
            stage,
            value: current,
        });
    }

    Projection {
        channel,
        volume: volume.max(0.0),
        stages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProgramSettings {
        ProgramSettings {
            offer_name: "Test".to_string(),
            offer_price: 5000.0,
            target_revenue_goal: 100_000.0,
        }
    }

    fn targets() -> ReferenceTargets {
        ReferenceTargets {
            request_acceptance_rate: 35.0,
            positive_reply_rate: 15.0,
            meeting_booking_rate: 50.0,
            show_up_rate: 85.0,
            close_rate: 25.0,
            avg_deal_value: 5000.0,
            sales_cycle_length: 25.0,
        }
    }

    #[test]
    fn test_linkedin_projection_order() {
        let projection = project_from_volume(&targets(), &settings(), Channel::LinkedIn, 1000.0);
        let order: Vec<Stage> = projection.stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            order,
            vec![
                Stage::AcceptedRequests,
                Stage::PositiveReplies,
                Stage::MeetingsScheduled,
                Stage::Shows,
                Stage::DealsClosed,
                Stage::Revenue,
            ]
        );
        assert!((projection.value(Stage::AcceptedRequests).unwrap() - 350.0).abs() < 1e-9);
        assert!((projection.value(Stage::PositiveReplies).unwrap() - 52.5).abs() < 1e-9);
        assert!((projection.value(Stage::MeetingsScheduled).unwrap() - 26.25).abs() < 1e-9);
        assert!((projection.value(Stage::Shows).unwrap() - 22.3125).abs() < 1e-9);
        assert!((projection.value(Stage::DealsClosed).unwrap() - 5.578125).abs() < 1e-9);
        assert!((projection.revenue() - 27_890.625).abs() < 1e-6);
    }

    #[test]
    fn test_direct_reply_skips_acceptance() {
        let projection = project_from_volume(&targets(), &settings(), Channel::Email, 1000.0);
        assert_eq!(projection.stages.len(), 5);
        assert_eq!(projection.value(Stage::AcceptedRequests), None);
        assert!((projection.value(Stage::PositiveReplies).unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_volume() {
        let projection = project_from_volume(&targets(), &settings(), Channel::FacebookInstagram, 0.0);
        assert!(projection.stages.iter().all(|s| s.value == 0.0));
    }
}
