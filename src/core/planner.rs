//! Backward planner: from a revenue goal to the top-of-funnel action
//!
//! The recurrence lives in one table per channel ([`plan_steps`]). The
//! projector walks it in reverse and the Excel exporter generates its
//! formulas from it, so the three never disagree on stage order.

use super::guarded_div;
use crate::types::{
    Channel, FunnelShape, ProgramSettings, ReferenceTargets, Stage, StageValue, TargetField,
};

/// Tolerance absorbed before rounding up, so 100.00000000000001 stays 100
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// What a planning step divides the previous requirement by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divisor {
    /// Offer price, turning revenue into deals
    OfferPrice,
    /// A whole-number percentage target, applied as a fraction
    Rate(TargetField),
}

impl Divisor {
    /// Numeric factor: the price itself, or the rate over 100
    pub fn factor(self, targets: &ReferenceTargets, settings: &ProgramSettings) -> f64 {
        match self {
            Divisor::OfferPrice => settings.offer_price,
            Divisor::Rate(field) => field.get(targets) / 100.0,
        }
    }
}

/// `stage = previous / divisor`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub stage: Stage,
    pub divisor: Divisor,
}

impl PlanStep {
    const fn new(stage: Stage, divisor: Divisor) -> Self {
        Self { stage, divisor }
    }
}

/// Planning recurrence for a channel, from deals down to the final action
pub fn plan_steps(channel: Channel) -> Vec<PlanStep> {
    let mut steps = vec![
        PlanStep::new(Stage::DealsClosed, Divisor::OfferPrice),
        PlanStep::new(Stage::Shows, Divisor::Rate(TargetField::CloseRate)),
        PlanStep::new(Stage::MeetingsScheduled, Divisor::Rate(TargetField::ShowUpRate)),
        PlanStep::new(
            Stage::PositiveReplies,
            Divisor::Rate(TargetField::MeetingBookingRate),
        ),
    ];
    match channel.shape() {
        FunnelShape::AcceptGated => {
            steps.push(PlanStep::new(
                Stage::AcceptedRequests,
                Divisor::Rate(TargetField::PositiveReplyRate),
            ));
            steps.push(PlanStep::new(
                Stage::OutreachSent,
                Divisor::Rate(TargetField::RequestAcceptanceRate),
            ));
        }
        FunnelShape::DirectReply => {
            steps.push(PlanStep::new(
                Stage::OutreachSent,
                Divisor::Rate(TargetField::PositiveReplyRate),
            ));
        }
    }
    steps
}

/// Required volume at every stage to hit the revenue goal. Values are exact.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlan {
    pub channel: Channel,
    pub revenue_goal: f64,
    /// Intermediate requirements, deals first
    pub steps: Vec<StageValue>,
    /// Top-of-funnel volume to produce
    pub final_action: StageValue,
}

impl ActionPlan {
    pub fn value(&self, stage: Stage) -> Option<f64> {
        if self.final_action.stage == stage {
            return Some(self.final_action.value);
        }
        self.steps.iter().find(|s| s.stage == stage).map(|s| s.value)
    }

    /// Final action rounded up to whole units
    pub fn final_action_count(&self) -> f64 {
        round_up_count(self.final_action.value)
    }
}

/// Work backward from the revenue goal through the target rates.
///
/// A zero or negative divisor yields 0 for that stage and every stage
/// after it.
pub fn plan_from_revenue_goal(
    targets: &ReferenceTargets,
    settings: &ProgramSettings,
    channel: Channel,
) -> ActionPlan {
    let mut required = settings.target_revenue_goal;
    let mut values: Vec<StageValue> = plan_steps(channel)
        .into_iter()
        .map(|step| {
            required = guarded_div(required, step.divisor.factor(targets, settings));
            StageValue {
                stage: step.stage,
                value: required,
            }
        })
        .collect();

    // plan_steps always ends on the outreach action
    let final_action = values.pop().unwrap_or(StageValue {
        stage: Stage::OutreachSent,
        value: 0.0,
    });

    ActionPlan {
        channel,
        revenue_goal: settings.target_revenue_goal,
        steps: values,
        final_action,
    }
}

/// Round a required count up to the next whole unit for display
pub fn round_up_count(value: f64) -> f64 {
    if !value.is_finite() || value <= ROUNDING_TOLERANCE {
        0.0
    } else {
        (value - ROUNDING_TOLERANCE).ceil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(price: f64, goal: f64) -> ProgramSettings {
        ProgramSettings {
            offer_name: "Test".to_string(),
            offer_price: price,
            target_revenue_goal: goal,
        }
    }

    fn email_targets() -> ReferenceTargets {
        ReferenceTargets {
            positive_reply_rate: 10.0,
            meeting_booking_rate: 60.0,
            show_up_rate: 80.0,
            close_rate: 20.0,
            avg_deal_value: 5000.0,
            sales_cycle_length: 40.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_step_tables() {
        let lio: Vec<Stage> = plan_steps(Channel::LinkedIn).iter().map(|s| s.stage).collect();
        assert_eq!(
            lio,
            vec![
                Stage::DealsClosed,
                Stage::Shows,
                Stage::MeetingsScheduled,
                Stage::PositiveReplies,
                Stage::AcceptedRequests,
                Stage::OutreachSent,
            ]
        );

        let email = plan_steps(Channel::Email);
        assert_eq!(email.len(), 5);
        assert_eq!(
            email.last().map(|s| s.divisor),
            Some(Divisor::Rate(TargetField::PositiveReplyRate))
        );
    }

    #[test]
    fn test_email_plan() {
        let plan = plan_from_revenue_goal(&email_targets(), &settings(5000.0, 100_000.0), Channel::Email);
        assert_eq!(plan.value(Stage::DealsClosed), Some(20.0));
        assert_eq!(plan.value(Stage::Shows), Some(100.0));
        assert_eq!(plan.value(Stage::MeetingsScheduled), Some(125.0));
        let replies = plan.value(Stage::PositiveReplies).unwrap();
        assert!((replies - 208.333_333).abs() < 1e-3);
        assert!((plan.final_action.value - 2083.333_333).abs() < 1e-3);
        assert_eq!(plan.final_action.stage, Stage::OutreachSent);
        assert_eq!(plan.final_action_count(), 2084.0);
        assert_eq!(plan.value(Stage::AcceptedRequests), None);
    }

    #[test]
    fn test_zero_price_zeroes_everything() {
        let plan = plan_from_revenue_goal(&email_targets(), &settings(0.0, 100_000.0), Channel::LinkedIn);
        assert!(plan.steps.iter().all(|s| s.value == 0.0));
        assert_eq!(plan.final_action.value, 0.0);
    }

    #[test]
    fn test_zero_rate_propagates_downstream() {
        let mut targets = email_targets();
        targets.show_up_rate = 0.0;
        let plan = plan_from_revenue_goal(&targets, &settings(5000.0, 100_000.0), Channel::Email);
        assert_eq!(plan.value(Stage::DealsClosed), Some(20.0));
        assert_eq!(plan.value(Stage::Shows), Some(100.0));
        assert_eq!(plan.value(Stage::MeetingsScheduled), Some(0.0));
        assert_eq!(plan.value(Stage::PositiveReplies), Some(0.0));
        assert_eq!(plan.final_action.value, 0.0);
    }

    #[test]
    fn test_linkedin_zero_acceptance() {
        // acceptance rate 0 only affects the final action
        let targets = ReferenceTargets {
            positive_reply_rate: 10.0,
            ..email_targets()
        };
        let plan = plan_from_revenue_goal(&targets, &settings(5000.0, 100_000.0), Channel::LinkedIn);
        assert!((plan.value(Stage::AcceptedRequests).unwrap() - 2083.333_333).abs() < 1e-3);
        assert_eq!(plan.final_action.value, 0.0);
    }

    #[test]
    fn test_round_up_count() {
        assert_eq!(round_up_count(0.0), 0.0);
        assert_eq!(round_up_count(-3.0), 0.0);
        assert_eq!(round_up_count(100.000_000_000_01), 100.0);
        assert_eq!(round_up_count(100.2), 101.0);
        assert_eq!(round_up_count(208.333), 209.0);
        assert_eq!(round_up_count(f64::NAN), 0.0);
    }
}
