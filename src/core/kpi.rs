//! KPI calculator and gap analysis

use super::{guarded_div, percent_of};
use crate::types::{Channel, FunnelShape, PerformanceData, ProgramSettings, ReferenceTargets, TargetField};

/// Derived KPIs for one channel. Rates are percentages (30.0 = 30%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSet {
    pub request_acceptance_rate: f64,
    pub positive_reply_rate: f64,
    pub meeting_booking_rate: f64,
    pub show_up_rate: f64,
    pub close_rate: f64,
    pub sales_cycle_length: f64,
    pub current_revenue: f64,
    pub avg_deal_value: f64,
}

/// Compute funnel KPIs from observed performance.
///
/// Direct-reply channels measure positive replies against total volume
/// sent, not against `total_replies`. Rates above 100% are returned as-is
/// when the counts are inconsistent.
pub fn compute_kpis(
    settings: &ProgramSettings,
    performance: &PerformanceData,
    channel: Channel,
) -> KpiSet {
    let current_revenue = performance.deals_closed * settings.offer_price;

    let (request_acceptance_rate, positive_reply_rate) = match channel.shape() {
        FunnelShape::AcceptGated => (
            percent_of(
                performance.total_accepted_requests,
                performance.connection_requests_sent,
            ),
            percent_of(
                performance.positive_replies,
                performance.total_accepted_requests,
            ),
        ),
        FunnelShape::DirectReply => (
            0.0,
            percent_of(performance.positive_replies, performance.messages_sent),
        ),
    };

    let avg_deal_value = if performance.deals_closed > 0.0 {
        guarded_div(current_revenue, performance.deals_closed)
    } else {
        settings.offer_price
    };

    KpiSet {
        request_acceptance_rate,
        positive_reply_rate,
        meeting_booking_rate: percent_of(
            performance.meetings_scheduled,
            performance.positive_replies,
        ),
        show_up_rate: percent_of(performance.total_shows, performance.meetings_scheduled),
        close_rate: percent_of(performance.deals_closed, performance.total_shows),
        sales_cycle_length: performance.sales_cycle_length,
        current_revenue,
        avg_deal_value,
    }
}

/// How a metric is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Percent,
    Currency,
    Days,
}

/// Metrics compared against reference targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiMetric {
    RequestAcceptanceRate,
    PositiveReplyRate,
    MeetingBookingRate,
    ShowUpRate,
    CloseRate,
    AvgDealValue,
    SalesCycleLength,
}

impl KpiMetric {
    /// Gap-analysis rows for a channel, in display order
    pub fn for_channel(channel: Channel) -> Vec<KpiMetric> {
        TargetField::for_channel(channel)
            .iter()
            .map(|field| KpiMetric::from_target(*field))
            .collect()
    }

    pub fn from_target(field: TargetField) -> KpiMetric {
        match field {
            TargetField::RequestAcceptanceRate => KpiMetric::RequestAcceptanceRate,
            TargetField::PositiveReplyRate => KpiMetric::PositiveReplyRate,
            TargetField::MeetingBookingRate => KpiMetric::MeetingBookingRate,
            TargetField::ShowUpRate => KpiMetric::ShowUpRate,
            TargetField::CloseRate => KpiMetric::CloseRate,
            TargetField::AvgDealValue => KpiMetric::AvgDealValue,
            TargetField::SalesCycleLength => KpiMetric::SalesCycleLength,
        }
    }

    pub fn target_field(self) -> TargetField {
        match self {
            KpiMetric::RequestAcceptanceRate => TargetField::RequestAcceptanceRate,
            KpiMetric::PositiveReplyRate => TargetField::PositiveReplyRate,
            KpiMetric::MeetingBookingRate => TargetField::MeetingBookingRate,
            KpiMetric::ShowUpRate => TargetField::ShowUpRate,
            KpiMetric::CloseRate => TargetField::CloseRate,
            KpiMetric::AvgDealValue => TargetField::AvgDealValue,
            KpiMetric::SalesCycleLength => TargetField::SalesCycleLength,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KpiMetric::RequestAcceptanceRate => "Request Acceptance Rate",
            KpiMetric::PositiveReplyRate => "Positive Reply Rate",
            KpiMetric::MeetingBookingRate => "Meeting Booking Rate",
            KpiMetric::ShowUpRate => "Show Up Rate",
            KpiMetric::CloseRate => "Close Rate",
            KpiMetric::AvgDealValue => "Average Deal Value",
            KpiMetric::SalesCycleLength => "Sales Cycle Length (Days)",
        }
    }

    pub fn unit(self) -> MetricUnit {
        match self {
            KpiMetric::AvgDealValue => MetricUnit::Currency,
            KpiMetric::SalesCycleLength => MetricUnit::Days,
            _ => MetricUnit::Percent,
        }
    }

    /// Cycle length improves as it shrinks; everything else as it grows
    pub fn shorter_is_better(self) -> bool {
        self == KpiMetric::SalesCycleLength
    }

    pub fn current(self, kpis: &KpiSet) -> f64 {
        match self {
            KpiMetric::RequestAcceptanceRate => kpis.request_acceptance_rate,
            KpiMetric::PositiveReplyRate => kpis.positive_reply_rate,
            KpiMetric::MeetingBookingRate => kpis.meeting_booking_rate,
            KpiMetric::ShowUpRate => kpis.show_up_rate,
            KpiMetric::CloseRate => kpis.close_rate,
            KpiMetric::AvgDealValue => kpis.avg_deal_value,
            KpiMetric::SalesCycleLength => kpis.sales_cycle_length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapStatus {
    Ahead,
    OnTarget,
    Behind,
}

impl GapStatus {
    pub fn classify(gap: f64, shorter_is_better: bool) -> Self {
        if gap == 0.0 {
            GapStatus::OnTarget
        } else if (gap < 0.0) == shorter_is_better {
            GapStatus::Ahead
        } else {
            GapStatus::Behind
        }
    }
}

/// One row of the gap analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiGap {
    pub metric: KpiMetric,
    pub current: f64,
    pub target: f64,
    /// `current - target`
    pub gap: f64,
    pub status: GapStatus,
}

/// Compare current KPIs against the channel's reference targets
pub fn gap_analysis(kpis: &KpiSet, targets: &ReferenceTargets, channel: Channel) -> Vec<KpiGap> {
    KpiMetric::for_channel(channel)
        .into_iter()
        .map(|metric| {
            let current = metric.current(kpis);
            let target = metric.target_field().get(targets);
            let gap = current - target;
            KpiGap {
                metric,
                current,
                target,
                gap,
                status: GapStatus::classify(gap, metric.shorter_is_better()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppState;

    fn settings(price: f64) -> ProgramSettings {
        ProgramSettings {
            offer_name: "Test".to_string(),
            offer_price: price,
            target_revenue_goal: 0.0,
        }
    }

    #[test]
    fn test_accept_gated_rates() {
        let perf = PerformanceData {
            connection_requests_sent: 1000.0,
            total_accepted_requests: 300.0,
            positive_replies: 30.0,
            meetings_scheduled: 15.0,
            total_shows: 12.0,
            deals_closed: 3.0,
            sales_cycle_length: 30.0,
            ..Default::default()
        };
        let kpis = compute_kpis(&settings(5000.0), &perf, Channel::LinkedIn);
        assert_eq!(kpis.request_acceptance_rate, 30.0);
        assert_eq!(kpis.positive_reply_rate, 10.0);
        assert_eq!(kpis.meeting_booking_rate, 50.0);
        assert_eq!(kpis.show_up_rate, 80.0);
        assert_eq!(kpis.close_rate, 25.0);
        assert_eq!(kpis.current_revenue, 15000.0);
        assert_eq!(kpis.avg_deal_value, 5000.0);
        assert_eq!(kpis.sales_cycle_length, 30.0);
    }

    #[test]
    fn test_direct_reply_ignores_total_replies() {
        let perf = PerformanceData {
            messages_sent: 2000.0,
            total_replies: 100.0,
            positive_replies: 20.0,
            ..Default::default()
        };
        let kpis = compute_kpis(&settings(5000.0), &perf, Channel::FacebookInstagram);
        assert_eq!(kpis.request_acceptance_rate, 0.0);
        assert_eq!(kpis.positive_reply_rate, 1.0);
    }

    #[test]
    fn test_all_zero_input_is_all_zero() {
        let kpis = compute_kpis(&settings(0.0), &PerformanceData::default(), Channel::LinkedIn);
        assert_eq!(kpis.request_acceptance_rate, 0.0);
        assert_eq!(kpis.positive_reply_rate, 0.0);
        assert_eq!(kpis.meeting_booking_rate, 0.0);
        assert_eq!(kpis.show_up_rate, 0.0);
        assert_eq!(kpis.close_rate, 0.0);
        assert_eq!(kpis.current_revenue, 0.0);
        assert_eq!(kpis.avg_deal_value, 0.0);
    }

    #[test]
    fn test_avg_deal_value_falls_back_to_offer_price() {
        let kpis = compute_kpis(&settings(1234.0), &PerformanceData::default(), Channel::Email);
        assert_eq!(kpis.avg_deal_value, 1234.0);
    }

    #[test]
    fn test_inconsistent_counts_exceed_100_percent() {
        let perf = PerformanceData {
            total_shows: 2.0,
            deals_closed: 5.0,
            ..Default::default()
        };
        let kpis = compute_kpis(&settings(100.0), &perf, Channel::Email);
        assert_eq!(kpis.close_rate, 250.0);
    }

    #[test]
    fn test_gap_status_classification() {
        assert_eq!(GapStatus::classify(5.0, false), GapStatus::Ahead);
        assert_eq!(GapStatus::classify(-5.0, false), GapStatus::Behind);
        assert_eq!(GapStatus::classify(-5.0, true), GapStatus::Ahead);
        assert_eq!(GapStatus::classify(5.0, true), GapStatus::Behind);
        assert_eq!(GapStatus::classify(0.0, true), GapStatus::OnTarget);
    }

    #[test]
    fn test_gap_analysis_rows() {
        let state = AppState::default();
        let data = state.channel(Channel::LinkedIn);
        let kpis = compute_kpis(&state.program_settings, &data.current_performance, Channel::LinkedIn);
        let gaps = gap_analysis(&kpis, &data.reference_targets, Channel::LinkedIn);

        assert_eq!(gaps.len(), 7);
        assert_eq!(gaps[0].metric, KpiMetric::RequestAcceptanceRate);
        // 30% actual vs 35% target
        assert_eq!(gaps[0].gap, -5.0);
        assert_eq!(gaps[0].status, GapStatus::Behind);
        // 30 days actual vs 25 target: slower than target
        let cycle = gaps.last().unwrap();
        assert_eq!(cycle.metric, KpiMetric::SalesCycleLength);
        assert_eq!(cycle.gap, 5.0);
        assert_eq!(cycle.status, GapStatus::Behind);

        let email = gap_analysis(&kpis, &data.reference_targets, Channel::Email);
        assert_eq!(email.len(), 6);
        assert_eq!(email[0].metric, KpiMetric::PositiveReplyRate);
    }
}
