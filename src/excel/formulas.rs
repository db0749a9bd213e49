//! Formula text for the live report cells
//!
//! Every builder resolves its inputs through [`CellRefs`], so a formula can
//! only point at rows that were already written.

use super::cell_refs::{CellKey, CellRefs};
use crate::core::{Divisor, KpiMetric, PlanStep};
use crate::error::RoadmapResult;
use crate::types::{Channel, FunnelShape, PerformanceField, SettingsField};

/// `IF(den>0,num/den,0)`
pub fn guarded_ratio(numerator: &str, denominator: &str) -> String {
    format!("IF({den}>0,{num}/{den},0)", num = numerator, den = denominator)
}

/// `ROUNDUP(inner,0)`
pub fn round_up(inner: &str) -> String {
    format!("ROUNDUP({},0)", inner)
}

/// `current - target` for one gap-analysis row
pub fn gap(current: &str, target: &str) -> String {
    format!("{}-{}", current, target)
}

/// Live formula for a metric's current value, as a fraction for rates
pub fn kpi_current(metric: KpiMetric, channel: Channel, refs: &CellRefs) -> RoadmapResult<String> {
    let perf = |field| refs.get(CellKey::Performance(field));

    let formula = match metric {
        KpiMetric::RequestAcceptanceRate => guarded_ratio(
            &perf(PerformanceField::TotalAcceptedRequests)?,
            &perf(PerformanceField::ConnectionRequestsSent)?,
        ),
        KpiMetric::PositiveReplyRate => {
            let denominator = match channel.shape() {
                FunnelShape::AcceptGated => PerformanceField::TotalAcceptedRequests,
                FunnelShape::DirectReply => PerformanceField::MessagesSent,
            };
            guarded_ratio(&perf(PerformanceField::PositiveReplies)?, &perf(denominator)?)
        }
        KpiMetric::MeetingBookingRate => guarded_ratio(
            &perf(PerformanceField::MeetingsScheduled)?,
            &perf(PerformanceField::PositiveReplies)?,
        ),
        KpiMetric::ShowUpRate => guarded_ratio(
            &perf(PerformanceField::TotalShows)?,
            &perf(PerformanceField::MeetingsScheduled)?,
        ),
        KpiMetric::CloseRate => guarded_ratio(
            &perf(PerformanceField::DealsClosed)?,
            &perf(PerformanceField::TotalShows)?,
        ),
        KpiMetric::AvgDealValue => {
            let deals = perf(PerformanceField::DealsClosed)?;
            let price = refs.get(CellKey::Setting(SettingsField::OfferPrice))?;
            format!("IF({d}>0,({d}*{p})/{d},{p})", d = deals, p = price)
        }
        KpiMetric::SalesCycleLength => perf(PerformanceField::SalesCycleLength)?,
    };
    Ok(formula)
}

/// Target reference; whole-number percentages become fractions
pub fn kpi_target(metric: KpiMetric, refs: &CellRefs) -> RoadmapResult<String> {
    let field = metric.target_field();
    let cell = refs.get(CellKey::Target(field))?;
    Ok(if field.is_percent() {
        format!("{}/100", cell)
    } else {
        cell
    })
}

/// One planning step: `previous / divisor`, 0 when the divisor is not positive
pub fn plan_step(step: PlanStep, previous: &str, refs: &CellRefs) -> RoadmapResult<String> {
    let divisor = match step.divisor {
        Divisor::OfferPrice => refs.get(CellKey::Setting(SettingsField::OfferPrice))?,
        Divisor::Rate(field) => format!("({}/100)", refs.get(CellKey::Target(field))?),
    };
    Ok(guarded_ratio(previous, &divisor))
}
