//! Snapshot reducer
//!
//! Updates are addressed by a closed set of field identifiers. Dotted paths
//! such as `LIO.currentPerformance.dealsClosed` are parsed once, at the
//! boundary, into a [`FieldUpdate`].

use crate::error::{RoadmapError, RoadmapResult};
use crate::types::{AppState, Channel, PerformanceField, SettingsField, TargetField};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

/// Per-channel field: observed performance or a reference target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolField {
    Performance(PerformanceField),
    Target(TargetField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    Settings(SettingsField),
    Tool { channel: Channel, field: ToolField },
}

impl fmt::Display for FieldUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldUpdate::Settings(field) => write!(f, "programSettings.{}", field.key()),
            FieldUpdate::Tool {
                channel,
                field: ToolField::Performance(field),
            } => write!(f, "{}.currentPerformance.{}", channel.code(), field.key()),
            FieldUpdate::Tool {
                channel,
                field: ToolField::Target(field),
            } => write!(f, "{}.referenceTargets.{}", channel.code(), field.key()),
        }
    }
}

impl FromStr for FieldUpdate {
    type Err = RoadmapError;

    fn from_str(path: &str) -> RoadmapResult<Self> {
        let unknown = || RoadmapError::Validation(format!("Unknown field path '{}'", path));
        let parts: Vec<&str> = path.trim().split('.').collect();

        match parts.as_slice() {
            ["programSettings", key] => SettingsField::from_key(key)
                .map(FieldUpdate::Settings)
                .ok_or_else(unknown),
            [channel, section, key] => {
                let channel: Channel = channel.parse()?;
                let field = match *section {
                    "currentPerformance" => {
                        PerformanceField::from_key(key).map(ToolField::Performance)
                    }
                    "referenceTargets" => TargetField::from_key(key).map(ToolField::Target),
                    _ => None,
                };
                field
                    .map(|field| FieldUpdate::Tool { channel, field })
                    .ok_or_else(unknown)
            }
            _ => Err(unknown()),
        }
    }
}

/// Return a new snapshot with one field replaced.
///
/// Numeric fields take the leading number of `raw` (anything unparseable
/// becomes 0) and are clamped to be non-negative. The offer name is stored
/// verbatim.
pub fn apply_field_update(state: &AppState, update: FieldUpdate, raw: &str) -> AppState {
    let mut next = state.clone();
    let value = coerce_numeric(raw);

    match update {
        FieldUpdate::Settings(SettingsField::OfferName) => {
            next.program_settings.offer_name = raw.to_string();
        }
        FieldUpdate::Settings(SettingsField::OfferPrice) => {
            next.program_settings.offer_price = value;
        }
        FieldUpdate::Settings(SettingsField::TargetRevenueGoal) => {
            next.program_settings.target_revenue_goal = value;
        }
        FieldUpdate::Tool { channel, field } => {
            let data = next.channel_mut(channel);
            match field {
                ToolField::Performance(f) => f.set(&mut data.current_performance, value),
                ToolField::Target(f) => f.set(&mut data.reference_targets, value),
            }
        }
    }

    debug!(field = %update, raw, "applied field update");
    next
}

/// Current value of a numeric field; `None` for the offer name
pub fn numeric_value(state: &AppState, update: FieldUpdate) -> Option<f64> {
    match update {
        FieldUpdate::Settings(SettingsField::OfferName) => None,
        FieldUpdate::Settings(SettingsField::OfferPrice) => Some(state.program_settings.offer_price),
        FieldUpdate::Settings(SettingsField::TargetRevenueGoal) => {
            Some(state.program_settings.target_revenue_goal)
        }
        FieldUpdate::Tool { channel, field } => {
            let data = state.channel(channel);
            Some(match field {
                ToolField::Performance(f) => f.get(&data.current_performance),
                ToolField::Target(f) => f.get(&data.reference_targets),
            })
        }
    }
}

/// Non-negative finite number parsed from the start of `raw`
pub fn coerce_numeric(raw: &str) -> f64 {
    let value = parse_leading_float(raw);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Optional sign, digits with an optional fraction, optional exponent
const LEADING_FLOAT: &str = r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)";

fn leading_float_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LEADING_FLOAT).ok()).as_ref()
}

/// Longest numeric prefix of `raw` after leading whitespace, or 0
fn parse_leading_float(raw: &str) -> f64 {
    leading_float_regex()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}
