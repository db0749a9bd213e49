use crate::error::RoadmapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//==============================================================================
// Channels
//==============================================================================

/// Funnel shape shared by one or more channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunnelShape {
    /// Requests must be accepted before a reply is possible
    AcceptGated,
    /// Messages land directly; replies are measured against volume sent
    DirectReply,
}

/// Outreach channel. Selects formulas, never entity shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "LIO")]
    LinkedIn,
    #[serde(rename = "FIO")]
    FacebookInstagram,
    #[serde(rename = "EO")]
    Email,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::LinkedIn, Channel::FacebookInstagram, Channel::Email];

    pub fn shape(self) -> FunnelShape {
        match self {
            Channel::LinkedIn => FunnelShape::AcceptGated,
            Channel::FacebookInstagram | Channel::Email => FunnelShape::DirectReply,
        }
    }

    /// Persisted identifier
    pub fn code(self) -> &'static str {
        match self {
            Channel::LinkedIn => "LIO",
            Channel::FacebookInstagram => "FIO",
            Channel::Email => "EO",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::LinkedIn => "LinkedIn Outbound Plan",
            Channel::FacebookInstagram => "Facebook & IG DM Outreach",
            Channel::Email => "Email Outreach",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Channel::LinkedIn => "Plan your LinkedIn outreach strategy.",
            Channel::FacebookInstagram => "Plan your Meta platforms outreach.",
            Channel::Email => "Plan your cold email campaigns.",
        }
    }

    /// Label of the top-of-funnel count in performance data
    pub fn outreach_label(self) -> &'static str {
        match self {
            Channel::LinkedIn => "Connection Requests Sent",
            Channel::FacebookInstagram => "Messages Sent",
            Channel::Email => "Emails Sent",
        }
    }

    /// Label of the action the backward plan ends on
    pub fn final_action_label(self) -> &'static str {
        match self {
            Channel::LinkedIn => "Connection Requests to Send",
            Channel::FacebookInstagram => "Messages to Send",
            Channel::Email => "Emails to Send",
        }
    }

    /// Label of the volume fed into a forward projection
    pub fn projection_input_label(self) -> &'static str {
        match self {
            Channel::LinkedIn => "Target Connection Requests",
            Channel::FacebookInstagram => "Target Messages to Send",
            Channel::Email => "Target Emails to Send",
        }
    }

    /// Worksheet name: spaces and " & " become underscores, max 31 chars
    pub fn sheet_name(self) -> String {
        self.name()
            .replace(" & ", "_")
            .replace(' ', "_")
            .chars()
            .take(31)
            .collect()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Channel {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lio" | "linkedin" => Ok(Channel::LinkedIn),
            "fio" | "facebook" | "instagram" | "meta" => Ok(Channel::FacebookInstagram),
            "eo" | "email" => Ok(Channel::Email),
            other => Err(RoadmapError::Validation(format!(
                "Unknown channel '{}'. Expected one of: LIO, FIO, EO",
                other
            ))),
        }
    }
}

//==============================================================================
// Snapshot entities
//==============================================================================

/// Global, channel-independent offer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSettings {
    pub offer_name: String,
    pub offer_price: f64,
    pub target_revenue_goal: f64,
}

/// Observed counts for the current period (one per channel)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    pub connection_requests_sent: f64,
    pub total_accepted_requests: f64,
    pub messages_sent: f64,
    pub total_replies: f64,
    pub positive_replies: f64,
    pub meetings_scheduled: f64,
    pub total_shows: f64,
    pub deals_closed: f64,
    pub sales_cycle_length: f64,
}

/// Target conversion percentages (0-100) and benchmarks (one per channel)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTargets {
    pub request_acceptance_rate: f64,
    pub positive_reply_rate: f64,
    pub meeting_booking_rate: f64,
    pub show_up_rate: f64,
    pub close_rate: f64,
    pub avg_deal_value: f64,
    pub sales_cycle_length: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelData {
    pub current_performance: PerformanceData,
    pub reference_targets: ReferenceTargets,
}

/// Complete session snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(rename = "programSettings")]
    pub program_settings: ProgramSettings,
    #[serde(rename = "LIO")]
    pub linkedin: ChannelData,
    #[serde(rename = "FIO")]
    pub facebook_instagram: ChannelData,
    #[serde(rename = "EO")]
    pub email: ChannelData,
}

impl AppState {
    pub fn channel(&self, channel: Channel) -> &ChannelData {
        match channel {
            Channel::LinkedIn => &self.linkedin,
            Channel::FacebookInstagram => &self.facebook_instagram,
            Channel::Email => &self.email,
        }
    }

    pub(crate) fn channel_mut(&mut self, channel: Channel) -> &mut ChannelData {
        match channel {
            Channel::LinkedIn => &mut self.linkedin,
            Channel::FacebookInstagram => &mut self.facebook_instagram,
            Channel::Email => &mut self.email,
        }
    }
}

impl Default for AppState {
    /// Built-in snapshot used on first start and whenever storage is unreadable
    fn default() -> Self {
        Self {
            program_settings: ProgramSettings {
                offer_name: "High-Ticket Coaching".to_string(),
                offer_price: 5000.0,
                target_revenue_goal: 100_000.0,
            },
            linkedin: ChannelData {
                current_performance: PerformanceData {
                    connection_requests_sent: 1000.0,
                    total_accepted_requests: 300.0,
                    positive_replies: 30.0,
                    meetings_scheduled: 15.0,
                    total_shows: 12.0,
                    deals_closed: 3.0,
                    sales_cycle_length: 30.0,
                    ..Default::default()
                },
                reference_targets: ReferenceTargets {
                    request_acceptance_rate: 35.0,
                    positive_reply_rate: 15.0,
                    meeting_booking_rate: 50.0,
                    show_up_rate: 85.0,
                    close_rate: 25.0,
                    avg_deal_value: 5000.0,
                    sales_cycle_length: 25.0,
                },
            },
            facebook_instagram: ChannelData {
                current_performance: PerformanceData {
                    messages_sent: 2000.0,
                    total_replies: 100.0,
                    positive_replies: 20.0,
                    meetings_scheduled: 10.0,
                    total_shows: 8.0,
                    deals_closed: 2.0,
                    sales_cycle_length: 20.0,
                    ..Default::default()
                },
                reference_targets: ReferenceTargets {
                    request_acceptance_rate: 0.0,
                    positive_reply_rate: 25.0,
                    meeting_booking_rate: 50.0,
                    show_up_rate: 90.0,
                    close_rate: 30.0,
                    avg_deal_value: 5000.0,
                    sales_cycle_length: 15.0,
                },
            },
            email: ChannelData {
                current_performance: PerformanceData {
                    messages_sent: 10_000.0,
                    total_replies: 500.0,
                    positive_replies: 50.0,
                    meetings_scheduled: 25.0,
                    total_shows: 22.0,
                    deals_closed: 5.0,
                    sales_cycle_length: 45.0,
                    ..Default::default()
                },
                reference_targets: ReferenceTargets {
                    request_acceptance_rate: 0.0,
                    positive_reply_rate: 10.0,
                    meeting_booking_rate: 60.0,
                    show_up_rate: 80.0,
                    close_rate: 20.0,
                    avg_deal_value: 5000.0,
                    sales_cycle_length: 40.0,
                },
            },
        }
    }
}

//==============================================================================
// Field identifiers
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    OfferName,
    OfferPrice,
    TargetRevenueGoal,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::OfferName,
        SettingsField::OfferPrice,
        SettingsField::TargetRevenueGoal,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SettingsField::OfferName => "offerName",
            SettingsField::OfferPrice => "offerPrice",
            SettingsField::TargetRevenueGoal => "targetRevenueGoal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::OfferName => "Offer Name",
            SettingsField::OfferPrice => "Offer Price",
            SettingsField::TargetRevenueGoal => "Target Revenue Goal",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceField {
    ConnectionRequestsSent,
    TotalAcceptedRequests,
    MessagesSent,
    TotalReplies,
    PositiveReplies,
    MeetingsScheduled,
    TotalShows,
    DealsClosed,
    SalesCycleLength,
}

impl PerformanceField {
    pub const ALL: [PerformanceField; 9] = [
        PerformanceField::ConnectionRequestsSent,
        PerformanceField::TotalAcceptedRequests,
        PerformanceField::MessagesSent,
        PerformanceField::TotalReplies,
        PerformanceField::PositiveReplies,
        PerformanceField::MeetingsScheduled,
        PerformanceField::TotalShows,
        PerformanceField::DealsClosed,
        PerformanceField::SalesCycleLength,
    ];

    /// Fields surfaced for a channel, channel-specific pair first
    pub fn for_channel(channel: Channel) -> [PerformanceField; 7] {
        let (sent, replied) = match channel.shape() {
            FunnelShape::AcceptGated => (
                PerformanceField::ConnectionRequestsSent,
                PerformanceField::TotalAcceptedRequests,
            ),
            FunnelShape::DirectReply => {
                (PerformanceField::MessagesSent, PerformanceField::TotalReplies)
            }
        };
        [
            sent,
            replied,
            PerformanceField::PositiveReplies,
            PerformanceField::MeetingsScheduled,
            PerformanceField::TotalShows,
            PerformanceField::DealsClosed,
            PerformanceField::SalesCycleLength,
        ]
    }

    pub fn key(self) -> &'static str {
        match self {
            PerformanceField::ConnectionRequestsSent => "connectionRequestsSent",
            PerformanceField::TotalAcceptedRequests => "totalAcceptedRequests",
            PerformanceField::MessagesSent => "messagesSent",
            PerformanceField::TotalReplies => "totalReplies",
            PerformanceField::PositiveReplies => "positiveReplies",
            PerformanceField::MeetingsScheduled => "meetingsScheduled",
            PerformanceField::TotalShows => "totalShows",
            PerformanceField::DealsClosed => "dealsClosed",
            PerformanceField::SalesCycleLength => "salesCycleLength",
        }
    }

    pub fn label(self, channel: Channel) -> &'static str {
        match self {
            PerformanceField::ConnectionRequestsSent => "Connection Requests Sent",
            PerformanceField::TotalAcceptedRequests => "Total Accepted Requests",
            PerformanceField::MessagesSent => match channel {
                Channel::Email => "Emails Sent",
                _ => "Messages Sent",
            },
            PerformanceField::TotalReplies => "Total Replies",
            PerformanceField::PositiveReplies => "Positive Replies",
            PerformanceField::MeetingsScheduled => "Meetings Scheduled",
            PerformanceField::TotalShows => "Total Shows",
            PerformanceField::DealsClosed => "Deals Closed",
            PerformanceField::SalesCycleLength => "Sales Cycle Length (Days)",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn get(self, data: &PerformanceData) -> f64 {
        match self {
            PerformanceField::ConnectionRequestsSent => data.connection_requests_sent,
            PerformanceField::TotalAcceptedRequests => data.total_accepted_requests,
            PerformanceField::MessagesSent => data.messages_sent,
            PerformanceField::TotalReplies => data.total_replies,
            PerformanceField::PositiveReplies => data.positive_replies,
            PerformanceField::MeetingsScheduled => data.meetings_scheduled,
            PerformanceField::TotalShows => data.total_shows,
            PerformanceField::DealsClosed => data.deals_closed,
            PerformanceField::SalesCycleLength => data.sales_cycle_length,
        }
    }

    pub fn set(self, data: &mut PerformanceData, value: f64) {
        let slot = match self {
            PerformanceField::ConnectionRequestsSent => &mut data.connection_requests_sent,
            PerformanceField::TotalAcceptedRequests => &mut data.total_accepted_requests,
            PerformanceField::MessagesSent => &mut data.messages_sent,
            PerformanceField::TotalReplies => &mut data.total_replies,
            PerformanceField::PositiveReplies => &mut data.positive_replies,
            PerformanceField::MeetingsScheduled => &mut data.meetings_scheduled,
            PerformanceField::TotalShows => &mut data.total_shows,
            PerformanceField::DealsClosed => &mut data.deals_closed,
            PerformanceField::SalesCycleLength => &mut data.sales_cycle_length,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    RequestAcceptanceRate,
    PositiveReplyRate,
    MeetingBookingRate,
    ShowUpRate,
    CloseRate,
    AvgDealValue,
    SalesCycleLength,
}

impl TargetField {
    pub const ALL: [TargetField; 7] = [
        TargetField::RequestAcceptanceRate,
        TargetField::PositiveReplyRate,
        TargetField::MeetingBookingRate,
        TargetField::ShowUpRate,
        TargetField::CloseRate,
        TargetField::AvgDealValue,
        TargetField::SalesCycleLength,
    ];

    const DIRECT_REPLY: [TargetField; 6] = [
        TargetField::PositiveReplyRate,
        TargetField::MeetingBookingRate,
        TargetField::ShowUpRate,
        TargetField::CloseRate,
        TargetField::AvgDealValue,
        TargetField::SalesCycleLength,
    ];

    /// Targets surfaced for a channel; the acceptance rate only applies
    /// to accept-gated funnels
    pub fn for_channel(channel: Channel) -> &'static [TargetField] {
        match channel.shape() {
            FunnelShape::AcceptGated => &Self::ALL,
            FunnelShape::DirectReply => &Self::DIRECT_REPLY,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            TargetField::RequestAcceptanceRate => "requestAcceptanceRate",
            TargetField::PositiveReplyRate => "positiveReplyRate",
            TargetField::MeetingBookingRate => "meetingBookingRate",
            TargetField::ShowUpRate => "showUpRate",
            TargetField::CloseRate => "closeRate",
            TargetField::AvgDealValue => "avgDealValue",
            TargetField::SalesCycleLength => "salesCycleLength",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetField::RequestAcceptanceRate => "Target Request Acceptance Rate (%)",
            TargetField::PositiveReplyRate => "Target Positive Reply Rate (%)",
            TargetField::MeetingBookingRate => "Target Meeting Booking Rate (%)",
            TargetField::ShowUpRate => "Target Show Up Rate (%)",
            TargetField::CloseRate => "Target Close Rate (%)",
            TargetField::AvgDealValue => "Target Average Deal Value ($)",
            TargetField::SalesCycleLength => "Target Sales Cycle Length (Days)",
        }
    }

    /// Whole-number percentage (35 means 35%)
    pub fn is_percent(self) -> bool {
        !matches!(self, TargetField::AvgDealValue | TargetField::SalesCycleLength)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn get(self, targets: &ReferenceTargets) -> f64 {
        match self {
            TargetField::RequestAcceptanceRate => targets.request_acceptance_rate,
            TargetField::PositiveReplyRate => targets.positive_reply_rate,
            TargetField::MeetingBookingRate => targets.meeting_booking_rate,
            TargetField::ShowUpRate => targets.show_up_rate,
            TargetField::CloseRate => targets.close_rate,
            TargetField::AvgDealValue => targets.avg_deal_value,
            TargetField::SalesCycleLength => targets.sales_cycle_length,
        }
    }

    pub fn set(self, targets: &mut ReferenceTargets, value: f64) {
        let slot = match self {
            TargetField::RequestAcceptanceRate => &mut targets.request_acceptance_rate,
            TargetField::PositiveReplyRate => &mut targets.positive_reply_rate,
            TargetField::MeetingBookingRate => &mut targets.meeting_booking_rate,
            TargetField::ShowUpRate => &mut targets.show_up_rate,
            TargetField::CloseRate => &mut targets.close_rate,
            TargetField::AvgDealValue => &mut targets.avg_deal_value,
            TargetField::SalesCycleLength => &mut targets.sales_cycle_length,
        };
        *slot = value;
    }
}

//==============================================================================
// Funnel stages
//==============================================================================

/// One point in the outreach-to-revenue pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Top-of-funnel action (requests, messages or emails sent)
    OutreachSent,
    AcceptedRequests,
    PositiveReplies,
    MeetingsScheduled,
    Shows,
    DealsClosed,
    Revenue,
}

impl Stage {
    /// Label used for forward projections
    pub fn projection_label(self, channel: Channel) -> &'static str {
        match self {
            Stage::OutreachSent => channel.projection_input_label(),
            Stage::AcceptedRequests => "Accepted Requests",
            Stage::PositiveReplies => "Positive Replies",
            Stage::MeetingsScheduled => "Meetings Scheduled",
            Stage::Shows => "Shows",
            Stage::DealsClosed => "Deals Closed",
            Stage::Revenue => "Projected Revenue",
        }
    }

    /// Label used for backward plan steps
    pub fn plan_label(self, channel: Channel) -> &'static str {
        match self {
            Stage::OutreachSent => channel.final_action_label(),
            Stage::AcceptedRequests => "Connections to Accept",
            Stage::PositiveReplies => "Positive Replies to Generate",
            Stage::MeetingsScheduled => "Meetings to Schedule",
            Stage::Shows => "Meetings to Attend (Shows)",
            Stage::DealsClosed => "Deals to Close",
            Stage::Revenue => "Target Revenue Goal",
        }
    }

    /// Short label used in the funnel conversion ladder
    pub fn funnel_label(self, channel: Channel) -> &'static str {
        match self {
            Stage::OutreachSent => match channel {
                Channel::LinkedIn => "Requests Sent",
                Channel::FacebookInstagram => "Messages Sent",
                Channel::Email => "Emails Sent",
            },
            Stage::AcceptedRequests => "Accepted",
            Stage::PositiveReplies => "Positive Replies",
            Stage::MeetingsScheduled => "Meetings",
            Stage::Shows => "Shows",
            Stage::DealsClosed => "Deals",
            Stage::Revenue => "Revenue",
        }
    }
}

/// A stage paired with its (projected or required) value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageValue {
    pub stage: Stage,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_shapes() {
        assert_eq!(Channel::LinkedIn.shape(), FunnelShape::AcceptGated);
        assert_eq!(Channel::FacebookInstagram.shape(), FunnelShape::DirectReply);
        assert_eq!(Channel::Email.shape(), FunnelShape::DirectReply);
    }

    #[test]
    fn test_sheet_names() {
        assert_eq!(Channel::LinkedIn.sheet_name(), "LinkedIn_Outbound_Plan");
        assert_eq!(
            Channel::FacebookInstagram.sheet_name(),
            "Facebook_IG_DM_Outreach"
        );
        assert_eq!(Channel::Email.sheet_name(), "Email_Outreach");
    }

    #[test]
    fn test_channel_from_str() {
        assert_eq!("LIO".parse::<Channel>().unwrap(), Channel::LinkedIn);
        assert_eq!("email".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!(" fio ".parse::<Channel>().unwrap(), Channel::FacebookInstagram);
        assert!("tiktok".parse::<Channel>().is_err());
    }

    #[test]
    fn test_state_serializes_with_persisted_keys() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(json["programSettings"]["offerPrice"], 5000.0);
        assert_eq!(json["LIO"]["currentPerformance"]["connectionRequestsSent"], 1000.0);
        assert_eq!(json["EO"]["referenceTargets"]["positiveReplyRate"], 10.0);
    }

    #[test]
    fn test_field_tables_per_channel() {
        assert_eq!(TargetField::for_channel(Channel::LinkedIn).len(), 7);
        assert_eq!(TargetField::for_channel(Channel::Email).len(), 6);
        assert_eq!(
            PerformanceField::for_channel(Channel::Email)[0],
            PerformanceField::MessagesSent
        );
        assert_eq!(
            PerformanceField::MessagesSent.label(Channel::Email),
            "Emails Sent"
        );
    }

    #[test]
    fn test_field_get_set() {
        let mut perf = PerformanceData::default();
        PerformanceField::DealsClosed.set(&mut perf, 4.0);
        assert_eq!(perf.deals_closed, 4.0);
        assert_eq!(PerformanceField::DealsClosed.get(&perf), 4.0);

        let mut targets = ReferenceTargets::default();
        TargetField::CloseRate.set(&mut targets, 25.0);
        assert_eq!(TargetField::CloseRate.get(&targets), 25.0);
        assert!(TargetField::CloseRate.is_percent());
        assert!(!TargetField::AvgDealValue.is_percent());
    }
}
