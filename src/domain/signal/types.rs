//! Behavioral signal types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Device class inferred from the user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    /// Missing or unparseable user-agent.
    Unknown,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Unknown => "unknown",
        }
    }
}

/// Acquisition channel for the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficChannel {
    /// No referrer - typed URL, bookmark, or stripped referrer.
    Direct,
    /// Search engine referral without paid markers.
    Organic,
    /// Social network referral.
    Social,
    /// Any other external referrer.
    Referral,
    /// Paid campaign markers present (utm_medium=cpc/paid, gclid).
    Paid,
    /// Referrer present but unparseable.
    Unknown,
}

impl TrafficChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficChannel::Direct => "direct",
            TrafficChannel::Organic => "organic",
            TrafficChannel::Social => "social",
            TrafficChannel::Referral => "referral",
            TrafficChannel::Paid => "paid",
            TrafficChannel::Unknown => "unknown",
        }
    }
}

/// Traffic source: channel plus optional attribution strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub channel: TrafficChannel,
    /// Referring site or utm_source, when known (e.g. "google", "facebook").
    pub source: Option<String>,
    /// Campaign identifier from utm_campaign, when present.
    pub campaign: Option<String>,
}

impl TrafficSource {
    /// A direct visit with no attribution.
    pub fn direct() -> Self {
        Self {
            channel: TrafficChannel::Direct,
            source: None,
            campaign: None,
        }
    }
}

/// Coarse time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00-11:59
    Morning,
    /// 12:00-16:59
    Afternoon,
    /// 17:00-21:59
    Evening,
    /// 22:00-04:59
    Night,
}

impl TimeOfDay {
    /// Buckets an hour (0-23) into a time of day.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Temporal bucket of the request, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalBucket {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Day of week, 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    /// Day of month, 1-31.
    pub day_of_month: u32,
    /// Month, 1-12.
    pub month: u32,
    pub time_of_day: TimeOfDay,
}

/// Page context: where on the site the request landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub path: String,
    pub query: HashMap<String, String>,
    pub fragment: Option<String>,
}

/// Immutable behavioral signal derived from a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSignal {
    pub device: DeviceClass,
    pub traffic: TrafficSource,
    pub temporal: TemporalBucket,
    pub page: PageContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_buckets_cover_all_hours() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn direct_traffic_has_no_attribution() {
        let traffic = TrafficSource::direct();
        assert_eq!(traffic.channel, TrafficChannel::Direct);
        assert!(traffic.source.is_none());
        assert!(traffic.campaign.is_none());
    }
}
