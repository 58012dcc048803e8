//! Signal extractor - pure, total derivation of behavioral signals.
//!
//! The extractor never fails: malformed user-agents, referrers, and URLs map
//! to explicit `Unknown` categories instead of errors. It has no side
//! effects and touches no shared state, so it can run on every request
//! without coordination.

use chrono::{Datelike, Timelike};
use std::collections::HashMap;

use crate::domain::foundation::Timestamp;

use super::types::{
    BehavioralSignal, DeviceClass, PageContext, TemporalBucket, TimeOfDay, TrafficChannel,
    TrafficSource,
};

/// Framework-independent view of an inbound request.
///
/// The HTTP adapter builds one of these from the hosting framework's request
/// type; the extractor and resolver never see axum types directly.
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    /// Request path, e.g. "/products/tea".
    pub path: String,
    /// Raw query string without the leading '?', if any.
    pub query: Option<String>,
    /// URL fragment, if the client sent one (rare; proxies may forward it).
    pub fragment: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Referer header value.
    pub referrer: Option<String>,
    /// Cookie header value.
    pub cookies: Option<String>,
    /// Best-effort client IP (forwarded header or socket address).
    pub client_ip: Option<String>,
    /// When the request arrived.
    pub received_at: Timestamp,
}

/// Derives a behavioral signal from a request snapshot.
///
/// Total function: every input produces a signal.
pub fn extract(snapshot: &RequestSnapshot) -> BehavioralSignal {
    let query = parse_query(snapshot.query.as_deref());
    BehavioralSignal {
        device: classify_device(snapshot.user_agent.as_deref()),
        traffic: classify_traffic(snapshot.referrer.as_deref(), &query),
        temporal: temporal_bucket(&snapshot.received_at),
        page: PageContext {
            path: snapshot.path.clone(),
            query,
            fragment: snapshot.fragment.clone(),
        },
    }
}

/// Classifies the device from a user-agent string.
///
/// Substring heuristics only; an empty or missing user-agent is `Unknown`.
fn classify_device(user_agent: Option<&str>) -> DeviceClass {
    let ua = match user_agent {
        Some(ua) if !ua.trim().is_empty() => ua.to_ascii_lowercase(),
        _ => return DeviceClass::Unknown,
    };

    // Tablet markers first: tablet user-agents usually also contain "mobile".
    if ua.contains("ipad") || ua.contains("tablet") || ua.contains("kindle") {
        return DeviceClass::Tablet;
    }
    if ua.contains("mobile") || ua.contains("iphone") || ua.contains("android") {
        return DeviceClass::Mobile;
    }
    DeviceClass::Desktop
}

/// Classifies the traffic source from the referrer and query parameters.
///
/// Paid markers in the query win over the referrer, since ad clicks carry
/// both a search-engine referrer and campaign parameters.
fn classify_traffic(referrer: Option<&str>, query: &HashMap<String, String>) -> TrafficSource {
    let campaign = query.get("utm_campaign").cloned();
    let utm_source = query.get("utm_source").cloned();

    let paid_medium = query
        .get("utm_medium")
        .map(|m| {
            let m = m.to_ascii_lowercase();
            m == "cpc" || m == "ppc" || m == "paid" || m == "display"
        })
        .unwrap_or(false);
    if paid_medium || query.contains_key("gclid") || query.contains_key("fbclid") {
        return TrafficSource {
            channel: TrafficChannel::Paid,
            source: utm_source.or_else(|| referrer.and_then(referrer_host)),
            campaign,
        };
    }

    let host = match referrer {
        None => return TrafficSource::direct(),
        Some(r) if r.trim().is_empty() => return TrafficSource::direct(),
        Some(r) => match referrer_host(r) {
            Some(host) => host,
            None => {
                return TrafficSource {
                    channel: TrafficChannel::Unknown,
                    source: None,
                    campaign,
                }
            }
        },
    };

    let channel = if is_search_engine(&host) {
        TrafficChannel::Organic
    } else if is_social_network(&host) {
        TrafficChannel::Social
    } else {
        TrafficChannel::Referral
    };

    TrafficSource {
        channel,
        source: Some(host),
        campaign,
    }
}

/// Pulls the lowercased host out of a referrer URL, tolerating bare hosts.
fn referrer_host(referrer: &str) -> Option<String> {
    let trimmed = referrer.trim();
    if trimmed.is_empty() {
        return None;
    }
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split('@')
        .last()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("");
    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

fn is_search_engine(host: &str) -> bool {
    const ENGINES: [&str; 6] = [
        "google.", "bing.com", "duckduckgo.com", "yahoo.", "baidu.com", "ecosia.org",
    ];
    ENGINES.iter().any(|e| host.contains(e))
}

fn is_social_network(host: &str) -> bool {
    const NETWORKS: [&str; 9] = [
        "facebook.com",
        "instagram.com",
        "twitter.com",
        "x.com",
        "t.co",
        "linkedin.com",
        "pinterest.",
        "reddit.com",
        "tiktok.com",
    ];
    NETWORKS.iter().any(|n| host == *n || host.ends_with(&format!(".{n}")) || host.contains(n))
}

/// Parses a raw query string into a key-value map.
///
/// Later duplicates win; malformed pairs without '=' become empty-valued
/// keys. No percent-decoding - attribution parameters are plain ASCII in
/// practice and unknown bytes are harmless in a map key.
fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return map,
    };
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => map.insert(key.to_string(), value.to_string()),
            None => map.insert(pair.to_string(), String::new()),
        };
    }
    map
}

/// Buckets the request time into temporal categories, in UTC.
fn temporal_bucket(at: &Timestamp) -> TemporalBucket {
    let dt = at.as_datetime();
    let hour = dt.hour();
    TemporalBucket {
        hour,
        day_of_week: dt.weekday().num_days_from_monday(),
        day_of_month: dt.day(),
        month: dt.month(),
        time_of_day: TimeOfDay::from_hour(hour),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot() -> RequestSnapshot {
        RequestSnapshot {
            path: "/products/green-tea".to_string(),
            received_at: Timestamp::from_unix_secs(1705276800), // 2024-01-15 00:00 UTC, a Monday
            ..Default::default()
        }
    }

    // ─── Device Classification ───────────────────────────────────────

    #[test]
    fn desktop_user_agent_classified_as_desktop() {
        let device = classify_device(Some(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        ));
        assert_eq!(device, DeviceClass::Desktop);
    }

    #[test]
    fn iphone_user_agent_classified_as_mobile() {
        let device = classify_device(Some(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148",
        ));
        assert_eq!(device, DeviceClass::Mobile);
    }

    #[test]
    fn ipad_user_agent_classified_as_tablet_not_mobile() {
        let device = classify_device(Some("Mozilla/5.0 (iPad; CPU OS 17_0) Mobile/15E148"));
        assert_eq!(device, DeviceClass::Tablet);
    }

    #[test]
    fn missing_or_blank_user_agent_is_unknown() {
        assert_eq!(classify_device(None), DeviceClass::Unknown);
        assert_eq!(classify_device(Some("   ")), DeviceClass::Unknown);
    }

    // ─── Traffic Classification ──────────────────────────────────────

    #[test]
    fn no_referrer_is_direct() {
        let traffic = classify_traffic(None, &HashMap::new());
        assert_eq!(traffic.channel, TrafficChannel::Direct);
    }

    #[test]
    fn search_engine_referrer_is_organic() {
        let traffic = classify_traffic(Some("https://www.google.com/search?q=tea"), &HashMap::new());
        assert_eq!(traffic.channel, TrafficChannel::Organic);
        assert_eq!(traffic.source.as_deref(), Some("www.google.com"));
    }

    #[test]
    fn social_referrer_is_social() {
        let traffic = classify_traffic(Some("https://www.instagram.com/p/abc/"), &HashMap::new());
        assert_eq!(traffic.channel, TrafficChannel::Social);
    }

    #[test]
    fn other_site_referrer_is_referral() {
        let traffic = classify_traffic(Some("https://sometea.blog/reviews"), &HashMap::new());
        assert_eq!(traffic.channel, TrafficChannel::Referral);
        assert_eq!(traffic.source.as_deref(), Some("sometea.blog"));
    }

    #[test]
    fn paid_markers_win_over_organic_referrer() {
        let query = parse_query(Some("utm_medium=cpc&utm_source=google&utm_campaign=winter"));
        let traffic = classify_traffic(Some("https://www.google.com/"), &query);
        assert_eq!(traffic.channel, TrafficChannel::Paid);
        assert_eq!(traffic.source.as_deref(), Some("google"));
        assert_eq!(traffic.campaign.as_deref(), Some("winter"));
    }

    #[test]
    fn gclid_alone_marks_paid() {
        let query = parse_query(Some("gclid=abc123"));
        let traffic = classify_traffic(None, &query);
        assert_eq!(traffic.channel, TrafficChannel::Paid);
    }

    #[test]
    fn garbage_referrer_is_unknown_channel() {
        let traffic = classify_traffic(Some("not a url at all"), &HashMap::new());
        assert_eq!(traffic.channel, TrafficChannel::Unknown);
    }

    // ─── Query Parsing ───────────────────────────────────────────────

    #[test]
    fn parse_query_splits_pairs() {
        let query = parse_query(Some("a=1&b=2"));
        assert_eq!(query.get("a").map(String::as_str), Some("1"));
        assert_eq!(query.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn parse_query_tolerates_malformed_pairs() {
        let query = parse_query(Some("flag&&a=1"));
        assert_eq!(query.get("flag").map(String::as_str), Some(""));
        assert_eq!(query.get("a").map(String::as_str), Some("1"));
    }

    // ─── Temporal Bucketing ──────────────────────────────────────────

    #[test]
    fn temporal_bucket_derives_all_fields() {
        // 2024-01-15 was a Monday; midnight UTC is Night.
        let bucket = temporal_bucket(&Timestamp::from_unix_secs(1705276800));
        assert_eq!(bucket.hour, 0);
        assert_eq!(bucket.day_of_week, 0);
        assert_eq!(bucket.day_of_month, 15);
        assert_eq!(bucket.month, 1);
        assert_eq!(bucket.time_of_day, TimeOfDay::Night);
    }

    // ─── Totality ────────────────────────────────────────────────────

    #[test]
    fn extract_on_empty_snapshot_yields_unknown_categories() {
        let signal = extract(&RequestSnapshot::default());
        assert_eq!(signal.device, DeviceClass::Unknown);
        assert_eq!(signal.traffic.channel, TrafficChannel::Direct);
        assert!(signal.page.query.is_empty());
    }

    #[test]
    fn extract_builds_full_signal() {
        let mut snap = snapshot();
        snap.user_agent = Some("Mozilla/5.0 (iPhone) Mobile".to_string());
        snap.referrer = Some("https://www.reddit.com/r/tea".to_string());
        snap.query = Some("utm_campaign=launch".to_string());

        let signal = extract(&snap);
        assert_eq!(signal.device, DeviceClass::Mobile);
        assert_eq!(signal.traffic.channel, TrafficChannel::Social);
        assert_eq!(signal.traffic.campaign.as_deref(), Some("launch"));
        assert_eq!(signal.page.path, "/products/green-tea");
    }

    proptest! {
        /// The extractor is total: arbitrary header garbage never panics.
        #[test]
        fn extract_never_panics(
            path in ".{0,64}",
            query in proptest::option::of(".{0,64}"),
            ua in proptest::option::of(".{0,128}"),
            referrer in proptest::option::of(".{0,128}"),
        ) {
            let snap = RequestSnapshot {
                path,
                query,
                user_agent: ua,
                referrer,
                ..Default::default()
            };
            let _ = extract(&snap);
        }
    }
}
