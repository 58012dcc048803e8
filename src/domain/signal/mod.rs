//! Signal module - Behavioral signals derived per request.
//!
//! A [`BehavioralSignal`] is an immutable, per-request description of the
//! visitor: device class, traffic source, temporal bucket, and page context.
//! It is created fresh on every request by the pure extractor and never
//! persisted.

mod extractor;
mod fingerprint;
mod types;

pub use extractor::{extract, RequestSnapshot};
pub use fingerprint::{Fingerprint, VISITOR_COOKIE};
pub use types::{
    BehavioralSignal, DeviceClass, PageContext, TemporalBucket, TimeOfDay, TrafficChannel,
    TrafficSource,
};
