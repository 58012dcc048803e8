//! Persona label - closed enumeration of visitor segments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of behavioral visitor segments.
///
/// `NewVisitor` is the explicit default used whenever classification has not
/// produced (or cannot produce) a real segment. Incoming strings from
/// headers or caches are mapped through [`Persona::parse`], which falls back
/// to `NewVisitor` rather than trusting unknown values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Price-driven visitor chasing discounts and coupons.
    BargainHunter,
    /// Returning visitor with a strong preference for known brands.
    BrandLoyalist,
    /// Browsing with no purchase signals yet.
    WindowShopper,
    /// Fast, low-consideration purchase behavior.
    ImpulseBuyer,
    /// Compares specifications and reads long-form content.
    Researcher,
    /// Engages with wellness and nutrition content.
    HealthConscious,
    /// Gravitates toward high-end product lines.
    PremiumSeeker,
    /// Seasonal or occasion-driven purchase patterns.
    GiftShopper,
    /// Default segment for unclassified visitors.
    NewVisitor,
}

impl Persona {
    /// All personas a classifier may legitimately produce.
    pub const ALL: [Persona; 9] = [
        Persona::BargainHunter,
        Persona::BrandLoyalist,
        Persona::WindowShopper,
        Persona::ImpulseBuyer,
        Persona::Researcher,
        Persona::HealthConscious,
        Persona::PremiumSeeker,
        Persona::GiftShopper,
        Persona::NewVisitor,
    ];

    /// Wire representation used in headers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::BargainHunter => "bargain_hunter",
            Persona::BrandLoyalist => "brand_loyalist",
            Persona::WindowShopper => "window_shopper",
            Persona::ImpulseBuyer => "impulse_buyer",
            Persona::Researcher => "researcher",
            Persona::HealthConscious => "health_conscious",
            Persona::PremiumSeeker => "premium_seeker",
            Persona::GiftShopper => "gift_shopper",
            Persona::NewVisitor => "new_visitor",
        }
    }

    /// Maps an incoming string to a persona.
    ///
    /// Unknown values map to `NewVisitor` - external strings are never
    /// trusted to extend the closed set.
    pub fn parse(value: &str) -> Persona {
        match value {
            "bargain_hunter" => Persona::BargainHunter,
            "brand_loyalist" => Persona::BrandLoyalist,
            "window_shopper" => Persona::WindowShopper,
            "impulse_buyer" => Persona::ImpulseBuyer,
            "researcher" => Persona::Researcher,
            "health_conscious" => Persona::HealthConscious,
            "premium_seeker" => Persona::PremiumSeeker,
            "gift_shopper" => Persona::GiftShopper,
            _ => Persona::NewVisitor,
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Persona::NewVisitor
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
