//! Segment taxonomy and classification rules.
//!
//! Eleven marketing segments, assigned by ordered rule matching over the
//! R/F/M ordinal scores. Classification is a pure function of the scores —
//! no temporal state, no cross-customer dependency.
//!
//! The rule table is business policy, not math: it is an explicit ordered
//! list so it can be tuned without touching the scorer, and every rule
//! carries an optional category bound so a custom table can gate on the
//! category score. The default table never does — category is reporting
//! and weighting only, pending a product decision.

use crate::scoring::RfmcScores;
use serde::{Deserialize, Serialize};

// ── Taxonomy ─────────────────────────────────────────────────────────────────

/// The closed set of eleven segments. Declaration order is the reporting
/// order; serialized names match the display names used everywhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Segment {
    #[serde(rename = "Champions")]
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Cannot Lose Them")]
    CannotLoseThem,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "About To Sleep")]
    AboutToSleep,
    #[serde(rename = "Hibernating")]
    Hibernating,
    #[serde(rename = "Potential Loyalists")]
    PotentialLoyalists,
    #[serde(rename = "New Customers")]
    NewCustomers,
    #[serde(rename = "Promising")]
    Promising,
    #[serde(rename = "Need Attention")]
    NeedAttention,
    #[serde(rename = "Lost")]
    Lost,
}

impl Segment {
    pub const ALL: [Segment; 11] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::CannotLoseThem,
        Segment::AtRisk,
        Segment::AboutToSleep,
        Segment::Hibernating,
        Segment::PotentialLoyalists,
        Segment::NewCustomers,
        Segment::Promising,
        Segment::NeedAttention,
        Segment::Lost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::CannotLoseThem => "Cannot Lose Them",
            Segment::AtRisk => "At Risk",
            Segment::AboutToSleep => "About To Sleep",
            Segment::Hibernating => "Hibernating",
            Segment::PotentialLoyalists => "Potential Loyalists",
            Segment::NewCustomers => "New Customers",
            Segment::Promising => "Promising",
            Segment::NeedAttention => "Need Attention",
            Segment::Lost => "Lost",
        }
    }

    pub fn from_name(name: &str) -> Option<Segment> {
        Segment::ALL.iter().find(|s| s.name() == name).copied()
    }

    /// Static recommended-action playbook. Business copy, not computed.
    pub fn recommended_actions(&self) -> &'static [&'static str] {
        match self {
            Segment::Champions => &[
                "Reward loyalty with exclusive offers",
                "Ask for reviews and referrals",
                "Preview new products early",
            ],
            Segment::LoyalCustomers => &[
                "Upsell higher-value products",
                "Invite to the loyalty program",
                "Engage with personalized content",
            ],
            Segment::CannotLoseThem => &[
                "Reach out personally before they lapse",
                "Win back with renewals or premium offers",
                "Do not lose them to competition",
            ],
            Segment::AtRisk => &[
                "Send personalized reactivation offers",
                "Offer limited-time discounts",
                "Ask for feedback on their experience",
            ],
            Segment::AboutToSleep => &[
                "Share valuable content to re-engage",
                "Recommend popular products",
                "Offer a modest incentive to return",
            ],
            Segment::Hibernating => &[
                "Run a win-back campaign",
                "Discount past favourites",
                "Prune from high-frequency campaigns if unresponsive",
            ],
            Segment::PotentialLoyalists => &[
                "Offer membership or loyalty program",
                "Recommend related products",
                "Nudge the next purchase with a small discount",
            ],
            Segment::NewCustomers => &[
                "Deliver a strong onboarding experience",
                "Provide early-success support",
                "Start a welcome series",
            ],
            Segment::Promising => &[
                "Create brand awareness",
                "Offer free trials or samples",
                "Convert interest into a repeat purchase",
            ],
            Segment::NeedAttention => &[
                "Make limited-time offers",
                "Recommend based on past purchases",
                "Reactivate before they drift further",
            ],
            Segment::Lost => &[
                "Attempt one revive campaign",
                "Otherwise exclude from paid targeting",
                "Capture exit feedback where possible",
            ],
        }
    }
}

// ── Rules ────────────────────────────────────────────────────────────────────

/// Inclusive score bounds for one dimension of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u8,
    pub max: u8,
}

impl Bounds {
    pub const ANY: Bounds = Bounds { min: 1, max: 5 };

    pub const fn at_least(min: u8) -> Bounds {
        Bounds { min, max: 5 }
    }

    pub const fn at_most(max: u8) -> Bounds {
        Bounds { min: 1, max }
    }

    pub const fn exactly(v: u8) -> Bounds {
        Bounds { min: v, max: v }
    }

    pub fn contains(&self, v: u8) -> bool {
        self.min <= v && v <= self.max
    }
}

/// One classification rule: a segment plus score bounds per dimension.
/// `category` is None throughout the default table.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRule {
    pub segment:   Segment,
    pub recency:   Bounds,
    pub frequency: Bounds,
    pub monetary:  Bounds,
    pub category:  Option<Bounds>,
}

impl SegmentRule {
    pub fn matches(&self, s: &RfmcScores) -> bool {
        self.recency.contains(s.recency)
            && self.frequency.contains(s.frequency)
            && self.monetary.contains(s.monetary)
            && self.category.map_or(true, |b| b.contains(s.category))
    }
}

/// The default rule table. First matching rule wins; anything unmatched
/// falls through to Lost.
///
/// Narrow cells are tested before the broader rules that would swallow
/// them: Cannot Lose Them before Loyal Customers (a lapsed big spender
/// still has F≥4, M≥3), the fully-inactive Lost cell before Hibernating,
/// and the exact middle cell before Potential Loyalists.
pub const SEGMENT_RULES: [SegmentRule; 11] = [
    SegmentRule {
        segment:   Segment::Champions,
        recency:   Bounds::at_least(4),
        frequency: Bounds::at_least(4),
        monetary:  Bounds::at_least(4),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::CannotLoseThem,
        recency:   Bounds::at_most(2),
        frequency: Bounds::at_least(4),
        monetary:  Bounds::at_least(4),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::LoyalCustomers,
        recency:   Bounds::ANY,
        frequency: Bounds::at_least(4),
        monetary:  Bounds::at_least(3),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::AtRisk,
        recency:   Bounds::at_most(2),
        frequency: Bounds::at_least(3),
        monetary:  Bounds::at_least(3),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::AboutToSleep,
        recency:   Bounds::at_most(2),
        frequency: Bounds::at_most(2),
        monetary:  Bounds::at_least(2),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::Lost,
        recency:   Bounds::at_most(1),
        frequency: Bounds::at_most(1),
        monetary:  Bounds::at_most(1),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::Hibernating,
        recency:   Bounds::at_most(2),
        frequency: Bounds::at_most(2),
        monetary:  Bounds::at_most(2),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::NeedAttention,
        recency:   Bounds::exactly(3),
        frequency: Bounds::exactly(3),
        monetary:  Bounds::exactly(3),
        category:  None,
    },
    SegmentRule {
        segment:   Segment::PotentialLoyalists,
        recency:   Bounds::at_least(3),
        frequency: Bounds { min: 2, max: 3 },
        monetary:  Bounds::ANY,
        category:  None,
    },
    SegmentRule {
        segment:   Segment::NewCustomers,
        recency:   Bounds::at_least(4),
        frequency: Bounds::at_most(1),
        monetary:  Bounds::ANY,
        category:  None,
    },
    SegmentRule {
        segment:   Segment::Promising,
        recency:   Bounds::at_least(3),
        frequency: Bounds::at_most(1),
        monetary:  Bounds::at_least(2),
        category:  None,
    },
];

/// Classify with the default rule table.
pub fn classify(scores: &RfmcScores) -> Segment {
    classify_with(&SEGMENT_RULES, scores)
}

/// Classify with a custom table. First match wins, Lost is the fallback.
pub fn classify_with(rules: &[SegmentRule], scores: &RfmcScores) -> Segment {
    rules
        .iter()
        .find(|rule| rule.matches(scores))
        .map(|rule| rule.segment)
        .unwrap_or(Segment::Lost)
}
