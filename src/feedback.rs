// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Round Feedback

use crate::allocation::{PoliceAllocation, OVERPOLICING_THRESHOLD};
use crate::bias::BiasReport;
use crate::district::{DistrictMap, DistrictId};
use crate::economy;
use crate::types::{Budget, Metrics};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything the feedback rules may look at for one resolved round.
pub struct RoundContext<'a> {
    pub previous: &'a DistrictMap<Metrics>,
    pub metrics: &'a DistrictMap<Metrics>,
    pub budget: &'a Budget,
    pub bias: &'a BiasReport,
    pub allocation: &'a PoliceAllocation,
    pub bankrupt: bool,
}

impl RoundContext<'_> {
    fn avg_trust(map: &DistrictMap<Metrics>) -> f64 {
        map.iter().map(|(_, m)| m.community_trust).sum::<f64>() / DistrictId::ALL.len() as f64
    }

    fn total_crimes(map: &DistrictMap<Metrics>) -> u32 {
        map.iter().map(|(_, m)| m.crimes_reported).sum()
    }

    fn trust_delta(&self) -> f64 {
        Self::avg_trust(self.metrics) - Self::avg_trust(self.previous)
    }

    fn crime_ratio(&self) -> f64 {
        let before = Self::total_crimes(self.previous).max(1) as f64;
        Self::total_crimes(self.metrics) as f64 / before
    }

    fn avg_false_arrest(&self) -> f64 {
        self.metrics.iter().map(|(_, m)| m.false_arrest_rate).sum::<f64>()
            / DistrictId::ALL.len() as f64
    }

    fn any_overpoliced(&self) -> bool {
        self.allocation
            .districts
            .iter()
            .any(|(_, s)| s.total() > OVERPOLICING_THRESHOLD)
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

struct FeedbackRule {
    applies: fn(&RoundContext) -> bool,
    fragment: &'static str,
}

const RULES: &[FeedbackRule] = &[
    FeedbackRule {
        applies: |ctx| ctx.bankrupt,
        fragment: "The treasury is empty; the city can no longer pay its officers.",
    },
    FeedbackRule {
        applies: |ctx| !ctx.bankrupt && ctx.budget.expenses > ctx.budget.income,
        fragment: "Spending outpaced tax revenue this round.",
    },
    FeedbackRule {
        applies: |ctx| economy::is_low_funds(ctx.budget),
        fragment: "Reserves are near the floor; another expensive round may not be survivable.",
    },
    FeedbackRule {
        applies: |ctx| ctx.trust_delta() < -2.0,
        fragment: "Community trust is slipping across the city.",
    },
    FeedbackRule {
        applies: |ctx| ctx.trust_delta() > 2.0,
        fragment: "Community trust is visibly improving.",
    },
    FeedbackRule {
        applies: |ctx| ctx.metrics.iter().any(|(_, m)| m.community_trust < 25.0),
        fragment: "At least one district barely trusts its police at all.",
    },
    FeedbackRule {
        applies: |ctx| ctx.avg_false_arrest() >= 20.0,
        fragment: "False arrests are frequent enough to draw sustained press attention.",
    },
    FeedbackRule {
        applies: |ctx| ctx.crime_ratio() <= 0.95,
        fragment: "Reported crime fell noticeably.",
    },
    FeedbackRule {
        applies: |ctx| ctx.crime_ratio() >= 1.05,
        fragment: "Reported crime is climbing.",
    },
    FeedbackRule {
        applies: |ctx| ctx.bias.exceeds_warning(),
        fragment: "Arrest disparities between districts have crossed the warning line.",
    },
    FeedbackRule {
        applies: |ctx| ctx.any_overpoliced(),
        fragment: "Residents describe the most heavily patrolled district as occupied.",
    },
];

const QUIET_ROUND: &str = "The city absorbs another round of policing without drama.";

/// Concatenate the fragments of every matching rule, in table order.
pub fn compose_feedback(ctx: &RoundContext) -> String {
    let matched: Vec<&'static str> = RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .map(|rule| rule.fragment)
        .collect();
    if matched.is_empty() {
        QUIET_ROUND.to_string()
    } else {
        matched.join(" ")
    }
}

// ---------------------------------------------------------------------------
// Change lines
// ---------------------------------------------------------------------------

const CRIME_CHANGE_NOTE: i64 = 3;
const TRUST_CHANGE_NOTE: f64 = 3.0;
const FAR_CHANGE_NOTE: f64 = 2.0;

/// Human-readable per-district change lines for the round log.
pub fn describe_changes(
    previous: &DistrictMap<Metrics>,
    metrics: &DistrictMap<Metrics>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (id, next) in metrics.iter() {
        let prev = previous.get(id);
        let crime_delta = next.crimes_reported as i64 - prev.crimes_reported as i64;
        if crime_delta.abs() >= CRIME_CHANGE_NOTE {
            lines.push(format!(
                "{}: reported crime {} → {}",
                id.name(),
                prev.crimes_reported,
                next.crimes_reported
            ));
        }
        let trust_delta = next.community_trust - prev.community_trust;
        if trust_delta.abs() >= TRUST_CHANGE_NOTE {
            lines.push(format!(
                "{}: community trust {:.0} → {:.0}",
                id.name(),
                prev.community_trust,
                next.community_trust
            ));
        }
        let far_delta = next.false_arrest_rate - prev.false_arrest_rate;
        if far_delta.abs() >= FAR_CHANGE_NOTE {
            lines.push(format!(
                "{}: false-arrest rate {:.1}% → {:.1}%",
                id.name(),
                prev.false_arrest_rate,
                next.false_arrest_rate
            ));
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
