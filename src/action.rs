// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Action Catalog

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::district::{District, DistrictId, DistrictMap};
use crate::types::{Metrics, Money};

/// Districts that may receive a new action in the same round.
pub const ACTION_POINTS_PER_ROUND: usize = 2;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected action selections. The caller retains the prior pending set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("{action:?} requires {requires:?} to be implemented in this district first")]
    PrerequisiteNotMet { action: ActionId, requires: ActionId },

    #[error("{0:?} is already implemented in this district")]
    AlreadyImplemented(ActionId),

    #[error("no action points left this round (cap {ACTION_POINTS_PER_ROUND})")]
    ActionPointsExhausted,
}

// ---------------------------------------------------------------------------
// Action identity & static data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    Cctv,
    FacialRecognition,
    DroneSurveillance,
    CommunityEducation,
    ReportingApp,
}

impl ActionId {
    pub const ALL: [ActionId; 5] = [
        ActionId::Cctv,
        ActionId::FacialRecognition,
        ActionId::DroneSurveillance,
        ActionId::CommunityEducation,
        ActionId::ReportingApp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cctv => "CCTV network",
            Self::FacialRecognition => "Facial recognition",
            Self::DroneSurveillance => "Drone surveillance",
            Self::CommunityEducation => "Community education",
            Self::ReportingApp => "Citizen reporting app",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Cctv => "Camera coverage of commercial corridors and transit stops",
            Self::FacialRecognition => "Automated matching against the CCTV feed",
            Self::DroneSurveillance => "Aerial patrol overflights on both shifts",
            Self::CommunityEducation => "Youth programs, mediation and outreach staff",
            Self::ReportingApp => "Anonymous tip and incident reporting for residents",
        }
    }

    /// One-time implementation cost, charged in the round the action lands.
    pub fn cost(&self) -> Money {
        Money::from_decimal(match self {
            Self::Cctv => dec!(120_000),
            Self::FacialRecognition => dec!(180_000),
            Self::DroneSurveillance => dec!(150_000),
            Self::CommunityEducation => dec!(60_000),
            Self::ReportingApp => dec!(45_000),
        })
    }

    /// Facial recognition rides on the CCTV feed; everything else stands alone.
    pub fn prerequisite(&self) -> Option<ActionId> {
        match self {
            Self::FacialRecognition => Some(ActionId::Cctv),
            _ => None,
        }
    }

    pub fn is_surveillance(&self) -> bool {
        matches!(
            self,
            Self::Cctv | Self::FacialRecognition | Self::DroneSurveillance
        )
    }
}

// ---------------------------------------------------------------------------
// Effect profiles
// ---------------------------------------------------------------------------

/// One-shot metric modifiers applied in the round an action is implemented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ActionEffects {
    pub crime_delta: f64,
    pub trust_delta: f64,
    pub false_arrest_delta: f64,
}

impl ActionEffects {
    pub fn merge(&mut self, other: ActionEffects) {
        self.crime_delta += other.crime_delta;
        self.trust_delta += other.trust_delta;
        self.false_arrest_delta += other.false_arrest_delta;
    }
}

/// Per-round contributions of previously implemented actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StandingEffects {
    /// Additive clearance-rate bonus feeding the arrest model.
    pub clearance_bonus: f64,
    /// Signed per-round false-arrest-rate pressure.
    pub false_arrest_pressure: f64,
    /// Signed per-round trust drift.
    pub trust_drift: f64,
    /// Arrest-composition skew: positive pushes toward over-policed
    /// demographics, negative toward parity with residents.
    pub skew: f64,
}

impl ActionId {
    /// Immediate effect bundle, weighted by the district it lands in.
    /// Surveillance tooling bites hardest where minority and low-income
    /// shares are highest; trust side effects depend on the standing trust.
    pub fn immediate_effects(&self, district: &District, metrics: &Metrics) -> ActionEffects {
        let minority = district.ethnicity.minority_share();
        let low_income = district.income_mix.low_income_share();
        let trust = metrics.community_trust;

        match self {
            Self::Cctv => ActionEffects {
                crime_delta: -6.0,
                trust_delta: if trust < 40.0 || minority > 0.5 { -2.0 } else { 0.0 },
                false_arrest_delta: if trust >= 40.0 { -2.0 } else { 0.0 },
            },
            Self::FacialRecognition => ActionEffects {
                crime_delta: -4.0,
                trust_delta: if minority > 0.5 { -10.0 } else { -4.0 },
                false_arrest_delta: 4.0 + 6.0 * minority,
            },
            Self::DroneSurveillance => ActionEffects {
                crime_delta: -5.0,
                trust_delta: -3.0,
                false_arrest_delta: 2.0 + 4.0 * low_income,
            },
            Self::CommunityEducation => ActionEffects {
                crime_delta: -2.0,
                trust_delta: 8.0,
                false_arrest_delta: 0.0,
            },
            Self::ReportingApp => ActionEffects {
                crime_delta: -1.0,
                trust_delta: 3.0,
                false_arrest_delta: if trust >= 40.0 { -3.0 } else { -1.0 },
            },
        }
    }
}

/// Aggregate the standing contributions of everything implemented in a
/// district. `metrics` is the previous round's snapshot: relief effects
/// (CCTV, reporting app) only work where trust is adequate.
pub fn standing_effects(
    implemented: &[ActionId],
    district: &District,
    metrics: &Metrics,
) -> StandingEffects {
    let minority = district.ethnicity.minority_share();
    let low_income = district.income_mix.low_income_share();
    let trust_ok = metrics.community_trust >= 40.0;

    let mut out = StandingEffects::default();
    for action in implemented {
        match action {
            ActionId::Cctv => {
                out.clearance_bonus += 0.04;
                out.skew += 0.2;
                if trust_ok {
                    out.false_arrest_pressure -= 0.8;
                }
            }
            ActionId::FacialRecognition => {
                out.clearance_bonus += 0.07;
                out.false_arrest_pressure += 1.5 * (0.5 + minority);
                out.skew += 1.2;
                if minority > 0.5 {
                    out.trust_drift -= 1.0;
                }
            }
            ActionId::DroneSurveillance => {
                out.clearance_bonus += 0.05;
                out.false_arrest_pressure += 0.8 * (0.5 + low_income);
                out.skew += 0.6;
            }
            ActionId::CommunityEducation => {
                out.trust_drift += 1.0;
                out.skew -= 0.5;
            }
            ActionId::ReportingApp => {
                out.clearance_bonus += 0.02;
                out.skew -= 0.4;
                if trust_ok {
                    out.false_arrest_pressure -= 1.0;
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Pending and implemented sets
// ---------------------------------------------------------------------------

/// At most one pending action per district, at most
/// `ACTION_POINTS_PER_ROUND` districts with a pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistrictActions {
    pending: DistrictMap<Option<ActionId>>,
}

impl Default for DistrictActions {
    fn default() -> Self {
        Self {
            pending: DistrictMap::from_fn(|_| None),
        }
    }
}

impl DistrictActions {
    pub fn pending(&self, district: DistrictId) -> Option<ActionId> {
        *self.pending.get(district)
    }

    /// Number of districts with a pending action (spent action points).
    pub fn count(&self) -> usize {
        self.pending.iter().filter(|(_, a)| a.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn entries(&self) -> Vec<(DistrictId, ActionId)> {
        self.pending
            .iter()
            .filter_map(|(d, a)| a.map(|a| (d, a)))
            .collect()
    }

    /// Validated selection. Re-selecting for a district replaces its pending
    /// entry without spending a second point; errors leave the receiver
    /// untouched (callers keep using it).
    pub fn with_selection(
        &self,
        implemented: &ImplementedActions,
        district: DistrictId,
        action: ActionId,
    ) -> Result<DistrictActions, ActionError> {
        if implemented.contains(district, action) {
            return Err(ActionError::AlreadyImplemented(action));
        }
        if let Some(requires) = action.prerequisite() {
            if !implemented.contains(district, requires) {
                return Err(ActionError::PrerequisiteNotMet { action, requires });
            }
        }
        if self.pending(district).is_none() && self.count() >= ACTION_POINTS_PER_ROUND {
            return Err(ActionError::ActionPointsExhausted);
        }

        let mut next = *self;
        *next.pending.get_mut(district) = Some(action);
        Ok(next)
    }

    /// Withdraw a pending selection, refunding its action point.
    pub fn without(&self, district: DistrictId) -> DistrictActions {
        let mut next = *self;
        *next.pending.get_mut(district) = None;
        next
    }

    /// Resolver defense: re-run every selection rule against the implemented
    /// sets before committing a round.
    pub fn validate_against(&self, implemented: &ImplementedActions) -> Result<(), ActionError> {
        if self.count() > ACTION_POINTS_PER_ROUND {
            return Err(ActionError::ActionPointsExhausted);
        }
        for (district, action) in self.entries() {
            if implemented.contains(district, action) {
                return Err(ActionError::AlreadyImplemented(action));
            }
            if let Some(requires) = action.prerequisite() {
                if !implemented.contains(district, requires) {
                    return Err(ActionError::PrerequisiteNotMet { action, requires });
                }
            }
        }
        Ok(())
    }
}

/// Append-only per-district record of implemented actions. Gates
/// prerequisites and duplicate implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ImplementedActions {
    by_district: DistrictMap<Vec<ActionId>>,
}

impl ImplementedActions {
    pub fn contains(&self, district: DistrictId, action: ActionId) -> bool {
        self.by_district.get(district).contains(&action)
    }

    pub fn implemented(&self, district: DistrictId) -> &[ActionId] {
        self.by_district.get(district)
    }

    /// Copy with one more implemented action. Append-only by construction.
    pub fn with_implemented(&self, district: DistrictId, action: ActionId) -> ImplementedActions {
        let mut next = self.clone();
        next.by_district.get_mut(district).push(action);
        next
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
