// Scenario Definitions — scripted policy strategies replayed over many seeds
// All strategy logic lives in plan/allocate functions; zero engine changes

use precinct_engine::action::{ActionId, DistrictActions};
use precinct_engine::allocation::PoliceAllocation;
use precinct_engine::district::DistrictId;
use precinct_engine::types::{GameState, Shift};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// Reallocate officers before a round; None keeps the default deployment.
    pub allocate: Option<fn(&GameState) -> PoliceAllocation>,
    /// Choose this round's pending actions.
    pub plan: fn(&GameState) -> DistrictActions,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Some(true): must complete round 10; Some(false): must go bankrupt.
    pub expect_completion: Option<bool>,
    pub min_final_avg_trust: Option<f64>,
    pub max_final_racial_bias: Option<f64>,
    /// Treasury conservation must hold over the whole log.
    pub require_ledger_balance: bool,
    /// Metric-range violations allowed (always zero).
    pub max_bounds_violations: u32,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            expect_completion: None,
            min_final_avg_trust: None,
            max_final_racial_bias: None,
            require_ledger_balance: true,
            max_bounds_violations: 0,
        }
    }
}

// ─── Strategy helpers ───────────────────────────────────────────────────────

/// Try selections in order, first wish per district wins, skipping any the
/// engine rejects, until the action points run out.
fn select_best_effort(state: &GameState, wishes: &[(DistrictId, ActionId)]) -> DistrictActions {
    let mut actions = DistrictActions::default();
    for &(district, action) in wishes {
        if actions.pending(district).is_some() {
            continue;
        }
        if let Ok(next) = actions.with_selection(&state.implemented_actions, district, action) {
            actions = next;
        }
    }
    actions
}

fn districts_by_trust(state: &GameState) -> Vec<DistrictId> {
    let mut ids: Vec<DistrictId> = DistrictId::ALL.to_vec();
    ids.sort_by(|a, b| {
        state
            .metrics
            .get(*a)
            .community_trust
            .partial_cmp(&state.metrics.get(*b).community_trust)
            .unwrap()
    });
    ids
}

// ─── Plans ──────────────────────────────────────────────────────────────────

fn plan_hands_off(_state: &GameState) -> DistrictActions {
    DistrictActions::default()
}

/// Education, then the reporting app, in the two lowest-trust districts.
fn plan_community_first(state: &GameState) -> DistrictActions {
    let mut wishes = Vec::new();
    for id in districts_by_trust(state).into_iter().take(2) {
        wishes.push((id, ActionId::CommunityEducation));
        wishes.push((id, ActionId::ReportingApp));
    }
    select_best_effort(state, &wishes)
}

/// CCTV everywhere, then facial recognition on top, then drones; budget be
/// damned.
fn plan_surveillance_max(state: &GameState) -> DistrictActions {
    let mut wishes = Vec::new();
    for id in DistrictId::ALL {
        wishes.push((id, ActionId::Cctv));
    }
    for id in DistrictId::ALL {
        wishes.push((id, ActionId::FacialRecognition));
        wishes.push((id, ActionId::DroneSurveillance));
    }
    select_best_effort(state, &wishes)
}

// ─── Allocations ────────────────────────────────────────────────────────────

/// Skeleton crew: one officer per shift everywhere, twelve in reserve.
fn allocate_austerity(state: &GameState) -> PoliceAllocation {
    let mut alloc = state.police_allocation;
    for id in DistrictId::ALL {
        for shift in [Shift::Day, Shift::Night] {
            if let Ok(next) = alloc.with_shift_count(id, shift, 1) {
                alloc = next;
            }
        }
    }
    alloc
}

/// Saturate Southside with everything the reserve allows.
fn allocate_concentrated(state: &GameState) -> PoliceAllocation {
    let mut alloc = state.police_allocation;
    for id in [DistrictId::Downtown, DistrictId::Northgate, DistrictId::Eastvale] {
        for shift in [Shift::Day, Shift::Night] {
            if let Ok(next) = alloc.with_shift_count(id, shift, 1) {
                alloc = next;
            }
        }
    }
    for (shift, count) in [(Shift::Day, 6), (Shift::Night, 8)] {
        if let Ok(next) = alloc.with_shift_count(DistrictId::Southside, shift, count) {
            alloc = next;
        }
    }
    alloc
}

// ─── Scenario table ─────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "BASELINE_HANDS_OFF",
            label: "Hands-off baseline",
            category: "baseline",
            allocate: None,
            plan: plan_hands_off,
            criteria: PassCriteria {
                expect_completion: Some(true),
                ..Default::default()
            },
        },
        Scenario {
            name: "COMMUNITY_FIRST",
            label: "Community investment",
            category: "reform",
            allocate: None,
            plan: plan_community_first,
            criteria: PassCriteria {
                min_final_avg_trust: Some(45.0),
                ..Default::default()
            },
        },
        Scenario {
            name: "SURVEILLANCE_MAX",
            label: "Surveillance maximalist",
            category: "stress",
            allocate: None,
            plan: plan_surveillance_max,
            criteria: PassCriteria {
                expect_completion: Some(false),
                ..Default::default()
            },
        },
        Scenario {
            name: "AUSTERITY_RESERVE",
            label: "Austerity skeleton crew",
            category: "stress",
            allocate: Some(allocate_austerity),
            plan: plan_hands_off,
            criteria: PassCriteria {
                expect_completion: Some(true),
                ..Default::default()
            },
        },
        Scenario {
            name: "CONCENTRATED_SOUTHSIDE",
            label: "Concentrated saturation patrol",
            category: "stress",
            allocate: Some(allocate_concentrated),
            plan: plan_hands_off,
            criteria: PassCriteria::default(),
        },
    ]
}
