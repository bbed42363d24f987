// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Metrics Dynamics

use serde::Serialize;

use crate::action::{ActionEffects, StandingEffects};
use crate::allocation::{ShiftAllocation, OVERPOLICING_THRESHOLD};
use crate::district::District;
use crate::types::{IncomeBreakdown, Metrics, RaceBreakdown};

// ---------------------------------------------------------------------------
// Tuning constants
//
// The directional rules are the contract; these constants are the chosen
// calibration. Default play (3 day / 2 night everywhere, no actions) holds
// the city roughly stable for ten rounds.
// ---------------------------------------------------------------------------

/// Effective enforcement at which patrol presence neither adds nor removes
/// crime pressure (five officers at multiplier 1.0).
pub const EFF_EQUILIBRIUM: f64 = 5.0;
/// Crime reduction per point of effective enforcement above equilibrium.
pub const CRIME_ENFORCEMENT_COEFF: f64 = 0.02;
/// Crime reduction per unit of normalized trust above the midpoint.
pub const CRIME_TRUST_COEFF: f64 = 0.08;

/// Share of reported crimes cleared by arrest at equilibrium enforcement.
pub const BASE_CLEARANCE: f64 = 0.30;
/// Clearance gained per point of effective enforcement above equilibrium.
pub const CLEARANCE_ENFORCEMENT_COEFF: f64 = 0.03;
/// Below this trust, witnesses stop cooperating.
pub const LOW_TRUST_THRESHOLD: f64 = 25.0;
pub const LOW_TRUST_CLEARANCE_FACTOR: f64 = 0.8;

/// Fraction of the gap to the district floor the false-arrest rate closes
/// each round.
pub const FALSE_ARREST_DRIFT: f64 = 0.2;

pub const OVERPOLICING_TRUST_PENALTY: f64 = 4.0;
/// False-arrest rates below this feed trust back up...
pub const LOW_FAR_THRESHOLD: f64 = 10.0;
pub const LOW_FAR_TRUST_BONUS: f64 = 1.5;
/// ...and above this, erode it.
pub const HIGH_FAR_THRESHOLD: f64 = 20.0;
pub const HIGH_FAR_TRUST_PENALTY: f64 = 2.0;

/// Population growth per unit of normalized trust above the midpoint.
pub const POP_TRUST_COEFF: f64 = 0.004;
/// Population growth per unit of relative crime decline.
pub const POP_CRIME_COEFF: f64 = 0.003;

/// Converts accumulated surveillance skew into a breakdown drift fraction.
pub const SKEW_DRIFT_SCALE: f64 = 0.05;
pub const SKEW_DRIFT_MAX: f64 = 0.2;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything the dynamics pass needs for one district.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DistrictInputs<'a> {
    pub district: &'a District,
    pub prev: &'a Metrics,
    pub shifts: ShiftAllocation,
    /// One-shot modifiers from an action implemented this round.
    pub immediate: ActionEffects,
    /// Per-round contributions from previously implemented actions.
    pub standing: StandingEffects,
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Compute the next round's metrics for one district. Pure; clamps own every
/// output range (trust and false-arrest in [0,100], counts non-negative,
/// arrests bounded by crimes, breakdowns renormalized to 100).
pub fn advance_district(inputs: &DistrictInputs) -> Metrics {
    let d = inputs.district;
    let prev = inputs.prev;
    let eff = d.effective_enforcement(inputs.shifts.day, inputs.shifts.night);

    let crimes_reported = next_crimes(prev, eff, inputs.immediate.crime_delta);
    let arrests = next_arrests(prev, crimes_reported, eff, inputs.standing.clearance_bonus);
    let false_arrest_rate = next_false_arrest_rate(
        prev,
        d,
        inputs.immediate.false_arrest_delta,
        inputs.standing.false_arrest_pressure,
    );
    let community_trust = next_trust(
        prev,
        inputs.shifts,
        inputs.immediate.trust_delta,
        inputs.standing.trust_drift,
    );
    let population = next_population(prev, crimes_reported, community_trust);

    let (arrests_by_race, arrests_by_income) = next_breakdowns(prev, d, inputs.standing.skew);

    Metrics {
        community_trust,
        crimes_reported,
        arrests,
        false_arrest_rate,
        population,
        arrests_by_race,
        arrests_by_income,
        common_crimes: prev.common_crimes,
    }
}

/// Crime falls with enforcement above equilibrium and with trust above the
/// midpoint (cooperative reporting), rises under the opposite; immediate
/// action deltas land on top. Floored at zero.
fn next_crimes(prev: &Metrics, eff: f64, immediate_delta: f64) -> u32 {
    let enforcement_pressure = CRIME_ENFORCEMENT_COEFF * (eff - EFF_EQUILIBRIUM);
    let trust_pressure = CRIME_TRUST_COEFF * (prev.community_trust - 50.0) / 50.0;
    let projected =
        prev.crimes_reported as f64 * (1.0 - enforcement_pressure - trust_pressure) + immediate_delta;
    projected.round().max(0.0) as u32
}

/// Arrests scale with enforcement and standing surveillance, drop when the
/// community stops talking to the police, and never exceed reported crimes.
fn next_arrests(prev: &Metrics, crimes: u32, eff: f64, clearance_bonus: f64) -> u32 {
    let mut clearance =
        BASE_CLEARANCE + CLEARANCE_ENFORCEMENT_COEFF * (eff - EFF_EQUILIBRIUM) + clearance_bonus;
    if prev.community_trust < LOW_TRUST_THRESHOLD {
        clearance *= LOW_TRUST_CLEARANCE_FACTOR;
    }
    let raw = (crimes as f64 * clearance.max(0.0)).round().max(0.0) as u32;
    raw.min(crimes)
}

fn next_false_arrest_rate(
    prev: &Metrics,
    district: &District,
    immediate_delta: f64,
    standing_pressure: f64,
) -> f64 {
    let drift = FALSE_ARREST_DRIFT * (district.false_arrest_floor - prev.false_arrest_rate);
    (prev.false_arrest_rate + drift + immediate_delta + standing_pressure).clamp(0.0, 100.0)
}

fn next_trust(
    prev: &Metrics,
    shifts: ShiftAllocation,
    immediate_delta: f64,
    standing_drift: f64,
) -> f64 {
    let mut trust = prev.community_trust + immediate_delta + standing_drift;
    if shifts.total() > OVERPOLICING_THRESHOLD {
        trust -= OVERPOLICING_TRUST_PENALTY;
    }
    if prev.false_arrest_rate < LOW_FAR_THRESHOLD {
        trust += LOW_FAR_TRUST_BONUS;
    } else if prev.false_arrest_rate > HIGH_FAR_THRESHOLD {
        trust -= HIGH_FAR_TRUST_PENALTY;
    }
    trust.clamp(0.0, 100.0)
}

/// Residents follow safety and trust: growth when trust is above the midpoint
/// and crime is falling, decline under the opposite conditions.
fn next_population(prev: &Metrics, crimes: u32, trust: f64) -> u64 {
    let crime_decline = (prev.crimes_reported as f64 - crimes as f64)
        / (prev.crimes_reported.max(1)) as f64;
    let growth = POP_TRUST_COEFF * (trust - 50.0) / 50.0 + POP_CRIME_COEFF * crime_decline;
    (prev.population as f64 * (1.0 + growth)).round().max(0.0) as u64
}

/// Arrest composition drifts toward the over-policing profile while
/// surveillance skew dominates, and back toward demographic parity while
/// relief programs dominate. Invariant: both tables sum to 100 afterwards.
fn next_breakdowns(
    prev: &Metrics,
    district: &District,
    skew: f64,
) -> (RaceBreakdown, IncomeBreakdown) {
    let mut by_race = prev.arrests_by_race;
    let mut by_income = prev.arrests_by_income;

    let drift = (skew * SKEW_DRIFT_SCALE).clamp(-SKEW_DRIFT_MAX, SKEW_DRIFT_MAX);
    if drift > 0.0 {
        by_race.drift_toward(&overpoliced_race_profile(district), drift);
        by_income.drift_toward(&overpoliced_income_profile(district), drift);
    } else if drift < 0.0 {
        by_race.drift_toward(&district.ethnicity, -drift);
        by_income.drift_toward(&district.income_mix, -drift);
    }
    (by_race, by_income)
}

/// Where automated surveillance concentrates arrests: minority and
/// low-income shares over-weighted relative to the resident composition.
fn overpoliced_race_profile(district: &District) -> RaceBreakdown {
    let e = &district.ethnicity;
    let mut profile = RaceBreakdown {
        white: e.white * 0.4,
        black: e.black * 1.8,
        hispanic: e.hispanic * 1.4,
        other: e.other * 0.8,
    };
    profile.normalize();
    profile
}

fn overpoliced_income_profile(district: &District) -> IncomeBreakdown {
    let m = &district.income_mix;
    let mut profile = IncomeBreakdown {
        high: m.high * 0.4,
        middle: m.middle * 0.9,
        low: m.low * 1.8,
    };
    profile.normalize();
    profile
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
