// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Bias / Equity Indices

use serde::Serialize;

use crate::district::{DistrictId, DistrictMap};
use crate::types::Metrics;

/// Index values above this flag a disparity warning for the feedback and
/// event systems.
pub const BIAS_WARNING_THRESHOLD: f64 = 30.0;

/// Normalized 0-100 disparity between the most- and least-favored district's
/// arrest composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiasReport {
    pub racial_bias_index: f64,
    pub economic_bias_index: f64,
}

impl BiasReport {
    pub fn exceeds_warning(&self) -> bool {
        self.racial_bias_index > BIAS_WARNING_THRESHOLD
            || self.economic_bias_index > BIAS_WARNING_THRESHOLD
    }
}

/// Derive both indices from the per-district arrest breakdowns.
///
/// Pure; assumes each breakdown already sums to 100 (owned by the dynamics
/// pass). The poorest district's over-represented groups are compared against
/// the favored group of the wealthiest district.
pub fn compute_bias(metrics: &DistrictMap<Metrics>) -> BiasReport {
    let poorest = metrics.get(DistrictId::LOWEST_INCOME);
    let wealthiest = metrics.get(DistrictId::HIGHEST_INCOME);

    let reference_race = wealthiest.arrests_by_race.white;
    let racial = ((poorest.arrests_by_race.black - reference_race).abs()
        + (poorest.arrests_by_race.hispanic - reference_race).abs())
        / 2.0;

    let reference_income = wealthiest.arrests_by_income.high;
    let economic = ((poorest.arrests_by_income.low - reference_income).abs()
        + (poorest.arrests_by_income.middle - reference_income).abs())
        / 2.0;

    BiasReport {
        racial_bias_index: racial.clamp(0.0, 100.0),
        economic_bias_index: economic.clamp(0.0, 100.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
