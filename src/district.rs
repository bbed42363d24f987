// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - District Catalog

use serde::{Deserialize, Serialize};

use crate::types::{IncomeBreakdown, Metrics, RaceBreakdown, Shift};

// ─── District identity ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DistrictId {
    Downtown,
    Northgate,
    Eastvale,
    Southside,
}

impl DistrictId {
    pub const ALL: [DistrictId; 4] = [
        DistrictId::Downtown,
        DistrictId::Northgate,
        DistrictId::Eastvale,
        DistrictId::Southside,
    ];

    /// Wealthiest district by income mix; reference point for the bias indices.
    pub const HIGHEST_INCOME: DistrictId = DistrictId::Downtown;

    /// Poorest district by income mix; comparison point for the bias indices.
    pub const LOWEST_INCOME: DistrictId = DistrictId::Southside;

    pub fn index(&self) -> usize {
        match self {
            Self::Downtown => 0,
            Self::Northgate => 1,
            Self::Eastvale => 2,
            Self::Southside => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        District::of(*self).name
    }
}

// ─── DistrictMap ─────────────────────────────────────────────────────────────

/// Fixed-size per-district table keyed by `DistrictId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DistrictMap<T>([T; 4]);

impl<T: Default> Default for DistrictMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> DistrictMap<T> {
    pub fn from_fn(mut f: impl FnMut(DistrictId) -> T) -> Self {
        Self([
            f(DistrictId::Downtown),
            f(DistrictId::Northgate),
            f(DistrictId::Eastvale),
            f(DistrictId::Southside),
        ])
    }

    pub fn get(&self, id: DistrictId) -> &T {
        &self.0[id.index()]
    }

    pub fn get_mut(&mut self, id: DistrictId) -> &mut T {
        &mut self.0[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (DistrictId, &T)> {
        DistrictId::ALL.iter().map(move |&id| (id, &self.0[id.index()]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(DistrictId, &T) -> U) -> DistrictMap<U> {
        DistrictMap::from_fn(|id| f(id, self.get(id)))
    }
}

// ─── Static catalog ──────────────────────────────────────────────────────────

/// Static per-district demographic and effectiveness data. Immutable for the
/// game's lifetime; every dynamic quantity lives in `Metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct District {
    pub id: DistrictId,
    pub name: &'static str,
    pub profile: &'static str,
    /// Resident ethnicity composition (sums to 100).
    pub ethnicity: RaceBreakdown,
    /// Resident income-bracket composition (sums to 100).
    pub income_mix: IncomeBreakdown,
    /// Day-shift enforcement multiplier.
    pub day_multiplier: f64,
    /// Night-shift enforcement multiplier.
    pub night_multiplier: f64,
    /// Rate the false-arrest baseline drifts toward each round.
    pub false_arrest_floor: f64,
    /// Minimum-trust soft threshold, consulted only by end-game grading.
    pub trust_target: f64,
}

const DOWNTOWN: District = District {
    id: DistrictId::Downtown,
    name: "Downtown",
    profile: "commercial core, high income",
    ethnicity: RaceBreakdown { white: 58.0, black: 14.0, hispanic: 16.0, other: 12.0 },
    income_mix: IncomeBreakdown { high: 52.0, middle: 33.0, low: 15.0 },
    day_multiplier: 1.0,
    night_multiplier: 0.7,
    false_arrest_floor: 4.0,
    trust_target: 55.0,
};

const NORTHGATE: District = District {
    id: DistrictId::Northgate,
    name: "Northgate",
    profile: "mixed residential",
    ethnicity: RaceBreakdown { white: 44.0, black: 24.0, hispanic: 20.0, other: 12.0 },
    income_mix: IncomeBreakdown { high: 26.0, middle: 48.0, low: 26.0 },
    day_multiplier: 0.9,
    night_multiplier: 1.0,
    false_arrest_floor: 6.0,
    trust_target: 50.0,
};

const EASTVALE: District = District {
    id: DistrictId::Eastvale,
    name: "Eastvale",
    profile: "industrial and commercial, high diversity",
    ethnicity: RaceBreakdown { white: 30.0, black: 28.0, hispanic: 30.0, other: 12.0 },
    income_mix: IncomeBreakdown { high: 18.0, middle: 44.0, low: 38.0 },
    day_multiplier: 1.2,
    night_multiplier: 0.8,
    false_arrest_floor: 7.0,
    trust_target: 45.0,
};

const SOUTHSIDE: District = District {
    id: DistrictId::Southside,
    name: "Southside",
    profile: "low income, predominantly minority",
    ethnicity: RaceBreakdown { white: 16.0, black: 42.0, hispanic: 34.0, other: 8.0 },
    income_mix: IncomeBreakdown { high: 6.0, middle: 30.0, low: 64.0 },
    day_multiplier: 0.7,
    night_multiplier: 1.3,
    false_arrest_floor: 9.0,
    trust_target: 40.0,
};

impl District {
    pub fn of(id: DistrictId) -> &'static District {
        match id {
            DistrictId::Downtown => &DOWNTOWN,
            DistrictId::Northgate => &NORTHGATE,
            DistrictId::Eastvale => &EASTVALE,
            DistrictId::Southside => &SOUTHSIDE,
        }
    }

    // ─── Shift effectiveness model ───────────────────────────────────────────

    /// Effective enforcement contributed by one shift:
    /// `officers x districtMultiplier[shift]`.
    pub fn shift_effectiveness(&self, shift: Shift, officers: u32) -> f64 {
        let mult = match shift {
            Shift::Day => self.day_multiplier,
            Shift::Night => self.night_multiplier,
        };
        officers as f64 * mult
    }

    /// Combined effective enforcement over both shifts.
    pub fn effective_enforcement(&self, day_officers: u32, night_officers: u32) -> f64 {
        self.shift_effectiveness(Shift::Day, day_officers)
            + self.shift_effectiveness(Shift::Night, night_officers)
    }

    /// Round-zero metrics snapshot for this district.
    pub fn initial_metrics(&self) -> Metrics {
        match self.id {
            DistrictId::Downtown => Metrics {
                community_trust: 62.0,
                crimes_reported: 28,
                arrests: 10,
                false_arrest_rate: 6.0,
                population: 96_000,
                arrests_by_race: RaceBreakdown { white: 40.0, black: 26.0, hispanic: 22.0, other: 12.0 },
                arrests_by_income: IncomeBreakdown { high: 20.0, middle: 34.0, low: 46.0 },
                common_crimes: ["theft", "vandalism", "fraud"],
            },
            DistrictId::Northgate => Metrics {
                community_trust: 48.0,
                crimes_reported: 36,
                arrests: 12,
                false_arrest_rate: 9.0,
                population: 88_000,
                arrests_by_race: RaceBreakdown { white: 30.0, black: 34.0, hispanic: 26.0, other: 10.0 },
                arrests_by_income: IncomeBreakdown { high: 10.0, middle: 38.0, low: 52.0 },
                common_crimes: ["burglary", "assault", "vehicle theft"],
            },
            DistrictId::Eastvale => Metrics {
                community_trust: 41.0,
                crimes_reported: 44,
                arrests: 15,
                false_arrest_rate: 12.0,
                population: 75_000,
                arrests_by_race: RaceBreakdown { white: 20.0, black: 36.0, hispanic: 32.0, other: 12.0 },
                arrests_by_income: IncomeBreakdown { high: 8.0, middle: 34.0, low: 58.0 },
                common_crimes: ["cargo theft", "drug offenses", "assault"],
            },
            DistrictId::Southside => Metrics {
                community_trust: 27.0,
                crimes_reported: 58,
                arrests: 19,
                false_arrest_rate: 16.0,
                population: 69_000,
                arrests_by_race: RaceBreakdown { white: 8.0, black: 52.0, hispanic: 34.0, other: 6.0 },
                arrests_by_income: IncomeBreakdown { high: 3.0, middle: 22.0, low: 75.0 },
                common_crimes: ["robbery", "drug offenses", "gang activity"],
            },
        }
    }
}

/// Fail-fast check of the static catalog. Demographic tables not summing to
/// 100 are programming errors, caught at initialization rather than handled
/// at runtime.
pub fn validate_catalog() {
    for id in DistrictId::ALL {
        let d = District::of(id);
        assert!(
            (d.ethnicity.sum() - 100.0).abs() < 1e-9,
            "{}: ethnicity percentages must sum to 100",
            d.name
        );
        assert!(
            (d.income_mix.sum() - 100.0).abs() < 1e-9,
            "{}: income percentages must sum to 100",
            d.name
        );
        let m = d.initial_metrics();
        assert!(
            (m.arrests_by_race.sum() - 100.0).abs() < 1e-9,
            "{}: arrest race breakdown must sum to 100",
            d.name
        );
        assert!(
            (m.arrests_by_income.sum() - 100.0).abs() < 1e-9,
            "{}: arrest income breakdown must sum to 100",
            d.name
        );
        assert!(d.day_multiplier > 0.0 && d.night_multiplier > 0.0);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_valid() {
        validate_catalog();
    }

    #[test]
    fn shift_effectiveness_applies_multipliers() {
        let downtown = District::of(DistrictId::Downtown);
        assert!((downtown.shift_effectiveness(Shift::Day, 3) - 3.0).abs() < 1e-9);
        assert!((downtown.shift_effectiveness(Shift::Night, 2) - 1.4).abs() < 1e-9);

        let southside = District::of(DistrictId::Southside);
        // Night patrols dominate where night crime does.
        assert!((southside.shift_effectiveness(Shift::Night, 2) - 2.6).abs() < 1e-9);
        assert!((southside.effective_enforcement(3, 2) - 4.7).abs() < 1e-9);
    }

    #[test]
    fn income_extremes_match_catalog() {
        let mut ids: Vec<DistrictId> = DistrictId::ALL.to_vec();
        ids.sort_by(|a, b| {
            District::of(*a)
                .income_mix
                .high
                .partial_cmp(&District::of(*b).income_mix.high)
                .unwrap()
        });
        assert_eq!(ids[0], DistrictId::LOWEST_INCOME);
        assert_eq!(ids[3], DistrictId::HIGHEST_INCOME);
    }

    #[test]
    fn district_map_round_trips_ids() {
        let map = DistrictMap::from_fn(|id| id.index());
        for (id, &idx) in map.iter() {
            assert_eq!(id.index(), idx);
        }
        let doubled = map.map(|_, &v| v * 2);
        assert_eq!(*doubled.get(DistrictId::Southside), 6);
    }

    #[test]
    fn initial_metrics_within_bounds() {
        for id in DistrictId::ALL {
            let m = District::of(id).initial_metrics();
            assert!((0.0..=100.0).contains(&m.community_trust));
            assert!((0.0..=100.0).contains(&m.false_arrest_rate));
            assert!(m.arrests <= m.crimes_reported);
            assert!(m.population > 0);
        }
    }
}
