// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Budget Economy

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::allocation::PoliceAllocation;
use crate::district::{District, DistrictMap};
use crate::types::{ActionRecord, Budget, Metrics, Money};

// ---------------------------------------------------------------------------
// Tuning constants
// ---------------------------------------------------------------------------

/// Treasury balance at game start.
pub const INITIAL_TREASURY: Decimal = dec!(400_000);

/// Per-round salary for each deployed officer. Reserve officers are unpaid.
pub const OFFICER_SALARY: Decimal = dec!(6_000);

/// Below this balance the low-funds warning event arms.
pub const LOW_FUNDS_THRESHOLD: Decimal = dec!(100_000);

/// Per-resident, per-round tax contribution by income bracket.
const TAX_RATE_HIGH: f64 = 0.9;
const TAX_RATE_MIDDLE: f64 = 0.5;
const TAX_RATE_LOW: f64 = 0.2;

// ---------------------------------------------------------------------------
// Income
// ---------------------------------------------------------------------------

/// Tax revenue a district contributes this round: population weighted by its
/// income-bracket mix. Wealthier, larger districts pay proportionally more.
pub fn district_tax_revenue(district: &District, population: u64) -> Money {
    let mix = &district.income_mix;
    let per_capita = (mix.high / 100.0) * TAX_RATE_HIGH
        + (mix.middle / 100.0) * TAX_RATE_MIDDLE
        + (mix.low / 100.0) * TAX_RATE_LOW;
    let revenue = population as f64 * per_capita;
    Money::from_decimal(Decimal::from_f64(revenue).unwrap_or(Decimal::ZERO).round_dp(0))
}

// ---------------------------------------------------------------------------
// Round settlement
// ---------------------------------------------------------------------------

/// Compute one round's ledger: tax income across districts, salaries for the
/// deployed force, one-time costs of newly implemented actions. The identity
/// `current = previous + income - expenses` holds exactly by construction.
pub fn settle_round(
    previous_balance: Money,
    allocation: &PoliceAllocation,
    actions_taken: &[ActionRecord],
    metrics: &DistrictMap<Metrics>,
) -> Budget {
    let mut details = Vec::new();
    let mut income = Money::zero();
    let mut expenses = Money::zero();

    for (id, m) in metrics.iter() {
        let revenue = district_tax_revenue(District::of(id), m.population);
        income += revenue;
        details.push(format!("Tax revenue — {}: +{}", id.name(), revenue));
    }

    let deployed = allocation.total_allocated();
    let salaries = Money::from_decimal(OFFICER_SALARY * Decimal::from(deployed));
    expenses += salaries;
    details.push(format!("Officer salaries ({deployed} deployed): -{salaries}"));

    for record in actions_taken {
        let cost = record.action.cost();
        expenses += cost;
        details.push(format!(
            "{} — {}: -{}",
            record.action.label(),
            record.district.name(),
            cost
        ));
    }

    let current = previous_balance + income - expenses;
    Budget {
        previous: previous_balance,
        income,
        expenses,
        current,
        details,
    }
}

/// Fold a special-event delta into the ledger so the budget identity
/// survives the corrective event pass. Positive amounts count as income,
/// negative as expenses; `current` is recomputed from the identity.
pub fn apply_event_adjustment(budget: &mut Budget, label: &str, amount: Money) {
    if amount.is_negative() {
        budget.expenses += amount.abs();
        budget.details.push(format!("Special event — {label}: -{}", amount.abs()));
    } else {
        budget.income += amount;
        budget.details.push(format!("Special event — {label}: +{amount}"));
    }
    budget.current = budget.previous + budget.income - budget.expenses;
}

/// The bankruptcy signal: a negative treasury after a round resolves.
pub fn is_bankrupt(budget: &Budget) -> bool {
    budget.current.is_negative()
}

/// Whether the low-funds warning threshold is breached (but still solvent).
pub fn is_low_funds(budget: &Budget) -> bool {
    !is_bankrupt(budget) && budget.current.0 < LOW_FUNDS_THRESHOLD
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;
    use crate::district::DistrictId;
    use crate::types::ActionRecord;

    fn initial_metrics() -> DistrictMap<Metrics> {
        DistrictMap::from_fn(|id| District::of(id).initial_metrics())
    }

    #[test]
    fn initial_city_tax_revenue() {
        let city = initial_metrics();
        let total: Money = city
            .iter()
            .map(|(id, m)| district_tax_revenue(District::of(id), m.population))
            .fold(Money::zero(), |acc, r| acc + r);
        // 63648 + 46288 + 34350 + 22908
        assert_eq!(total, Money::from_dollars(167_194));
    }

    #[test]
    fn wealthier_districts_contribute_more_per_capita() {
        let downtown = district_tax_revenue(District::of(DistrictId::Downtown), 10_000);
        let southside = district_tax_revenue(District::of(DistrictId::Southside), 10_000);
        assert!(downtown.0 > southside.0 * dec!(1.5));
    }

    #[test]
    fn settle_round_identity_holds() {
        let budget = settle_round(
            Money::from_decimal(INITIAL_TREASURY),
            &PoliceAllocation::default(),
            &[],
            &initial_metrics(),
        );
        assert_eq!(budget.current, budget.previous + budget.income - budget.expenses);
        assert_eq!(budget.income, Money::from_dollars(167_194));
        assert_eq!(budget.expenses, Money::from_dollars(120_000));
        assert_eq!(budget.current, Money::from_dollars(447_194));
        assert!(!is_bankrupt(&budget));
        // Four tax lines plus the salary line.
        assert_eq!(budget.details.len(), 5);
    }

    #[test]
    fn reserve_officers_draw_no_salary() {
        let thinned = PoliceAllocation::default()
            .with_shift_count(DistrictId::Downtown, crate::types::Shift::Day, 1)
            .unwrap();
        let budget = settle_round(
            Money::from_decimal(INITIAL_TREASURY),
            &thinned,
            &[],
            &initial_metrics(),
        );
        // 18 deployed x 6000
        assert_eq!(budget.expenses, Money::from_dollars(108_000));
    }

    #[test]
    fn action_costs_are_one_time_expenses() {
        let taken = [
            ActionRecord { district: DistrictId::Southside, action: ActionId::Cctv },
            ActionRecord { district: DistrictId::Eastvale, action: ActionId::DroneSurveillance },
        ];
        let budget = settle_round(
            Money::from_decimal(INITIAL_TREASURY),
            &PoliceAllocation::default(),
            &taken,
            &initial_metrics(),
        );
        // salaries 120000 + cctv 120000 + drone 150000
        assert_eq!(budget.expenses, Money::from_dollars(390_000));
        assert!(budget.details.iter().any(|l| l.contains("CCTV network — Southside")));
    }

    #[test]
    fn overspending_goes_bankrupt() {
        let taken = [
            ActionRecord { district: DistrictId::Southside, action: ActionId::FacialRecognition },
            ActionRecord { district: DistrictId::Northgate, action: ActionId::DroneSurveillance },
        ];
        let budget = settle_round(
            Money::from_dollars(250_000),
            &PoliceAllocation::default(),
            &taken,
            &initial_metrics(),
        );
        // 250000 + 167194 - (120000 + 180000 + 150000) = -32806
        assert_eq!(budget.current, Money::from_dollars(-32_806));
        assert!(is_bankrupt(&budget));
    }

    #[test]
    fn event_adjustments_preserve_the_identity() {
        let mut budget = settle_round(
            Money::from_decimal(INITIAL_TREASURY),
            &PoliceAllocation::default(),
            &[],
            &initial_metrics(),
        );
        apply_event_adjustment(&mut budget, "Civil rights probe", Money::from_dollars(-50_000));
        assert_eq!(budget.current, budget.previous + budget.income - budget.expenses);
        assert_eq!(budget.current, Money::from_dollars(397_194));

        apply_event_adjustment(&mut budget, "Federal grant", Money::from_dollars(75_000));
        assert_eq!(budget.current, budget.previous + budget.income - budget.expenses);
        assert_eq!(budget.current, Money::from_dollars(472_194));
        assert!(budget.details.iter().any(|l| l.contains("Federal grant")));
    }

    #[test]
    fn low_funds_threshold() {
        let mut budget = Budget::opening(Money::from_dollars(90_000));
        assert!(is_low_funds(&budget));
        budget.current = Money::from_dollars(-1);
        assert!(!is_low_funds(&budget), "bankrupt is not merely low funds");
        budget.current = Money::from_dollars(100_000);
        assert!(!is_low_funds(&budget));
    }
}
