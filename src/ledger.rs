// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Treasury Conservation

//! Conservation checks over the round log.
//!
//! The treasury obeys two invariants the rest of the engine promises but
//! never re-derives:
//!
//! ```text
//! per round:   current = previous + income - expenses
//! whole game:  final   = opening  + sum(income) - sum(expenses)
//! ```
//!
//! Arithmetic is `Decimal`-exact, so unlike a float ledger there is no
//! tolerance band: any nonzero drift is a defect. Tests and the benchmark
//! audit trail call these after every resolved round.

use serde::Serialize;

use crate::types::{Money, RoundLogEntry};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("round {round}: budget identity broken (expected {expected}, got {actual})")]
    RoundImbalance { round: u32, expected: Money, actual: Money },

    #[error("round {round}: opening balance does not chain from the prior round")]
    BrokenChain { round: u32 },

    #[error("treasury drift across the log: expected {expected}, got {actual}")]
    TreasuryDrift { expected: Money, actual: Money },
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Verify one logged round's budget identity.
pub fn verify_entry(entry: &RoundLogEntry) -> Result<(), LedgerError> {
    let expected = entry.budget.previous + entry.budget.income - entry.budget.expenses;
    if expected != entry.budget.current {
        return Err(LedgerError::RoundImbalance {
            round: entry.round,
            expected,
            actual: entry.budget.current,
        });
    }
    Ok(())
}

/// Audit summary over a whole log, for the benchmark report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerReport {
    pub rounds_checked: usize,
    pub total_income: Money,
    pub total_expenses: Money,
    pub closing_balance: Money,
}

/// Verify every entry, the chain between entries, and whole-game
/// conservation from the opening balance.
pub fn verify_log(opening: Money, log: &[RoundLogEntry]) -> Result<LedgerReport, LedgerError> {
    let mut total_income = Money::zero();
    let mut total_expenses = Money::zero();
    let mut balance = opening;

    for entry in log {
        verify_entry(entry)?;
        if entry.budget.previous != balance {
            return Err(LedgerError::BrokenChain { round: entry.round });
        }
        total_income += entry.budget.income;
        total_expenses += entry.budget.expenses;
        balance = entry.budget.current;
    }

    let expected = opening + total_income - total_expenses;
    if expected != balance {
        return Err(LedgerError::TreasuryDrift { expected, actual: balance });
    }

    Ok(LedgerReport {
        rounds_checked: log.len(),
        total_income,
        total_expenses,
        closing_balance: balance,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::PoliceAllocation;
    use crate::district::{District, DistrictMap};
    use crate::types::{Budget, MetricChanges};

    fn entry(round: u32, previous: i64, income: i64, expenses: i64) -> RoundLogEntry {
        let metrics = DistrictMap::from_fn(|id| District::of(id).initial_metrics());
        let changes = metrics.map(|_, m| MetricChanges::between(m, m));
        let previous = Money::from_dollars(previous);
        let income = Money::from_dollars(income);
        let expenses = Money::from_dollars(expenses);
        RoundLogEntry {
            round,
            police_allocation: PoliceAllocation::default(),
            population: metrics.iter().map(|(_, m)| m.population).sum(),
            budget: Budget {
                previous,
                income,
                expenses,
                current: previous + income - expenses,
                details: Vec::new(),
            },
            metrics,
            metric_changes: changes,
            actions_taken: Vec::new(),
            racial_bias_index: 0.0,
            economic_bias_index: 0.0,
            changes: Vec::new(),
            special_events: Vec::new(),
            feedback: String::new(),
        }
    }

    #[test]
    fn balanced_log_passes() {
        let log = vec![
            entry(1, 400_000, 167_194, 120_000),
            entry(2, 447_194, 167_194, 390_000),
        ];
        let report = verify_log(Money::from_dollars(400_000), &log).expect("log should balance");
        assert_eq!(report.rounds_checked, 2);
        assert_eq!(report.closing_balance, Money::from_dollars(224_388));
        assert_eq!(report.total_income, Money::from_dollars(334_388));
    }

    #[test]
    fn tampered_entry_is_caught() {
        let mut bad = entry(1, 400_000, 167_194, 120_000);
        bad.budget.current = Money::from_dollars(999_999);
        let err = verify_entry(&bad).unwrap_err();
        assert!(matches!(err, LedgerError::RoundImbalance { round: 1, .. }));
    }

    #[test]
    fn broken_chain_is_caught() {
        let log = vec![
            entry(1, 400_000, 167_194, 120_000),
            // Round 2 opens from a balance that round 1 never produced.
            entry(2, 500_000, 167_194, 120_000),
        ];
        let err = verify_log(Money::from_dollars(400_000), &log).unwrap_err();
        assert_eq!(err, LedgerError::BrokenChain { round: 2 });
    }

    #[test]
    fn empty_log_balances_trivially() {
        let report = verify_log(Money::from_dollars(400_000), &[]).unwrap();
        assert_eq!(report.rounds_checked, 0);
        assert_eq!(report.closing_balance, Money::from_dollars(400_000));
    }
}
