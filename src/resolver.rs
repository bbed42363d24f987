// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Round Resolver & State Machine

use serde::Serialize;

use crate::action::{standing_effects, ActionEffects, DistrictActions};
use crate::allocation::{AllocationError, PoliceAllocation};
use crate::bias::{compute_bias, BIAS_WARNING_THRESHOLD};
use crate::district::{validate_catalog, District, DistrictId, DistrictMap};
use crate::dynamics::{advance_district, DistrictInputs};
use crate::economy::{self, INITIAL_TREASURY};
use crate::events;
use crate::feedback::{compose_feedback, describe_changes, RoundContext};
use crate::types::{
    ActionRecord, Budget, EndReason, GamePhase, GameState, MetricChanges, Money, RoundLogEntry,
};

/// Rounds in a full game.
pub const FINAL_ROUND: u32 = 10;

/// Seed used by `create_initial_state`; sessions that want reproducible event
/// draws of their own pass an explicit seed to [`new_game`].
pub const DEFAULT_EVENT_SEED: u64 = 17;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("the game has ended; restart to play again")]
    GameOver,

    #[error("rounds resolve from the allocating phase only")]
    WrongPhase,

    #[error(transparent)]
    InvalidAllocation(#[from] AllocationError),

    #[error(transparent)]
    InvalidAction(#[from] crate::action::ActionError),
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Fresh game with the default event seed.
pub fn create_initial_state() -> GameState {
    new_game(DEFAULT_EVENT_SEED)
}

/// Fresh game at round 1: default deployment, empty log, opening treasury.
/// Asserts the static catalog invariants once, up front.
pub fn new_game(event_seed: u64) -> GameState {
    validate_catalog();
    let metrics = DistrictMap::from_fn(|id| District::of(id).initial_metrics());
    let bias = compute_bias(&metrics);
    GameState {
        current_round: 1,
        phase: GamePhase::Allocating,
        police_allocation: PoliceAllocation::default(),
        pending_actions: DistrictActions::default(),
        implemented_actions: Default::default(),
        metrics,
        budget: Budget::opening(Money::from_decimal(INITIAL_TREASURY)),
        racial_bias_index: bias.racial_bias_index,
        economic_bias_index: bias.economic_bias_index,
        game_log: Vec::new(),
        end_reason: None,
        event_seed,
    }
}

/// Reinitialize to round 1 with the default allocation and an empty log.
pub fn restart() -> GameState {
    create_initial_state()
}

// ---------------------------------------------------------------------------
// Round resolution
// ---------------------------------------------------------------------------

/// Output of one committed round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundOutcome {
    pub next_state: GameState,
    pub entry: RoundLogEntry,
}

/// The state transition. Pure: identical `(state, allocation, actions)`
/// resolve to identical outcomes, event draws included (the PRNG is seeded
/// from `state.event_seed` and the round number). The input state is never
/// mutated; callers replace their reference with `next_state`.
pub fn resolve_round(
    state: &GameState,
    allocation: &PoliceAllocation,
    actions: &DistrictActions,
) -> Result<RoundOutcome, ResolveError> {
    if state.phase.is_terminal() || state.end_reason.is_some() {
        return Err(ResolveError::GameOver);
    }
    if state.phase != GamePhase::Allocating {
        return Err(ResolveError::WrongPhase);
    }
    allocation.check_invariant()?;
    actions.validate_against(&state.implemented_actions)?;

    let actions_taken: Vec<ActionRecord> = actions
        .entries()
        .into_iter()
        .map(|(district, action)| ActionRecord { district, action })
        .collect();

    // Dynamics pass: shift effectiveness -> action effects -> metric drift.
    let mut metrics = DistrictMap::from_fn(|id| {
        let district = District::of(id);
        let prev = state.metrics.get(id);
        let immediate = actions
            .pending(id)
            .map(|a| a.immediate_effects(district, prev))
            .unwrap_or_else(ActionEffects::default);
        let standing =
            standing_effects(state.implemented_actions.implemented(id), district, prev);
        advance_district(&DistrictInputs {
            district,
            prev,
            shifts: *allocation.districts.get(id),
            immediate,
            standing,
        })
    });

    let implemented_actions = actions_taken.iter().fold(
        state.implemented_actions.clone(),
        |acc, record| acc.with_implemented(record.district, record.action),
    );

    // Events do not touch the arrest composition, so the indices computed
    // here stay valid for the logged entry.
    let bias = compute_bias(&metrics);

    let mut budget = economy::settle_round(
        state.budget.current,
        allocation,
        &actions_taken,
        &metrics,
    );

    let mut rng = events::round_rng(state.event_seed, state.current_round);
    let special_events = events::fire_events(&mut metrics, &mut budget, &bias, &mut rng);

    let bankrupt = economy::is_bankrupt(&budget);
    let (phase, end_reason) = if bankrupt {
        (GamePhase::Bankrupt, Some(EndReason::Bankrupt))
    } else if state.current_round >= FINAL_ROUND {
        (GamePhase::Completed, Some(EndReason::Completed))
    } else {
        (GamePhase::Summarizing, None)
    };

    let feedback = compose_feedback(&RoundContext {
        previous: &state.metrics,
        metrics: &metrics,
        budget: &budget,
        bias: &bias,
        allocation,
        bankrupt,
    });
    let changes = describe_changes(&state.metrics, &metrics);
    let metric_changes = metrics.map(|id, next| MetricChanges::between(state.metrics.get(id), next));

    let entry = RoundLogEntry {
        round: state.current_round,
        police_allocation: *allocation,
        metrics: metrics.clone(),
        population: metrics.iter().map(|(_, m)| m.population).sum(),
        budget: budget.clone(),
        metric_changes,
        actions_taken,
        racial_bias_index: bias.racial_bias_index,
        economic_bias_index: bias.economic_bias_index,
        changes,
        special_events,
        feedback,
    };

    let mut game_log = state.game_log.clone();
    game_log.push(entry.clone());

    let next_state = GameState {
        current_round: state.current_round,
        phase,
        police_allocation: *allocation,
        pending_actions: DistrictActions::default(),
        implemented_actions,
        metrics,
        budget,
        racial_bias_index: bias.racial_bias_index,
        economic_bias_index: bias.economic_bias_index,
        game_log,
        end_reason,
        event_seed: state.event_seed,
    };

    Ok(RoundOutcome { next_state, entry })
}

/// Summarizing -> Allocating for the next round.
pub fn advance_round(state: &GameState) -> Result<GameState, ResolveError> {
    if state.phase.is_terminal() {
        return Err(ResolveError::GameOver);
    }
    if state.phase != GamePhase::Summarizing {
        return Err(ResolveError::WrongPhase);
    }
    let mut next = state.clone();
    next.current_round += 1;
    next.phase = GamePhase::Allocating;
    next.pending_actions = DistrictActions::default();
    Ok(next)
}

// ---------------------------------------------------------------------------
// End-game report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictGrade {
    pub district: DistrictId,
    pub final_trust: f64,
    pub trust_target: f64,
    pub met_target: bool,
}

/// Ending-screen summary, available once the game is terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    pub outcome: EndReason,
    pub rounds_played: usize,
    pub district_grades: Vec<DistrictGrade>,
    pub average_trust: f64,
    pub racial_bias_index: f64,
    pub economic_bias_index: f64,
    /// Citywide reported-crime change versus round zero, in percent.
    pub crime_change_pct: f64,
    pub grade: &'static str,
}

pub fn final_report(state: &GameState) -> Option<FinalReport> {
    let outcome = state.end_reason?;

    let district_grades: Vec<DistrictGrade> = state
        .metrics
        .iter()
        .map(|(id, m)| {
            let target = District::of(id).trust_target;
            DistrictGrade {
                district: id,
                final_trust: m.community_trust,
                trust_target: target,
                met_target: m.community_trust >= target,
            }
        })
        .collect();

    let initial_crimes: u32 = DistrictId::ALL
        .iter()
        .map(|&id| District::of(id).initial_metrics().crimes_reported)
        .sum();
    let final_crimes = state.total_crimes();
    let crime_change_pct =
        (final_crimes as f64 - initial_crimes as f64) / initial_crimes as f64 * 100.0;

    let grade = if outcome == EndReason::Bankrupt {
        "F"
    } else {
        let mut points = district_grades.iter().filter(|g| g.met_target).count();
        if state.racial_bias_index <= BIAS_WARNING_THRESHOLD
            && state.economic_bias_index <= BIAS_WARNING_THRESHOLD
        {
            points += 1;
        }
        if final_crimes <= initial_crimes {
            points += 1;
        }
        match points {
            6 => "A",
            5 => "B",
            4 => "C",
            2 | 3 => "D",
            _ => "F",
        }
    };

    Some(FinalReport {
        outcome,
        rounds_played: state.game_log.len(),
        district_grades,
        average_trust: state.average_trust(),
        racial_bias_index: state.racial_bias_index,
        economic_bias_index: state.economic_bias_index,
        crime_change_pct,
        grade,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;
    use crate::ledger;
    use crate::types::Shift;

    #[test]
    fn cctv_in_the_lowest_trust_district_round_one() {
        let state = create_initial_state();
        let actions = state
            .pending_actions
            .with_selection(&state.implemented_actions, DistrictId::Southside, ActionId::Cctv)
            .unwrap();

        let outcome =
            resolve_round(&state, &state.police_allocation, &actions).expect("round resolves");
        let south_before = state.metrics.get(DistrictId::Southside);
        let south_after = outcome.next_state.metrics.get(DistrictId::Southside);

        assert!(
            south_after.crimes_reported < south_before.crimes_reported,
            "CCTV should cut reported crime ({} -> {})",
            south_before.crimes_reported,
            south_after.crimes_reported
        );
        assert!(south_after.false_arrest_rate <= south_before.false_arrest_rate);
        assert!(outcome
            .next_state
            .implemented_actions
            .contains(DistrictId::Southside, ActionId::Cctv));
        assert_eq!(outcome.entry.round, 1);
        assert_eq!(outcome.next_state.game_log.len(), 1);
        // The original state is untouched.
        assert!(state.game_log.is_empty());
        assert!(state.implemented_actions.implemented(DistrictId::Southside).is_empty());
    }

    #[test]
    fn resolving_twice_is_deterministic() {
        let state = create_initial_state();
        let actions = state
            .pending_actions
            .with_selection(&state.implemented_actions, DistrictId::Eastvale, ActionId::ReportingApp)
            .unwrap();
        let a = resolve_round(&state, &state.police_allocation, &actions).unwrap();
        let b = resolve_round(&state, &state.police_allocation, &actions).unwrap();
        assert_eq!(a, b);
        let a_json = serde_json::to_string(&a.next_state).unwrap();
        let b_json = serde_json::to_string(&b.next_state).unwrap();
        assert_eq!(a_json, b_json);
    }

    #[test]
    fn budget_identity_holds_in_the_log() {
        let state = create_initial_state();
        let outcome =
            resolve_round(&state, &state.police_allocation, &state.pending_actions).unwrap();
        let b = &outcome.entry.budget;
        assert_eq!(b.current, b.previous + b.income - b.expenses);
        ledger::verify_log(state.budget.current, &outcome.next_state.game_log)
            .expect("single-round log balances");
    }

    #[test]
    fn summarizing_state_cannot_resolve_again() {
        let state = create_initial_state();
        let outcome =
            resolve_round(&state, &state.police_allocation, &state.pending_actions).unwrap();
        assert_eq!(outcome.next_state.phase, GamePhase::Summarizing);
        let again = resolve_round(
            &outcome.next_state,
            &outcome.next_state.police_allocation,
            &outcome.next_state.pending_actions,
        );
        assert_eq!(again.unwrap_err(), ResolveError::WrongPhase);
    }

    #[test]
    fn advance_round_moves_back_to_allocating() {
        let state = create_initial_state();
        let outcome =
            resolve_round(&state, &state.police_allocation, &state.pending_actions).unwrap();
        let next = advance_round(&outcome.next_state).unwrap();
        assert_eq!(next.current_round, 2);
        assert_eq!(next.phase, GamePhase::Allocating);
        assert!(next.pending_actions.is_empty());

        // Allocating states cannot advance without resolving first.
        assert_eq!(advance_round(&next).unwrap_err(), ResolveError::WrongPhase);
    }

    #[test]
    fn heavy_spending_bankrupts_and_ends_the_game() {
        let mut state = create_initial_state();
        state.budget.current = Money::from_dollars(100_000);

        let actions = state
            .pending_actions
            .with_selection(&state.implemented_actions, DistrictId::Southside, ActionId::Cctv)
            .unwrap()
            .with_selection(
                &state.implemented_actions,
                DistrictId::Eastvale,
                ActionId::DroneSurveillance,
            )
            .unwrap();

        let outcome = resolve_round(&state, &state.police_allocation, &actions).unwrap();
        assert!(outcome.entry.budget.current.is_negative());
        assert_eq!(outcome.next_state.end_reason, Some(EndReason::Bankrupt));
        assert_eq!(outcome.next_state.phase, GamePhase::Bankrupt);
        assert!(outcome.entry.feedback.starts_with("The treasury is empty"));

        // No further rounds resolve after bankruptcy.
        let after = resolve_round(
            &outcome.next_state,
            &outcome.next_state.police_allocation,
            &outcome.next_state.pending_actions,
        );
        assert_eq!(after.unwrap_err(), ResolveError::GameOver);
        assert_eq!(advance_round(&outcome.next_state).unwrap_err(), ResolveError::GameOver);
    }

    #[test]
    fn ten_solvent_rounds_complete_the_game() {
        let mut state = create_initial_state();
        for round in 1..=FINAL_ROUND {
            assert_eq!(state.current_round, round);
            let outcome =
                resolve_round(&state, &state.police_allocation, &state.pending_actions).unwrap();
            state = outcome.next_state;
            if round < FINAL_ROUND {
                state = advance_round(&state).unwrap();
            }
        }
        assert_eq!(state.phase, GamePhase::Completed);
        assert_eq!(state.end_reason, Some(EndReason::Completed));
        assert_eq!(state.game_log.len(), FINAL_ROUND as usize);
        assert!(!state.budget.current.is_negative());

        let report =
            ledger::verify_log(Money::from_decimal(INITIAL_TREASURY), &state.game_log).unwrap();
        assert_eq!(report.rounds_checked, 10);

        for entry in &state.game_log {
            let alloc = &entry.police_allocation;
            assert_eq!(alloc.total_allocated() + alloc.unallocated, 20);
            for (_, m) in entry.metrics.iter() {
                assert!((0.0..=100.0).contains(&m.community_trust));
                assert!((0.0..=100.0).contains(&m.false_arrest_rate));
                assert!(m.arrests <= m.crimes_reported);
            }
        }
    }

    #[test]
    fn final_report_grades_a_completed_game() {
        let mut state = create_initial_state();
        assert!(final_report(&state).is_none(), "no report mid-game");
        for round in 1..=FINAL_ROUND {
            let outcome =
                resolve_round(&state, &state.police_allocation, &state.pending_actions).unwrap();
            state = outcome.next_state;
            if round < FINAL_ROUND {
                state = advance_round(&state).unwrap();
            }
        }
        let report = final_report(&state).expect("terminal game has a report");
        assert_eq!(report.outcome, EndReason::Completed);
        assert_eq!(report.rounds_played, 10);
        assert_eq!(report.district_grades.len(), 4);
        assert!(["A", "B", "C", "D", "F"].contains(&report.grade));
    }

    #[test]
    fn moving_reserve_officers_changes_the_committed_allocation() {
        let state = create_initial_state();
        let thinner = state
            .police_allocation
            .with_shift_count(DistrictId::Downtown, Shift::Day, 2)
            .unwrap();
        let outcome = resolve_round(&state, &thinner, &state.pending_actions).unwrap();
        assert_eq!(
            outcome.next_state.police_allocation.districts.get(DistrictId::Downtown).day,
            2
        );
        assert_eq!(outcome.next_state.police_allocation.unallocated, 1);
        // 19 deployed officers on the payroll.
        assert_eq!(
            outcome.entry.budget.expenses,
            Money::from_dollars(19 * 6_000)
        );
    }
}
