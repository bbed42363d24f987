// Monte Carlo Infrastructure — N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N-1, computing mean ± 95% CI

use precinct_engine::district::DistrictId;
use precinct_engine::economy::INITIAL_TREASURY;
use precinct_engine::ledger;
use precinct_engine::resolver::{advance_round, final_report, new_game, resolve_round, FINAL_ROUND};
use precinct_engine::types::{EndReason, GamePhase, GameState, Money};

use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Count metric values outside their contractual ranges. Always zero unless
/// the engine regresses.
fn bounds_violations(state: &GameState) -> u32 {
    let mut violations = 0;
    for (_, m) in state.metrics.iter() {
        if !(0.0..=100.0).contains(&m.community_trust) {
            violations += 1;
        }
        if !(0.0..=100.0).contains(&m.false_arrest_rate) {
            violations += 1;
        }
        if m.arrests > m.crimes_reported {
            violations += 1;
        }
        if (m.arrests_by_race.sum() - 100.0).abs() > 1e-6 {
            violations += 1;
        }
        if (m.arrests_by_income.sum() - 100.0).abs() > 1e-6 {
            violations += 1;
        }
    }
    violations
}

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> BenchResult {
    let start = Instant::now();
    let mut state = new_game(seed);
    let mut recorder = time_series_dir.map(|_| TimeSeriesRecorder::new());
    let mut violations = 0;
    let mut events_fired = 0;

    for _ in 1..=FINAL_ROUND {
        let allocation = match scenario.allocate {
            Some(f) => f(&state),
            None => state.police_allocation,
        };
        let actions = (scenario.plan)(&state);
        let outcome = match resolve_round(&state, &allocation, &actions) {
            Ok(outcome) => outcome,
            Err(_) => break,
        };
        events_fired += outcome.entry.special_events.len() as u32;
        if let Some(rec) = recorder.as_mut() {
            rec.record(&outcome.entry);
        }
        state = outcome.next_state;
        violations += bounds_violations(&state);
        if state.phase.is_terminal() {
            break;
        }
        state = match advance_round(&state) {
            Ok(next) => next,
            Err(_) => break,
        };
    }

    let ledger_balanced =
        ledger::verify_log(Money::from_decimal(INITIAL_TREASURY), &state.game_log).is_ok();

    let completed = state.end_reason == Some(EndReason::Completed);
    let bankrupt = state.end_reason == Some(EndReason::Bankrupt);
    let report = final_report(&state);

    let n = DistrictId::ALL.len() as f64;
    let final_avg_trust = state.average_trust();
    let final_avg_false_arrest =
        state.metrics.iter().map(|(_, m)| m.false_arrest_rate).sum::<f64>() / n;

    let initial_crimes: u32 = new_game(seed).total_crimes();
    let crime_change_pct = (state.total_crimes() as f64 - initial_crimes as f64)
        / initial_crimes as f64
        * 100.0;

    let c = &scenario.criteria;
    let mut pass = true;
    if let Some(expect) = c.expect_completion {
        pass &= completed == expect;
        if !expect {
            pass &= bankrupt;
        }
    }
    if let Some(min_trust) = c.min_final_avg_trust {
        pass &= final_avg_trust >= min_trust;
    }
    if let Some(max_bias) = c.max_final_racial_bias {
        pass &= state.racial_bias_index <= max_bias;
    }
    if c.require_ledger_balance {
        pass &= ledger_balanced;
    }
    pass &= violations <= c.max_bounds_violations;
    pass &= state.phase == GamePhase::Completed || state.phase == GamePhase::Bankrupt;

    if let (Some(rec), Some(dir)) = (recorder.as_ref(), time_series_dir) {
        let path = dir.join(format!("{}-seed{}.jsonl", scenario.name.to_lowercase(), seed));
        if let Err(e) = rec.write_jsonl(&path) {
            eprintln!("time series write failed for {}: {e}", scenario.name);
        }
    }

    BenchResult {
        scenario: scenario.name.to_string(),
        name: scenario.label.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        completed,
        bankrupt,
        rounds_played: state.game_log.len(),
        final_balance: state.budget.current.to_f64(),
        total_income: state
            .game_log
            .iter()
            .fold(Money::zero(), |acc, e| acc + e.budget.income)
            .to_f64(),
        total_expenses: state
            .game_log
            .iter()
            .fold(Money::zero(), |acc, e| acc + e.budget.expenses)
            .to_f64(),
        ledger_balanced,
        bounds_violations: violations,
        final_avg_trust,
        final_avg_false_arrest,
        final_racial_bias: state.racial_bias_index,
        final_economic_bias: state.economic_bias_index,
        crime_change_pct,
        events_fired,
        grade: report.map(|r| r.grade.to_string()).unwrap_or_else(|| "-".to_string()),
        elapsed_ms: start.elapsed().as_millis(),
    }
}

/// Run a scenario N times and aggregate the per-run metrics.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> MonteCarloReport {
    let runs: Vec<BenchResult> = (0..n_runs)
        .map(|i| run_single(scenario, base_seed + i as u64, time_series_dir))
        .collect();

    let pass_rate = runs.iter().filter(|r| r.pass).count() as f64 / n_runs.max(1) as f64;
    let completion_rate =
        runs.iter().filter(|r| r.completed).count() as f64 / n_runs.max(1) as f64;
    let bankruptcy_rate =
        runs.iter().filter(|r| r.bankrupt).count() as f64 / n_runs.max(1) as f64;

    let collect = |f: fn(&BenchResult) -> f64| -> Stats {
        let samples: Vec<f64> = runs.iter().map(f).collect();
        Stats::from_samples(&samples)
    };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs,
        pass_rate,
        completion_rate,
        bankruptcy_rate,
        rounds_played: collect(|r| r.rounds_played as f64),
        final_balance: collect(|r| r.final_balance),
        final_avg_trust: collect(|r| r.final_avg_trust),
        final_racial_bias: collect(|r| r.final_racial_bias),
        crime_change_pct: collect(|r| r.crime_change_pct),
        events_fired: collect(|r| r.events_fired as f64),
        elapsed_ms: collect(|r| r.elapsed_ms as f64),
        individual_runs: runs,
    }
}
