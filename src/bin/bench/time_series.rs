// Per-Round JSONL Time Series Recorder
// Outputs one JSON line per resolved round for independent analysis

use precinct_engine::district::DistrictId;
use precinct_engine::types::RoundLogEntry;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct RoundSnapshot {
    pub round: u32,
    pub budget_previous: f64,
    pub budget_income: f64,
    pub budget_expenses: f64,
    pub budget_current: f64,
    pub population: u64,
    pub total_crimes: u32,
    pub total_arrests: u32,
    pub avg_trust: f64,
    pub avg_false_arrest: f64,
    pub racial_bias_index: f64,
    pub economic_bias_index: f64,
    pub actions_taken: usize,
    pub special_events: usize,
}

impl RoundSnapshot {
    pub fn from_entry(entry: &RoundLogEntry) -> Self {
        let n = DistrictId::ALL.len() as f64;
        let avg_trust =
            entry.metrics.iter().map(|(_, m)| m.community_trust).sum::<f64>() / n;
        let avg_false_arrest =
            entry.metrics.iter().map(|(_, m)| m.false_arrest_rate).sum::<f64>() / n;
        Self {
            round: entry.round,
            budget_previous: entry.budget.previous.to_f64(),
            budget_income: entry.budget.income.to_f64(),
            budget_expenses: entry.budget.expenses.to_f64(),
            budget_current: entry.budget.current.to_f64(),
            population: entry.population,
            total_crimes: entry.metrics.iter().map(|(_, m)| m.crimes_reported).sum(),
            total_arrests: entry.metrics.iter().map(|(_, m)| m.arrests).sum(),
            avg_trust,
            avg_false_arrest,
            racial_bias_index: entry.racial_bias_index,
            economic_bias_index: entry.economic_bias_index,
            actions_taken: entry.actions_taken.len(),
            special_events: entry.special_events.len(),
        }
    }
}

/// Accumulates snapshots for one run and writes them as JSONL.
pub struct TimeSeriesRecorder {
    snapshots: Vec<RoundSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, entry: &RoundLogEntry) {
        self.snapshots.push(RoundSnapshot::from_entry(entry));
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}
