// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Type Definitions

use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::action::{ActionId, DistrictActions, ImplementedActions};
use crate::allocation::PoliceAllocation;
use crate::district::{DistrictId, DistrictMap};

// ─── Money ───────────────────────────────────────────────────────────────────

/// City treasury denomination backed by `rust_decimal::Decimal`.
///
/// All budget arithmetic is exact; f64 only appears at the reporting edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    /// Zero value
    pub fn zero() -> Self {
        Self(Decimal::zero())
    }

    /// Create from a `Decimal` value
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }

    /// Create from a whole-dollar amount
    pub fn from_dollars(d: i64) -> Self {
        Self(Decimal::from(d))
    }

    /// Whether the value is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the value is below zero (the bankruptcy signal)
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Lossy conversion for reporting and charts
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${}", self.0.abs())
        } else {
            write!(f, "${}", self.0)
        }
    }
}

// ─── Shift ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Day,
    Night,
}

// ─── Percentage breakdowns ───────────────────────────────────────────────────

/// Percentage table by ethnicity. Used both for static district demographics
/// and for the per-round arrest composition; always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceBreakdown {
    pub white: f64,
    pub black: f64,
    pub hispanic: f64,
    pub other: f64,
}

impl RaceBreakdown {
    pub fn sum(&self) -> f64 {
        self.white + self.black + self.hispanic + self.other
    }

    /// Rescale so components sum to exactly 100.
    pub fn normalize(&mut self) {
        let total = self.sum();
        if total > 0.0 {
            let k = 100.0 / total;
            self.white *= k;
            self.black *= k;
            self.hispanic *= k;
            self.other *= k;
        }
    }

    /// Move each component `t` of the way toward `target` (t in [0,1]).
    pub fn drift_toward(&mut self, target: &RaceBreakdown, t: f64) {
        self.white += (target.white - self.white) * t;
        self.black += (target.black - self.black) * t;
        self.hispanic += (target.hispanic - self.hispanic) * t;
        self.other += (target.other - self.other) * t;
        self.normalize();
    }

    /// Share of residents who are not white, as a 0-1 fraction.
    pub fn minority_share(&self) -> f64 {
        (100.0 - self.white) / 100.0
    }
}

/// Percentage table by income bracket; always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub high: f64,
    pub middle: f64,
    pub low: f64,
}

impl IncomeBreakdown {
    pub fn sum(&self) -> f64 {
        self.high + self.middle + self.low
    }

    pub fn normalize(&mut self) {
        let total = self.sum();
        if total > 0.0 {
            let k = 100.0 / total;
            self.high *= k;
            self.middle *= k;
            self.low *= k;
        }
    }

    pub fn drift_toward(&mut self, target: &IncomeBreakdown, t: f64) {
        self.high += (target.high - self.high) * t;
        self.middle += (target.middle - self.middle) * t;
        self.low += (target.low - self.low) * t;
        self.normalize();
    }

    /// Share of residents in the low bracket, as a 0-1 fraction.
    pub fn low_income_share(&self) -> f64 {
        self.low / 100.0
    }
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// Per-district snapshot recomputed once per round. Owned exclusively by the
/// engine; the presentation layer only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Community trust in the police, 0-100.
    pub community_trust: f64,
    pub crimes_reported: u32,
    pub arrests: u32,
    /// Percent of arrests involving innocents, 0-100.
    pub false_arrest_rate: f64,
    pub population: u64,
    pub arrests_by_race: RaceBreakdown,
    pub arrests_by_income: IncomeBreakdown,
    /// Static labels; never recomputed.
    pub common_crimes: [&'static str; 3],
}

/// Signed per-district delta of each metric versus the prior round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricChanges {
    pub community_trust: f64,
    pub crimes_reported: i64,
    pub arrests: i64,
    pub false_arrest_rate: f64,
    pub population: i64,
}

impl MetricChanges {
    pub fn between(prev: &Metrics, next: &Metrics) -> Self {
        Self {
            community_trust: next.community_trust - prev.community_trust,
            crimes_reported: next.crimes_reported as i64 - prev.crimes_reported as i64,
            arrests: next.arrests as i64 - prev.arrests as i64,
            false_arrest_rate: next.false_arrest_rate - prev.false_arrest_rate,
            population: next.population as i64 - prev.population as i64,
        }
    }
}

// ─── Budget ──────────────────────────────────────────────────────────────────

/// One round's treasury ledger. `current = previous + income - expenses`
/// holds exactly; special-event deltas fold into income/expenses so the
/// identity survives the corrective event pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub previous: Money,
    pub income: Money,
    pub expenses: Money,
    pub current: Money,
    /// Human-readable line items for the round log and UI.
    pub details: Vec<String>,
}

impl Budget {
    pub fn opening(balance: Money) -> Self {
        Self {
            previous: balance,
            income: Money::zero(),
            expenses: Money::zero(),
            current: balance,
            details: Vec::new(),
        }
    }
}

// ─── Round log ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub district: DistrictId,
    pub action: ActionId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialEventRecord {
    pub title: String,
    pub message: String,
    pub district: Option<DistrictId>,
}

/// Immutable record appended once per round. Once in the log, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundLogEntry {
    pub round: u32,
    pub police_allocation: PoliceAllocation,
    pub metrics: DistrictMap<Metrics>,
    /// City-wide population after this round.
    pub population: u64,
    pub budget: Budget,
    pub metric_changes: DistrictMap<MetricChanges>,
    /// Actions newly implemented this round (0 to 2 entries).
    pub actions_taken: Vec<ActionRecord>,
    pub racial_bias_index: f64,
    pub economic_bias_index: f64,
    pub changes: Vec<String>,
    pub special_events: Vec<SpecialEventRecord>,
    pub feedback: String,
}

// ─── Game state machine ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Player is editing allocation and pending actions.
    Allocating,
    /// A round just resolved; summary is on screen.
    Summarizing,
    /// Terminal: round 10 resolved solvent.
    Completed,
    /// Terminal: treasury went negative.
    Bankrupt,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Bankrupt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Completed,
    Bankrupt,
}

/// Whole-game state. Replaced wholesale by the round resolver each round so
/// history entries and concurrent readers never observe a torn value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    /// Round currently being planned or summarized, 1..=10.
    pub current_round: u32,
    pub phase: GamePhase,
    pub police_allocation: PoliceAllocation,
    pub pending_actions: DistrictActions,
    pub implemented_actions: ImplementedActions,
    pub metrics: DistrictMap<Metrics>,
    pub budget: Budget,
    pub racial_bias_index: f64,
    pub economic_bias_index: f64,
    pub game_log: Vec<RoundLogEntry>,
    pub end_reason: Option<EndReason>,
    /// Seed for the event trigger PRNG; fixed for the game's lifetime.
    pub event_seed: u64,
}

impl GameState {
    /// City-wide population across all districts.
    pub fn total_population(&self) -> u64 {
        self.metrics.iter().map(|(_, m)| m.population).sum()
    }

    /// City-wide reported crime across all districts.
    pub fn total_crimes(&self) -> u32 {
        self.metrics.iter().map(|(_, m)| m.crimes_reported).sum()
    }

    /// Mean community trust across districts.
    pub fn average_trust(&self) -> f64 {
        let sum: f64 = self.metrics.iter().map(|(_, m)| m.community_trust).sum();
        sum / DistrictId::ALL.len() as f64
    }

    /// Mean false-arrest rate across districts.
    pub fn average_false_arrest_rate(&self) -> f64 {
        let sum: f64 = self.metrics.iter().map(|(_, m)| m.false_arrest_rate).sum();
        sum / DistrictId::ALL.len() as f64
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
