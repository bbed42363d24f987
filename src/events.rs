// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct") - Event Triggers

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bias::BiasReport;
use crate::district::{District, DistrictId, DistrictMap};
use crate::economy;
use crate::types::{Budget, Metrics, Money, SpecialEventRecord};

/// Hard cap on events per round.
pub const MAX_EVENTS_PER_ROUND: usize = 3;

/// City crime total relative to round zero that reads as a crime wave.
pub const CRIME_WAVE_FACTOR: f64 = 1.25;

/// Below this trust a district takes to the streets.
pub const PROTEST_TRUST_THRESHOLD: f64 = 20.0;

/// District false-arrest rate at which a wrongful-arrest video goes viral.
pub const VIRAL_FAR_THRESHOLD: f64 = 30.0;

/// City-average false-arrest rate that draws a federal investigation.
pub const PROBE_FAR_THRESHOLD: f64 = 22.0;

/// City-average trust required for the community grant.
pub const GRANT_TRUST_THRESHOLD: f64 = 58.0;

// ---------------------------------------------------------------------------
// Trigger context
// ---------------------------------------------------------------------------

/// Read-only view of the freshly computed round state the conditions run on.
pub struct EventContext<'a> {
    pub metrics: &'a DistrictMap<Metrics>,
    pub budget: &'a Budget,
    pub bias: &'a BiasReport,
}

impl EventContext<'_> {
    fn average_trust(&self) -> f64 {
        let sum: f64 = self.metrics.iter().map(|(_, m)| m.community_trust).sum();
        sum / DistrictId::ALL.len() as f64
    }

    fn average_false_arrest(&self) -> f64 {
        let sum: f64 = self.metrics.iter().map(|(_, m)| m.false_arrest_rate).sum();
        sum / DistrictId::ALL.len() as f64
    }

    fn total_crimes(&self) -> u32 {
        self.metrics.iter().map(|(_, m)| m.crimes_reported).sum()
    }

    fn lowest_trust_district(&self) -> DistrictId {
        self.metrics
            .iter()
            .min_by(|a, b| a.1.community_trust.partial_cmp(&b.1.community_trust).unwrap())
            .map(|(id, _)| id)
            .unwrap_or(DistrictId::Downtown)
    }

    fn highest_crime_district(&self) -> DistrictId {
        self.metrics
            .iter()
            .max_by_key(|(_, m)| m.crimes_reported)
            .map(|(id, _)| id)
            .unwrap_or(DistrictId::Downtown)
    }

    fn highest_false_arrest_district(&self) -> DistrictId {
        self.metrics
            .iter()
            .max_by(|a, b| a.1.false_arrest_rate.partial_cmp(&b.1.false_arrest_rate).unwrap())
            .map(|(id, _)| id)
            .unwrap_or(DistrictId::Downtown)
    }
}

// ---------------------------------------------------------------------------
// Event table
// ---------------------------------------------------------------------------

/// Whether an event's condition holds, and where its deltas land.
pub enum Trigger {
    No,
    CityWide,
    District(DistrictId),
}

struct EventDef {
    title: &'static str,
    /// `{district}` is substituted with the target district's name.
    message: &'static str,
    /// 1.0 fires deterministically whenever the condition holds.
    probability: f64,
    condition: fn(&EventContext) -> Trigger,
    budget_effect: Option<i64>,
    trust_effect: f64,
    crime_effect: i64,
    population_effect: i64,
}

fn crime_wave_trigger(ctx: &EventContext) -> Trigger {
    let baseline: u32 = DistrictId::ALL
        .iter()
        .map(|&id| District::of(id).initial_metrics().crimes_reported)
        .sum();
    if ctx.total_crimes() as f64 >= baseline as f64 * CRIME_WAVE_FACTOR {
        Trigger::District(ctx.highest_crime_district())
    } else {
        Trigger::No
    }
}

fn protest_trigger(ctx: &EventContext) -> Trigger {
    let id = ctx.lowest_trust_district();
    if ctx.metrics.get(id).community_trust < PROTEST_TRUST_THRESHOLD {
        Trigger::District(id)
    } else {
        Trigger::No
    }
}

fn viral_video_trigger(ctx: &EventContext) -> Trigger {
    let id = ctx.highest_false_arrest_district();
    if ctx.metrics.get(id).false_arrest_rate >= VIRAL_FAR_THRESHOLD {
        Trigger::District(id)
    } else {
        Trigger::No
    }
}

fn civil_rights_trigger(ctx: &EventContext) -> Trigger {
    if ctx.average_false_arrest() >= PROBE_FAR_THRESHOLD
        || ctx.bias.racial_bias_index > crate::bias::BIAS_WARNING_THRESHOLD
    {
        Trigger::District(ctx.highest_false_arrest_district())
    } else {
        Trigger::No
    }
}

fn grant_trigger(ctx: &EventContext) -> Trigger {
    if ctx.average_trust() >= GRANT_TRUST_THRESHOLD && !ctx.bias.exceeds_warning() {
        Trigger::CityWide
    } else {
        Trigger::No
    }
}

fn low_funds_trigger(ctx: &EventContext) -> Trigger {
    if economy::is_low_funds(ctx.budget) {
        Trigger::CityWide
    } else {
        Trigger::No
    }
}

/// Evaluated in order; the first `MAX_EVENTS_PER_ROUND` that fire win.
const EVENTS: &[EventDef] = &[
    EventDef {
        title: "Crime wave",
        message: "Reported crime has surged citywide; {district} is hit hardest and \
                  residents are moving out.",
        probability: 1.0,
        condition: crime_wave_trigger,
        budget_effect: None,
        trust_effect: -2.0,
        crime_effect: 8,
        population_effect: -1500,
    },
    EventDef {
        title: "Community protest",
        message: "Thousands march through {district} demanding policing reform; \
                  organizers say the city has stopped listening.",
        probability: 0.7,
        condition: protest_trigger,
        budget_effect: None,
        trust_effect: -5.0,
        crime_effect: 4,
        population_effect: 0,
    },
    EventDef {
        title: "Viral false-arrest video",
        message: "Footage of a wrongful arrest in {district} spreads overnight; the \
                  city settles quietly.",
        probability: 0.65,
        condition: viral_video_trigger,
        budget_effect: Some(-20_000),
        trust_effect: -7.0,
        crime_effect: 0,
        population_effect: 0,
    },
    EventDef {
        title: "Civil rights investigation",
        message: "Federal investigators open a pattern-or-practice probe into arrests \
                  in {district}; legal costs mount.",
        probability: 0.6,
        condition: civil_rights_trigger,
        budget_effect: Some(-50_000),
        trust_effect: -3.0,
        crime_effect: 0,
        population_effect: 0,
    },
    EventDef {
        title: "Federal community grant",
        message: "The city's community-policing record qualifies it for a federal \
                  grant.",
        probability: 0.5,
        condition: grant_trigger,
        budget_effect: Some(75_000),
        trust_effect: 0.0,
        crime_effect: 0,
        population_effect: 0,
    },
    EventDef {
        title: "Treasury warning",
        message: "The comptroller warns the council that reserves have fallen below \
                  the safety line.",
        probability: 1.0,
        condition: low_funds_trigger,
        budget_effect: None,
        trust_effect: 0.0,
        crime_effect: 0,
        population_effect: 0,
    },
];

// ---------------------------------------------------------------------------
// Firing
// ---------------------------------------------------------------------------

/// PRNG for one round's event draws. Seeded from the game seed and round
/// number only, so a round resolves identically however many times it is
/// replayed.
pub fn round_rng(event_seed: u64, round: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(event_seed ^ (round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Evaluate the table against the freshly computed round state and apply the
/// deltas of every event that fires (at most `MAX_EVENTS_PER_ROUND`) exactly
/// once. Metric clamps are re-enforced after each application.
pub fn fire_events(
    metrics: &mut DistrictMap<Metrics>,
    budget: &mut Budget,
    bias: &BiasReport,
    rng: &mut ChaCha8Rng,
) -> Vec<SpecialEventRecord> {
    let mut fired = Vec::new();

    for def in EVENTS {
        if fired.len() >= MAX_EVENTS_PER_ROUND {
            break;
        }
        let trigger = {
            let ctx = EventContext { metrics, budget, bias };
            (def.condition)(&ctx)
        };
        let target = match trigger {
            Trigger::No => continue,
            Trigger::CityWide => None,
            Trigger::District(id) => Some(id),
        };
        // Every eligible event consumes a draw so later outcomes do not
        // depend on which earlier conditions held.
        let roll: f64 = rng.gen();
        if roll >= def.probability {
            continue;
        }

        if let Some(id) = target {
            let m = metrics.get_mut(id);
            m.community_trust = (m.community_trust + def.trust_effect).clamp(0.0, 100.0);
            m.crimes_reported =
                (m.crimes_reported as i64 + def.crime_effect).max(0) as u32;
            m.arrests = m.arrests.min(m.crimes_reported);
            m.population = (m.population as i64 + def.population_effect).max(0) as u64;
        }
        if let Some(amount) = def.budget_effect {
            economy::apply_event_adjustment(budget, def.title, Money::from_dollars(amount));
        }

        let district_name = target.map(|id| id.name()).unwrap_or("the city");
        fired.push(SpecialEventRecord {
            title: def.title.to_string(),
            message: def.message.replace("{district}", district_name),
            district: target,
        });
    }

    fired
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
