// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Civic Policy Simulation Suite ("The Precinct")

pub mod action;
pub mod allocation;
pub mod bias;
pub mod district;
pub mod dynamics;
pub mod economy;
pub mod events;
pub mod feedback;
pub mod ledger;
pub mod resolver;
pub mod types;

pub use resolver::{
    advance_round, create_initial_state, final_report, new_game, resolve_round, restart,
    ResolveError, RoundOutcome, FINAL_ROUND,
};
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::action::{ActionId, DistrictActions};
use crate::allocation::PoliceAllocation;
use crate::district::DistrictId;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

fn error_value(message: &str) -> JsValue {
    serde_wasm_bindgen::to_value(&ErrorPayload { error: message }).unwrap_or(JsValue::NULL)
}

fn parse_district(s: &str) -> Option<DistrictId> {
    match s {
        "downtown" => Some(DistrictId::Downtown),
        "northgate" => Some(DistrictId::Northgate),
        "eastvale" => Some(DistrictId::Eastvale),
        "southside" => Some(DistrictId::Southside),
        _ => None,
    }
}

fn parse_shift(s: &str) -> Option<Shift> {
    match s {
        "day" => Some(Shift::Day),
        "night" => Some(Shift::Night),
        _ => None,
    }
}

fn parse_action(s: &str) -> Option<ActionId> {
    match s {
        "cctv" => Some(ActionId::Cctv),
        "facial_recognition" => Some(ActionId::FacialRecognition),
        "drone_surveillance" => Some(ActionId::DroneSurveillance),
        "community_education" => Some(ActionId::CommunityEducation),
        "reporting_app" => Some(ActionId::ReportingApp),
        _ => None,
    }
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing game session. Holds the latest immutable `GameState` plus
/// the player's uncommitted allocation and action edits; the engine only runs
/// when a round is committed via [`PrecinctSimulation::resolve_round`].
#[wasm_bindgen]
pub struct PrecinctSimulation {
    state: GameState,
    pending_allocation: PoliceAllocation,
    pending_actions: DistrictActions,
    event_seed: u64,
}

#[wasm_bindgen]
impl PrecinctSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(event_seed: u32) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let state = resolver::new_game(event_seed as u64);
        let pending_allocation = state.police_allocation;
        let pending_actions = state.pending_actions;
        Self {
            state,
            pending_allocation,
            pending_actions,
            event_seed: event_seed as u64,
        }
    }

    /// Edit one shift count in the uncommitted allocation. Returns the
    /// updated allocation, or `{ error }` with the prior allocation retained.
    pub fn set_allocation(&mut self, district: &str, shift: &str, count: u32) -> JsValue {
        let (Some(district), Some(shift)) = (parse_district(district), parse_shift(shift)) else {
            return error_value("unknown district or shift");
        };
        match self.pending_allocation.with_shift_count(district, shift, count) {
            Ok(next) => {
                self.pending_allocation = next;
                serde_wasm_bindgen::to_value(&next).unwrap_or(JsValue::NULL)
            }
            Err(e) => error_value(&e.to_string()),
        }
    }

    /// Select a pending action for a district. Returns the updated pending
    /// set, or `{ error }` with the prior selection retained.
    pub fn select_action(&mut self, district: &str, action: &str) -> JsValue {
        let (Some(district), Some(action)) = (parse_district(district), parse_action(action))
        else {
            return error_value("unknown district or action");
        };
        match self
            .pending_actions
            .with_selection(&self.state.implemented_actions, district, action)
        {
            Ok(next) => {
                self.pending_actions = next;
                serde_wasm_bindgen::to_value(&next).unwrap_or(JsValue::NULL)
            }
            Err(e) => error_value(&e.to_string()),
        }
    }

    /// Withdraw a district's pending action, refunding its action point.
    pub fn clear_action(&mut self, district: &str) -> JsValue {
        let Some(district) = parse_district(district) else {
            return error_value("unknown district");
        };
        self.pending_actions = self.pending_actions.without(district);
        serde_wasm_bindgen::to_value(&self.pending_actions).unwrap_or(JsValue::NULL)
    }

    /// Commit the round. On success the session swaps in the new state and
    /// returns the round log entry; the pending action set resets.
    pub fn resolve_round(&mut self) -> JsValue {
        match resolver::resolve_round(&self.state, &self.pending_allocation, &self.pending_actions)
        {
            Ok(outcome) => {
                self.state = outcome.next_state;
                self.pending_actions = DistrictActions::default();
                #[cfg(target_arch = "wasm32")]
                if self.state.phase.is_terminal() {
                    log(&format!("precinct: game over after round {}", self.state.current_round));
                }
                serde_wasm_bindgen::to_value(&outcome.entry).unwrap_or(JsValue::NULL)
            }
            Err(e) => error_value(&e.to_string()),
        }
    }

    /// Move from the round summary to the next round's allocation phase.
    pub fn advance_round(&mut self) -> JsValue {
        match resolver::advance_round(&self.state) {
            Ok(next) => {
                self.state = next;
                self.pending_allocation = self.state.police_allocation;
                self.pending_actions = self.state.pending_actions;
                serde_wasm_bindgen::to_value(&self.state).unwrap_or(JsValue::NULL)
            }
            Err(e) => error_value(&e.to_string()),
        }
    }

    /// Reinitialize to round 1 with the default allocation and an empty log.
    pub fn restart(&mut self) -> JsValue {
        self.state = resolver::new_game(self.event_seed);
        self.pending_allocation = self.state.police_allocation;
        self.pending_actions = self.state.pending_actions;
        serde_wasm_bindgen::to_value(&self.state).unwrap_or(JsValue::NULL)
    }

    /// Latest committed game state snapshot.
    pub fn state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.state).unwrap_or(JsValue::NULL)
    }

    /// Uncommitted allocation the player is editing.
    pub fn pending_allocation(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.pending_allocation).unwrap_or(JsValue::NULL)
    }

    /// Full round history for charts and accordions.
    pub fn game_log(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.state.game_log).unwrap_or(JsValue::NULL)
    }

    /// Ending-screen report; NULL until the game is terminal.
    pub fn final_report(&self) -> JsValue {
        match resolver::final_report(&self.state) {
            Some(report) => serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
}
