#![cfg(target_arch = "wasm32")]

use precinct_engine::PrecinctSimulation;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn session_survives_a_full_round() {
    let mut sim = PrecinctSimulation::new(7);
    let allocation = sim.set_allocation("downtown", "day", 2);
    assert!(!allocation.is_null());

    let pending = sim.select_action("southside", "cctv");
    assert!(!pending.is_null());

    let entry = sim.resolve_round();
    assert!(!entry.is_null());

    let state = sim.state();
    assert!(!state.is_null());
}

#[wasm_bindgen_test]
fn invalid_ids_return_error_payloads() {
    let mut sim = PrecinctSimulation::new(1);
    let result = sim.set_allocation("midtown", "day", 2);
    assert!(!result.is_null(), "errors come back as {{ error }} payloads");
}
