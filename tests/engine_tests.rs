#[cfg(test)]
mod tests {
    use precinct_engine::action::{ActionError, ActionId, DistrictActions};
    use precinct_engine::allocation::{AllocationError, PoliceAllocation, TOTAL_FORCE};
    use precinct_engine::district::DistrictId;
    use precinct_engine::economy::INITIAL_TREASURY;
    use precinct_engine::ledger;
    use precinct_engine::resolver::{
        advance_round, create_initial_state, final_report, new_game, resolve_round, FINAL_ROUND,
    };
    use precinct_engine::types::{EndReason, GamePhase, GameState, Money, Shift};

    /// Assert every engine-owned bound on a state that just resolved.
    fn assert_round_invariants(state: &GameState) {
        let alloc = &state.police_allocation;
        assert_eq!(alloc.total_allocated() + alloc.unallocated, TOTAL_FORCE);
        for (_, shifts) in alloc.districts.iter() {
            assert!(shifts.day >= 1 && shifts.night >= 1);
        }
        for (_, m) in state.metrics.iter() {
            assert!((0.0..=100.0).contains(&m.community_trust));
            assert!((0.0..=100.0).contains(&m.false_arrest_rate));
            assert!(m.arrests <= m.crimes_reported);
            assert!((m.arrests_by_race.sum() - 100.0).abs() < 1e-6);
            assert!((m.arrests_by_income.sum() - 100.0).abs() < 1e-6);
        }
        let b = &state.budget;
        assert_eq!(b.current, b.previous + b.income - b.expenses);
    }

    /// Resolve the current round with the given pending actions, then advance
    /// to the next allocation phase if the game continues.
    fn play_round(state: GameState, actions: DistrictActions) -> GameState {
        let outcome =
            resolve_round(&state, &state.police_allocation, &actions).expect("round resolves");
        assert_round_invariants(&outcome.next_state);
        if outcome.next_state.phase == GamePhase::Summarizing {
            advance_round(&outcome.next_state).expect("advance after summary")
        } else {
            outcome.next_state
        }
    }

    // ========== Full-game runs ==========

    #[test]
    fn test_hands_off_game_completes_all_ten_rounds() {
        let mut state = create_initial_state();
        for _ in 1..=FINAL_ROUND {
            state = play_round(state, DistrictActions::default());
        }
        assert_eq!(state.phase, GamePhase::Completed);
        assert_eq!(state.end_reason, Some(EndReason::Completed));
        assert_eq!(state.game_log.len(), 10);

        let audit = ledger::verify_log(Money::from_decimal(INITIAL_TREASURY), &state.game_log)
            .expect("treasury conserves across the whole log");
        assert_eq!(audit.rounds_checked, 10);
        assert!(audit.closing_balance.0 > INITIAL_TREASURY, "default play runs a surplus");

        let report = final_report(&state).expect("completed game grades");
        assert_eq!(report.rounds_played, 10);
    }

    #[test]
    fn test_community_investment_strategy_keeps_every_bound() {
        // Cheap community programs in rotating districts until the game ends,
        // whatever the budget does along the way.
        let mut state = new_game(99);
        let mut planned: Vec<Vec<(DistrictId, ActionId)>> = vec![
            vec![
                (DistrictId::Southside, ActionId::CommunityEducation),
                (DistrictId::Eastvale, ActionId::CommunityEducation),
            ],
            vec![
                (DistrictId::Northgate, ActionId::CommunityEducation),
                (DistrictId::Downtown, ActionId::CommunityEducation),
            ],
            vec![
                (DistrictId::Southside, ActionId::ReportingApp),
                (DistrictId::Eastvale, ActionId::ReportingApp),
            ],
            vec![
                (DistrictId::Northgate, ActionId::ReportingApp),
                (DistrictId::Downtown, ActionId::ReportingApp),
            ],
        ];
        planned.resize(FINAL_ROUND as usize, Vec::new());

        for plan in planned {
            let mut actions = DistrictActions::default();
            for (district, action) in plan {
                actions = actions
                    .with_selection(&state.implemented_actions, district, action)
                    .expect("scripted selection is valid");
            }
            state = play_round(state, actions);
            if state.phase.is_terminal() {
                break;
            }
        }
        assert!(state.end_reason.is_some(), "game reaches a terminal outcome");
        // Community investment must never push trust or composition out of range.
        assert_round_invariants(&state);
    }

    // ========== Action gating ==========

    #[test]
    fn test_facial_recognition_gated_until_cctv_lands() {
        let state = create_initial_state();

        // Round 1: facial recognition without CCTV anywhere is rejected.
        let premature = state.pending_actions.with_selection(
            &state.implemented_actions,
            DistrictId::Southside,
            ActionId::FacialRecognition,
        );
        assert!(matches!(premature, Err(ActionError::PrerequisiteNotMet { .. })));

        // Implement CCTV in Southside and finish the round.
        let actions = state
            .pending_actions
            .with_selection(&state.implemented_actions, DistrictId::Southside, ActionId::Cctv)
            .unwrap();
        let state = play_round(state, actions);

        // Round 2: Southside unlocks facial recognition; Eastvale does not.
        assert!(state
            .pending_actions
            .with_selection(
                &state.implemented_actions,
                DistrictId::Southside,
                ActionId::FacialRecognition
            )
            .is_ok());
        assert!(matches!(
            state.pending_actions.with_selection(
                &state.implemented_actions,
                DistrictId::Eastvale,
                ActionId::FacialRecognition
            ),
            Err(ActionError::PrerequisiteNotMet { .. })
        ));
    }

    #[test]
    fn test_reimplementing_is_rejected_in_later_rounds() {
        let state = create_initial_state();
        let actions = state
            .pending_actions
            .with_selection(&state.implemented_actions, DistrictId::Northgate, ActionId::Cctv)
            .unwrap();
        let state = play_round(state, actions);

        let again = state.pending_actions.with_selection(
            &state.implemented_actions,
            DistrictId::Northgate,
            ActionId::Cctv,
        );
        assert_eq!(again, Err(ActionError::AlreadyImplemented(ActionId::Cctv)));
    }

    // ========== Allocation ==========

    #[test]
    fn test_invalid_allocation_edits_keep_the_prior_value() {
        let state = create_initial_state();
        let alloc = state.police_allocation;

        let rejected = alloc.with_shift_count(DistrictId::Downtown, Shift::Night, 0);
        assert_eq!(rejected, Err(AllocationError::ShiftBelowMinimum));
        assert_eq!(alloc.districts.get(DistrictId::Downtown).night, 2);

        let over = alloc.with_shift_count(DistrictId::Southside, Shift::Day, 9);
        assert!(matches!(over, Err(AllocationError::ExceedsForce { .. })));
        assert_eq!(alloc.total_allocated(), 20);
    }

    #[test]
    fn test_edited_allocation_commits_through_a_round() {
        let state = create_initial_state();
        let edited = state
            .police_allocation
            .with_shift_count(DistrictId::Downtown, Shift::Day, 1)
            .unwrap()
            .with_shift_count(DistrictId::Southside, Shift::Night, 4)
            .unwrap();
        let outcome = resolve_round(&state, &edited, &state.pending_actions).unwrap();
        let committed = &outcome.next_state.police_allocation;
        assert_eq!(committed.districts.get(DistrictId::Southside).night, 4);
        assert_eq!(committed.total_allocated() + committed.unallocated, TOTAL_FORCE);
    }

    // ========== Bankruptcy ==========

    #[test]
    fn test_overspending_bankrupts_on_the_first_insolvent_round() {
        let mut state = create_initial_state();

        // Round 1: CCTV + drone. Expensive, but round 1 stays solvent.
        let r1 = state
            .pending_actions
            .with_selection(&state.implemented_actions, DistrictId::Southside, ActionId::Cctv)
            .unwrap()
            .with_selection(
                &state.implemented_actions,
                DistrictId::Eastvale,
                ActionId::DroneSurveillance,
            )
            .unwrap();
        let outcome = resolve_round(&state, &state.police_allocation, &r1).unwrap();
        let first = &outcome.entry.budget;
        assert!(
            first.expenses <= first.previous + first.income,
            "round 1 should remain solvent"
        );
        assert!(outcome.next_state.end_reason.is_none());
        state = advance_round(&outcome.next_state).unwrap();

        // Round 2: facial recognition + another drone outrun the treasury.
        let r2 = state
            .pending_actions
            .with_selection(
                &state.implemented_actions,
                DistrictId::Southside,
                ActionId::FacialRecognition,
            )
            .unwrap()
            .with_selection(
                &state.implemented_actions,
                DistrictId::Northgate,
                ActionId::DroneSurveillance,
            )
            .unwrap();
        let outcome = resolve_round(&state, &state.police_allocation, &r2).unwrap();
        let second = &outcome.entry.budget;
        assert!(
            second.expenses > second.previous + second.income,
            "round 2 expenses must exceed previous + income"
        );
        assert!(second.current.is_negative());
        assert_eq!(outcome.next_state.end_reason, Some(EndReason::Bankrupt));
        assert_eq!(outcome.next_state.phase, GamePhase::Bankrupt);

        // The terminal state refuses further rounds.
        let refused = resolve_round(
            &outcome.next_state,
            &outcome.next_state.police_allocation,
            &DistrictActions::default(),
        );
        assert!(refused.is_err());

        let report = final_report(&outcome.next_state).unwrap();
        assert_eq!(report.outcome, EndReason::Bankrupt);
        assert_eq!(report.grade, "F");
    }

    // ========== Determinism & history integrity ==========

    #[test]
    fn test_same_seed_same_script_same_game() {
        let play = |seed: u64| {
            let mut state = new_game(seed);
            let actions = state
                .pending_actions
                .with_selection(&state.implemented_actions, DistrictId::Southside, ActionId::Cctv)
                .unwrap();
            state = play_round(state, actions);
            for _ in 0..3 {
                state = play_round(state, DistrictActions::default());
            }
            serde_json::to_string(&state).unwrap()
        };
        assert_eq!(play(1234), play(1234));
    }

    #[test]
    fn test_log_entries_are_immutable_history() {
        let mut state = create_initial_state();
        state = play_round(state, DistrictActions::default());
        let first_entry = serde_json::to_string(&state.game_log[0]).unwrap();

        for _ in 0..4 {
            state = play_round(state, DistrictActions::default());
        }
        assert_eq!(state.game_log.len(), 5);
        assert_eq!(
            serde_json::to_string(&state.game_log[0]).unwrap(),
            first_entry,
            "round 1's entry must not change as the game continues"
        );
        // Rounds are logged in order, once each.
        for (i, entry) in state.game_log.iter().enumerate() {
            assert_eq!(entry.round as usize, i + 1);
        }
    }

    #[test]
    fn test_restart_returns_to_round_one() {
        let mut state = create_initial_state();
        state = play_round(state, DistrictActions::default());
        state = play_round(state, DistrictActions::default());
        assert_eq!(state.current_round, 3);

        let fresh = precinct_engine::resolver::restart();
        assert_eq!(fresh.current_round, 1);
        assert_eq!(fresh.phase, GamePhase::Allocating);
        assert!(fresh.game_log.is_empty());
        assert_eq!(fresh.budget.current, Money::from_decimal(INITIAL_TREASURY));
        assert_eq!(fresh.police_allocation, PoliceAllocation::default());
    }
}
