use scenario_guide::{
    DuplicateCommit, FieldKind, LedgerConfig, LedgerError, ScenarioState, StringChoices,
    SupplyAllocation,
};

const PROMPT_IDS: [&str; 5] = ["intro", "p1", "supplies", "", "résumé"];

#[test]
fn never_written_ids_are_absent_for_every_kind() {
    let mut state = ScenarioState::new();
    state.set_count("other", 1).unwrap();
    for id in PROMPT_IDS {
        assert!(state.string_choices(id).is_none(), "{id}");
        assert!(state.supplies(id).is_none(), "{id}");
        assert!(!state.has_supplies(id), "{id}");
        for kind in FieldKind::ALL {
            assert!(!state.is_committed(id, kind), "{id} {kind}");
        }
    }
}

#[test]
fn committed_record_reads_back_identically_forever() {
    let mut state = ScenarioState::new();
    let record: StringChoices = [("A", "won"), ("B", "won"), ("B", "lost")]
        .into_iter()
        .collect();
    state.set_string_choices("p1", record.clone()).unwrap();
    for _ in 0..10 {
        assert_eq!(state.string_choices("p1"), Some(&record));
    }
    state.set_count("p1", 4).unwrap();
    assert_eq!(state.string_choices("p1"), Some(&record));
}

#[test]
fn empty_commit_differs_from_pending() {
    let mut state = ScenarioState::new();
    state.set_string_choices("empty", StringChoices::new()).unwrap();
    state.set_supplies("nothing", SupplyAllocation::new()).unwrap();

    assert_eq!(state.string_choices("empty"), Some(&StringChoices::new()));
    assert!(state.string_choices("pending").is_none());
    assert!(state.has_supplies("nothing"));
    assert!(!state.has_supplies("pending"));
}

#[test]
fn supply_decrement_converges_to_zero() {
    let mut allocation = SupplyAllocation::new();
    for _ in 0..4 {
        allocation.increment("inv1", "ammo");
    }
    let mut seen = Vec::new();
    for _ in 0..8 {
        seen.push(allocation.decrement("inv1", "ammo"));
    }
    assert_eq!(seen, vec![3, 2, 1, 0, 0, 0, 0, 0]);
    assert_eq!(allocation.count("inv1", "ammo"), 0);
}

#[test]
fn duplicate_commits_never_overwrite() {
    for policy in [DuplicateCommit::Reject, DuplicateCommit::Ignore] {
        let mut state = ScenarioState::new().with_config(LedgerConfig {
            duplicate_commit: policy,
        });
        let mut first = SupplyAllocation::new();
        first.set_count("inv1", "ammo", 1);
        state.set_supplies("s", first.clone()).unwrap();

        let mut second = SupplyAllocation::new();
        second.set_count("inv1", "ammo", 9);
        let result = state.set_supplies("s", second);
        match policy {
            DuplicateCommit::Reject => assert!(matches!(
                result,
                Err(LedgerError::AlreadyCommitted {
                    kind: FieldKind::Supplies,
                    ..
                })
            )),
            DuplicateCommit::Ignore => assert!(result.is_ok()),
        }
        assert_eq!(state.supplies("s"), Some(&first));
    }
}

#[test]
fn ledger_json_restores_verbatim() {
    let mut state = ScenarioState::new();
    state
        .set_string_choices("p1", StringChoices::uniform(["A", "B"], "checked"))
        .unwrap();
    let mut allocation = SupplyAllocation::new();
    allocation.set_count("inv1", "ammo", 2);
    allocation.set_count("inv2", "rope", 0);
    state.set_supplies("supplies", allocation).unwrap();
    state.set_string_choices("skipped", StringChoices::new()).unwrap();

    let json = state.to_json().unwrap();
    let restored = ScenarioState::from_json(&json).unwrap();
    assert_eq!(restored, state);
    assert_eq!(restored.string_choices("skipped"), Some(&StringChoices::new()));
    assert_eq!(
        restored.prompt_ids().collect::<Vec<_>>(),
        vec!["p1", "skipped", "supplies"]
    );

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["entries"]["p1"]["string_choices"]["A"][0], "checked");
    assert_eq!(value["entries"]["supplies"]["supplies"]["inv1"]["ammo"], 2);
    assert!(value["entries"]["p1"].get("supplies").is_none());
}

#[test]
fn malformed_ledger_json_is_an_error() {
    let err = ScenarioState::from_json(r#"{"entries": {"p1": {"count": "three"}}}"#).unwrap_err();
    assert!(matches!(err, LedgerError::Serialization(_)));
    assert!(ScenarioState::from_json("{}").unwrap().is_empty());
}
