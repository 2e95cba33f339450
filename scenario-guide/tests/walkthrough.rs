use scenario_guide::{
    CheckListDraft, CheckListPrompt, CommitGate, Investigator, LedgerError, ListItem,
    ScenarioState, StringChoices, SuppliesDraft, SuppliesInput, SuppliesPrompt, Supply,
};

fn check_prompt() -> CheckListPrompt {
    CheckListPrompt::new(
        "p1",
        "choice",
        vec![
            ListItem::new("A", "Alpha"),
            ListItem::new("B", "Beta"),
            ListItem::new("C", "Gamma"),
        ],
    )
    .with_bounds(Some(1), Some(2))
}

fn ammo_prompt() -> SuppliesPrompt {
    SuppliesPrompt::new(
        "supplies",
        SuppliesInput {
            supplies: vec![Supply {
                id: "ammo".to_string(),
                name: "Ammo".to_string(),
                description: None,
                cost: 2,
            }],
            points: vec![5],
        },
    )
}

#[test]
fn checklist_commit_freezes_selection() {
    let prompt = check_prompt();
    let mut state = ScenarioState::new();
    let mut draft = CheckListDraft::new(&prompt);

    prompt.toggle(&mut draft, &state, "A");
    assert_eq!(prompt.view(&draft, &state).gate, Some(CommitGate::Ready));

    prompt.toggle(&mut draft, &state, "B");
    prompt.toggle(&mut draft, &state, "C");
    assert_eq!(prompt.view(&draft, &state).gate, Some(CommitGate::TooMany));
    assert!(matches!(
        prompt.commit(&draft, &mut state),
        Err(LedgerError::SelectionOutOfBounds {
            gate: CommitGate::TooMany,
            selected: 3,
            ..
        })
    ));

    prompt.toggle(&mut draft, &state, "C");
    prompt.commit(&draft, &mut state).unwrap();
    let expected = StringChoices::uniform(["A", "B"], "choice");
    assert_eq!(state.string_choices("p1"), Some(&expected));

    // Local edits after commit are refused and never leak into the view.
    assert_eq!(prompt.toggle(&mut draft, &state, "C"), None);
    draft.toggle("C");
    draft.toggle("A");
    let view = prompt.view(&draft, &state);
    let selected: Vec<_> = view
        .rows
        .iter()
        .filter(|row| row.selected)
        .map(|row| row.code.as_str())
        .collect();
    assert_eq!(selected, vec!["A", "B"]);
    assert!(view.rows.iter().all(|row| !row.editable));
    assert_eq!(state.string_choices("p1"), Some(&expected));

    assert!(matches!(
        prompt.commit(&draft, &mut state),
        Err(LedgerError::AlreadyCommitted { .. })
    ));
}

#[test]
fn checklist_min_clamps_to_short_lists() {
    let prompt = CheckListPrompt::new("short", "choice", vec![ListItem::new("A", "Alpha")])
        .with_bounds(Some(3), None)
        .with_default_state(true);
    let mut state = ScenarioState::new();
    let draft = CheckListDraft::new(&prompt);
    assert_eq!(prompt.gate(&draft), CommitGate::Ready);
    prompt.commit(&draft, &mut state).unwrap();

    let fixed = prompt.clone().with_fixed_min(true);
    assert_eq!(fixed.gate(&draft), CommitGate::NotEnough);
}

#[test]
fn supplies_ledger_does_not_enforce_budget() {
    let prompt = ammo_prompt();
    let investigators = [Investigator::new("inv1", "Roland")];
    let mut state = ScenarioState::new();
    let mut draft = SuppliesDraft::new();

    for _ in 0..3 {
        prompt.increment(&mut draft, &state, "inv1", "ammo");
    }
    let view = prompt.view(&draft, &state, &investigators);
    let inv = &view.investigators[0];
    assert_eq!(inv.supplies[0].count, 3);
    assert_eq!(inv.spent, 6);
    assert_eq!(inv.total, 5);
    assert_eq!(inv.remaining, 0);
    assert!(inv.over_budget());

    let mut over_budget_state = state.clone();
    let mut over_budget_draft = draft.clone();
    prompt
        .commit(&mut over_budget_draft, &mut over_budget_state)
        .unwrap();
    let recorded = over_budget_state.supplies("supplies").expect("recorded");
    assert_eq!(recorded.count("inv1", "ammo"), 3);

    assert_eq!(
        prompt.decrement(&mut draft, &state, "inv1", "ammo"),
        Some(2)
    );
    let view = prompt.view(&draft, &state, &investigators);
    assert_eq!(view.investigators[0].spent, 4);
    assert!(!view.investigators[0].over_budget());
    assert_eq!(view.investigators[0].remaining, 1);

    prompt.commit(&mut draft, &mut state).unwrap();
    assert_eq!(state.supplies("supplies").unwrap().spent("inv1", &prompt.input), 4);
    assert_eq!(prompt.increment(&mut draft, &state, "inv1", "ammo"), None);
}

#[test]
fn supplies_budget_follows_player_count() {
    let mut prompt = ammo_prompt();
    prompt.input.points = vec![10, 8, 6, 4];
    let state = ScenarioState::new();
    let draft = SuppliesDraft::new();
    let party: Vec<_> = (1..=5)
        .map(|n| Investigator::new(format!("inv{n}"), format!("Investigator {n}")))
        .collect();

    assert_eq!(prompt.view(&draft, &state, &party[..1]).investigators[0].total, 10);
    assert_eq!(prompt.view(&draft, &state, &party[..3]).investigators[0].total, 6);
    let five = prompt.view(&draft, &state, &party);
    assert_eq!(five.investigators.len(), 5);
    assert!(five.investigators.iter().all(|inv| inv.total == 4));
}
