//! Walk-through scenarios exercised against the decision ledger.
//!
//! Each scenario drives prompts with a seeded RNG standing in for a player
//! and checks the ledger contract after every step.
use anyhow::{Context, Result, bail, ensure};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use scenario_guide::{
    CheckListDraft, CheckListPrompt, CommitGate, DuplicateCommit, FieldKind, Investigator,
    LedgerConfig, LedgerError, LedgerStorage, ListItem, ScenarioGuide, ScenarioState,
    StringChoices, SuppliesDraft, SuppliesInput, SuppliesPrompt, Supply, SupplyAllocation,
};

/// Per-iteration inputs handed to a scenario.
pub struct WalkthroughCtx {
    pub rng: ChaCha20Rng,
    pub config: LedgerConfig,
    pub verbose: bool,
}

impl WalkthroughCtx {
    fn ledger(&self) -> ScenarioState {
        ScenarioState::new().with_config(self.config)
    }
}

pub type ScenarioFn = fn(&mut WalkthroughCtx) -> Result<()>;

#[derive(Clone)]
pub struct WalkthroughScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

impl std::fmt::Debug for WalkthroughScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkthroughScenario")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[must_use]
pub fn catalog() -> Vec<WalkthroughScenario> {
    vec![
        WalkthroughScenario {
            key: "checklist-bounds",
            name: "Check-list Selection Bounds",
            description: "Random toggles against random {min,max} bounds",
            run: checklist_bounds,
        },
        WalkthroughScenario {
            key: "commit-freezes",
            name: "Committed Decisions Stay Frozen",
            description: "Late edits and repeat commits never change history",
            run: commit_freezes,
        },
        WalkthroughScenario {
            key: "empty-decisions",
            name: "Empty Decisions Are Recorded",
            description: "Committing nothing differs from not committing",
            run: empty_decisions,
        },
        WalkthroughScenario {
            key: "supply-clamp",
            name: "Supply Counts Clamp At Zero",
            description: "Random increment/decrement runs never go negative",
            run: supply_clamp,
        },
        WalkthroughScenario {
            key: "supply-budget",
            name: "Supply Budget Accounting",
            description: "Spend, remaining and over-budget commits per party size",
            run: supply_budget,
        },
        WalkthroughScenario {
            key: "save-resume",
            name: "Ledger Save And Resume",
            description: "Saved ledgers resume verbatim through the guide",
            run: save_resume,
        },
    ]
}

#[must_use]
pub fn find_scenario(key: &str) -> Option<WalkthroughScenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn random_items(rng: &mut ChaCha20Rng, max_items: usize) -> Vec<ListItem> {
    let count = rng.gen_range(0..=max_items);
    (0..count)
        .map(|idx| ListItem::new(format!("item{idx}"), format!("Item {idx}")))
        .collect()
}

fn random_bound(rng: &mut ChaCha20Rng, upper: usize) -> Option<usize> {
    rng.gen_bool(0.7).then(|| rng.gen_range(0..=upper))
}

fn checklist_bounds(ctx: &mut WalkthroughCtx) -> Result<()> {
    let items = random_items(&mut ctx.rng, 6);
    let upper = items.len() + 2;
    let min = random_bound(&mut ctx.rng, upper);
    let max = random_bound(&mut ctx.rng, upper);
    let prompt = CheckListPrompt::new("check", "picked", items)
        .with_bounds(min, max)
        .with_fixed_min(ctx.rng.gen_bool(0.3))
        .with_default_state(ctx.rng.gen_bool(0.3));
    let mut state = ctx.ledger();
    let mut draft = CheckListDraft::new(&prompt);

    let mut model: BTreeSet<String> = if prompt.default_state {
        prompt.items.iter().map(|item| item.code.clone()).collect()
    } else {
        BTreeSet::new()
    };

    for _ in 0..ctx.rng.gen_range(0..12) {
        let Some(item) = prompt.items.choose(&mut ctx.rng) else {
            break;
        };
        let now = prompt
            .toggle(&mut draft, &state, &item.code)
            .context("toggle refused while pending")?;
        if now {
            model.insert(item.code.clone());
        } else {
            model.remove(&item.code);
        }
    }

    let bounds = prompt.bounds();
    let selected = model.len();
    let expected = if bounds.min.is_some_and(|m| selected < m) {
        CommitGate::NotEnough
    } else if bounds.max.is_some_and(|m| selected > m) {
        CommitGate::TooMany
    } else {
        CommitGate::Ready
    };
    ensure!(
        prompt.gate(&draft) == expected,
        "gate {:?} != expected {:?} (selected {selected}, bounds {bounds:?})",
        prompt.gate(&draft),
        expected
    );
    if ctx.verbose {
        log::info!("check-list selected {selected} with bounds {bounds:?} -> {expected}");
    }

    match prompt.commit(&draft, &mut state) {
        Ok(()) => {
            ensure!(expected.is_ready(), "commit accepted with gate {expected}");
            let record = state
                .string_choices(&prompt.id)
                .context("commit left no record")?;
            let codes: BTreeSet<String> = record.codes().map(str::to_string).collect();
            ensure!(codes == model, "recorded {codes:?} != selected {model:?}");
            ensure!(
                record.iter().all(|(_, ids)| ids == ["picked".to_string()]),
                "every recorded item carries the prompt's choice id"
            );
        }
        Err(LedgerError::SelectionOutOfBounds { gate, .. }) => {
            ensure!(gate == expected && !gate.is_ready(), "refused with {gate}");
            ensure!(prompt.is_pending(&state), "refused commit left a record");
        }
        Err(other) => bail!("unexpected commit error: {other}"),
    }
    Ok(())
}

fn random_record(rng: &mut ChaCha20Rng) -> StringChoices {
    let count = rng.gen_range(0..4);
    (0..count)
        .map(|idx| (format!("code{idx}"), format!("opt{}", rng.gen_range(0..3))))
        .collect()
}

fn random_allocation(rng: &mut ChaCha20Rng) -> SupplyAllocation {
    let mut allocation = SupplyAllocation::new();
    for inv in 0..rng.gen_range(0..3) {
        for supply in ["ammo", "rope", "food"] {
            if rng.gen_bool(0.5) {
                allocation.set_count(&format!("inv{inv}"), supply, rng.gen_range(0..4));
            }
        }
    }
    allocation
}

fn commit_random(
    rng: &mut ChaCha20Rng,
    state: &mut ScenarioState,
    id: &str,
    kind: FieldKind,
) -> Result<(), LedgerError> {
    match kind {
        FieldKind::StringChoices => state.set_string_choices(id, random_record(rng)),
        FieldKind::Supplies => state.set_supplies(id, random_allocation(rng)),
        FieldKind::Count => state.set_count(id, rng.gen_range(-3..10)),
        FieldKind::Decision => state.set_decision(id, rng.gen_bool(0.5)),
    }
}

fn commit_freezes(ctx: &mut WalkthroughCtx) -> Result<()> {
    let mut state = ctx.ledger();
    let ids: Vec<String> = (0..6).map(|idx| format!("prompt{idx}")).collect();

    for id in &ids {
        let kind = *FieldKind::ALL
            .choose(&mut ctx.rng)
            .context("field kinds are never empty")?;
        commit_random(&mut ctx.rng, &mut state, id, kind)?;
    }
    let history = state.clone();

    for _ in 0..20 {
        let id = ids.choose(&mut ctx.rng).context("ids are never empty")?;
        let kind = *FieldKind::ALL
            .choose(&mut ctx.rng)
            .context("field kinds are never empty")?;
        let was_committed = state.is_committed(id, kind);
        let result = commit_random(&mut ctx.rng, &mut state, id, kind);
        match (was_committed, ctx.config.duplicate_commit, result) {
            (true, DuplicateCommit::Reject, Err(LedgerError::AlreadyCommitted { .. }))
            | (true, DuplicateCommit::Ignore, Ok(()))
            | (false, _, Ok(())) => {}
            (_, _, other) => bail!("unexpected result committing {kind} to {id}: {other:?}"),
        }
    }

    for id in history.prompt_ids() {
        let before = history.entry(id).context("history entry")?;
        let after = state.entry(id).context("entry vanished")?;
        for kind in before.kinds() {
            ensure!(after.has(kind), "{kind} for {id} vanished");
        }
        ensure!(
            history.string_choices(id) == state.string_choices(id)
                || history.string_choices(id).is_none(),
            "string choices for {id} changed after commit"
        );
        ensure!(
            history.supplies(id) == state.supplies(id) || history.supplies(id).is_none(),
            "supplies for {id} changed after commit"
        );
        ensure!(
            history.count(id) == state.count(id) || history.count(id).is_none(),
            "count for {id} changed after commit"
        );
        ensure!(
            history.decision(id) == state.decision(id) || history.decision(id).is_none(),
            "decision for {id} changed after commit"
        );
    }
    Ok(())
}

fn empty_decisions(ctx: &mut WalkthroughCtx) -> Result<()> {
    let mut state = ctx.ledger();
    let prompt = CheckListPrompt::new("nothing", "picked", random_items(&mut ctx.rng, 4));
    let draft = CheckListDraft::new(&prompt);

    ensure!(prompt.view(&draft, &state).gate.is_some(), "pending prompt offers commit");
    prompt.commit(&draft, &mut state)?;

    let record = state
        .string_choices("nothing")
        .context("empty commit must be recorded")?;
    ensure!(record.is_empty(), "nothing was selected");
    let view = prompt.view(&draft, &state);
    ensure!(view.show_none, "empty decision shows 'none'");
    ensure!(view.gate.is_none(), "recorded prompt stops offering commit");
    ensure!(
        state.string_choices("untouched").is_none(),
        "unrelated prompt stays pending"
    );

    let supplies = SuppliesPrompt::new("no-supplies", SuppliesInput::default());
    let mut supplies_draft = SuppliesDraft::new();
    supplies.commit(&mut supplies_draft, &mut state)?;
    ensure!(state.has_supplies("no-supplies"), "empty allocation recorded");
    ensure!(
        state.supplies("no-supplies").is_some_and(SupplyAllocation::is_empty),
        "recorded allocation is empty"
    );
    Ok(())
}

fn supply_clamp(ctx: &mut WalkthroughCtx) -> Result<()> {
    let mut allocation = SupplyAllocation::new();
    let mut model: HashMap<(String, String), i64> = HashMap::new();
    let investigators = ["inv1", "inv2"];
    let supplies = ["ammo", "rope"];

    for step in 0..40 {
        let inv = *investigators.choose(&mut ctx.rng).context("investigators")?;
        let supply = *supplies.choose(&mut ctx.rng).context("supplies")?;
        let slot = model
            .entry((inv.to_string(), supply.to_string()))
            .or_insert(0);
        let got = if ctx.rng.gen_bool(0.45) {
            *slot += 1;
            allocation.increment(inv, supply)
        } else {
            *slot = (*slot - 1).max(0);
            allocation.decrement(inv, supply)
        };
        ensure!(
            i64::from(got) == *slot,
            "step {step}: {inv}/{supply} is {got}, expected {slot}"
        );
    }
    Ok(())
}

fn supply_budget(ctx: &mut WalkthroughCtx) -> Result<()> {
    let catalog: Vec<Supply> = ["ammo", "rope", "food", "map"]
        .iter()
        .map(|id| Supply {
            id: (*id).to_string(),
            name: id.to_uppercase(),
            description: None,
            cost: ctx.rng.gen_range(1..4),
        })
        .collect();
    let points: Vec<u32> = (0..4).map(|_| ctx.rng.gen_range(2..12)).collect();
    let prompt = SuppliesPrompt::new(
        "supplies",
        SuppliesInput {
            supplies: catalog,
            points: points.clone(),
        },
    );
    let party_size = ctx.rng.gen_range(1..=5);
    let party: Vec<Investigator> = (0..party_size)
        .map(|idx| Investigator::new(format!("inv{idx}"), format!("Investigator {idx}")))
        .collect();

    let mut state = ctx.ledger();
    let mut draft = SuppliesDraft::new();
    for _ in 0..ctx.rng.gen_range(0..15) {
        let inv = party.choose(&mut ctx.rng).context("party")?;
        let supply = prompt.input.supplies.choose(&mut ctx.rng).context("catalog")?;
        prompt
            .increment(&mut draft, &state, &inv.code, &supply.id)
            .context("increment refused while pending")?;
    }

    let expected_total = points[party_size.min(4) - 1];
    let live = prompt.view(&draft, &state, &party);
    for row in &live.investigators {
        let spent: u32 = row
            .supplies
            .iter()
            .map(|supply| supply.count * supply.cost)
            .sum();
        ensure!(row.total == expected_total, "budget {} != {expected_total}", row.total);
        ensure!(row.spent == spent, "spent {} != {spent}", row.spent);
        ensure!(
            row.remaining == expected_total.saturating_sub(spent),
            "remaining {} for spent {spent}",
            row.remaining
        );
    }
    let over_budget = live.investigators.iter().any(|row| row.over_budget());
    if ctx.verbose {
        log::info!("party of {party_size}, budget {expected_total}, over budget: {over_budget}");
    }

    let snapshot = draft.counts().clone();
    prompt.commit(&mut draft, &mut state)?;
    ensure!(
        state.supplies("supplies") == Some(&snapshot),
        "ledger records the draft as-is, budget or not"
    );
    let done = prompt.view(&draft, &state, &party);
    ensure!(!done.editable, "committed supplies are read-only");
    ensure!(
        done.investigators
            .iter()
            .all(|row| row.supplies.iter().all(|supply| supply.count > 0)),
        "committed view hides unpurchased supplies"
    );
    Ok(())
}

#[derive(Clone, Default)]
struct MemoryStorage {
    saves: Rc<RefCell<BTreeMap<String, String>>>,
}

impl LedgerStorage for MemoryStorage {
    type Error = LedgerError;

    fn save_ledger(&self, slot: &str, state: &ScenarioState) -> Result<(), Self::Error> {
        self.saves
            .borrow_mut()
            .insert(slot.to_string(), state.to_json()?);
        Ok(())
    }

    fn load_ledger(&self, slot: &str) -> Result<Option<ScenarioState>, Self::Error> {
        self.saves
            .borrow()
            .get(slot)
            .map(|json| ScenarioState::from_json(json))
            .transpose()
    }

    fn delete_ledger(&self, slot: &str) -> Result<(), Self::Error> {
        self.saves.borrow_mut().remove(slot);
        Ok(())
    }
}

fn save_resume(ctx: &mut WalkthroughCtx) -> Result<()> {
    let guide = ScenarioGuide::new(MemoryStorage::default(), ctx.config);
    let mut state = guide.start_scenario();
    for idx in 0..ctx.rng.gen_range(0..8) {
        let kind = *FieldKind::ALL.choose(&mut ctx.rng).context("kinds")?;
        commit_random(&mut ctx.rng, &mut state, &format!("prompt{idx}"), kind)?;
    }

    guide.save("autosave", &state)?;
    let resumed = guide
        .resume("autosave")?
        .context("saved ledger should resume")?;
    ensure!(resumed == state, "resumed ledger differs from saved ledger");

    guide.abandon("autosave")?;
    ensure!(guide.resume("autosave")?.is_none(), "abandoned ledger is gone");
    Ok(())
}
