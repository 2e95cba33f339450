//! Supply allocation prompts.
//!
//! Each investigator spends points from a shared per-player budget on a
//! catalog of supplies. The ledger records the final counts only; staying
//! within budget is surfaced to the player through [`SuppliesView`] and is
//! never enforced on commit.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_SUPPLY_COST, MAX_PLAYER_COUNT, MIN_PLAYER_COUNT};
use crate::prompt::Resolved;
use crate::state::{FieldKind, LedgerError, PromptId, ScenarioState};

/// Supply id to purchased count for one investigator.
pub type SupplyCounts = BTreeMap<String, u32>;

/// Investigator code to that investigator's supply counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplyAllocation {
    counts: BTreeMap<String, SupplyCounts>,
}

impl SupplyAllocation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one of `supply` for `investigator`, returning the new count.
    pub fn increment(&mut self, investigator: &str, supply: &str) -> u32 {
        let count = self.count_mut(investigator, supply);
        *count = count.saturating_add(1);
        *count
    }

    /// Remove one of `supply` for `investigator`. Counts stop at zero.
    pub fn decrement(&mut self, investigator: &str, supply: &str) -> u32 {
        let count = self.count_mut(investigator, supply);
        *count = count.saturating_sub(1);
        *count
    }

    pub fn set_count(&mut self, investigator: &str, supply: &str, count: u32) {
        *self.count_mut(investigator, supply) = count;
    }

    #[must_use]
    pub fn count(&self, investigator: &str, supply: &str) -> u32 {
        self.counts
            .get(investigator)
            .and_then(|counts| counts.get(supply))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn investigator(&self, investigator: &str) -> Option<&SupplyCounts> {
        self.counts.get(investigator)
    }

    pub fn investigators(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Points spent by `investigator` at the catalog's prices.
    #[must_use]
    pub fn spent(&self, investigator: &str, input: &SuppliesInput) -> u32 {
        self.investigator(investigator).map_or(0, |counts| {
            counts
                .iter()
                .map(|(supply, count)| count.saturating_mul(input.cost_of(supply)))
                .fold(0, u32::saturating_add)
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn count_mut(&mut self, investigator: &str, supply: &str) -> &mut u32 {
        self.counts
            .entry(investigator.to_string())
            .or_default()
            .entry(supply.to_string())
            .or_default()
    }
}

/// A purchasable supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_cost")]
    pub cost: u32,
}

const fn default_cost() -> u32 {
    DEFAULT_SUPPLY_COST
}

/// Catalog and point budget for a supplies prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliesInput {
    pub supplies: Vec<Supply>,
    /// Points per investigator, indexed by player count minus one.
    pub points: Vec<u32>,
}

impl SuppliesInput {
    /// Load a supplies definition from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn supply(&self, id: &str) -> Option<&Supply> {
        self.supplies.iter().find(|supply| supply.id == id)
    }

    /// Price of `id`; supplies missing from the catalog cost one point.
    #[must_use]
    pub fn cost_of(&self, id: &str) -> u32 {
        self.supply(id).map_or(DEFAULT_SUPPLY_COST, |supply| supply.cost)
    }

    /// Budget per investigator. Player count is clamped to `1..=4`.
    #[must_use]
    pub fn points_for(&self, player_count: usize) -> u32 {
        let players = player_count.clamp(MIN_PLAYER_COUNT, MAX_PLAYER_COUNT);
        self.points.get(players - 1).copied().unwrap_or(0)
    }
}

/// Minimal investigator identity needed to lay out a supplies prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigator {
    pub code: String,
    pub name: String,
}

impl Investigator {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Live counts held by a supplies prompt until the player saves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppliesDraft {
    counts: SupplyAllocation,
}

impl SuppliesDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn counts(&self) -> &SupplyAllocation {
        &self.counts
    }
}

/// A supplies prompt definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliesPrompt {
    pub id: PromptId,
    #[serde(default)]
    pub text: Option<String>,
    pub input: SuppliesInput,
}

impl SuppliesPrompt {
    pub fn new(id: impl Into<PromptId>, input: SuppliesInput) -> Self {
        Self {
            id: id.into(),
            text: None,
            input,
        }
    }

    #[must_use]
    pub fn is_pending(&self, state: &ScenarioState) -> bool {
        !state.has_supplies(&self.id)
    }

    /// Add a supply to the draft. Returns `None` once the prompt is committed.
    pub fn increment(
        &self,
        draft: &mut SuppliesDraft,
        state: &ScenarioState,
        investigator: &str,
        supply: &str,
    ) -> Option<u32> {
        self.is_pending(state)
            .then(|| draft.counts.increment(investigator, supply))
    }

    /// Remove a supply from the draft. Returns `None` once the prompt is committed.
    pub fn decrement(
        &self,
        draft: &mut SuppliesDraft,
        state: &ScenarioState,
        investigator: &str,
        supply: &str,
    ) -> Option<u32> {
        self.is_pending(state)
            .then(|| draft.counts.decrement(investigator, supply))
    }

    /// Commit the draft's counts, leaving the draft empty.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyCommitted`] if supplies were already
    /// recorded for this prompt and the duplicate policy rejects. A repeat
    /// commit leaves the draft untouched under either policy.
    pub fn commit(
        &self,
        draft: &mut SuppliesDraft,
        state: &mut ScenarioState,
    ) -> Result<(), LedgerError> {
        if !self.is_pending(state) {
            return state.refuse_duplicate(&self.id, FieldKind::Supplies);
        }
        let counts = std::mem::take(&mut draft.counts);
        state.set_supplies(&self.id, counts)
    }

    /// Lay out the prompt for `investigators`, preferring committed counts.
    #[must_use]
    pub fn view(
        &self,
        draft: &SuppliesDraft,
        state: &ScenarioState,
        investigators: &[Investigator],
    ) -> SuppliesView {
        let resolved = Resolved::resolve(state.supplies(&self.id), &draft.counts);
        let allocation = resolved.value();
        let editable = resolved.is_editable();
        let total = self.input.points_for(investigators.len());

        let rows = investigators
            .iter()
            .map(|investigator| {
                let spent = allocation.spent(&investigator.code, &self.input);
                let supplies = self
                    .input
                    .supplies
                    .iter()
                    .map(|supply| SupplyRow {
                        supply_id: supply.id.clone(),
                        name: supply.name.clone(),
                        cost: supply.cost,
                        count: allocation.count(&investigator.code, &supply.id),
                    })
                    .filter(|row| editable || row.count > 0)
                    .collect();
                InvestigatorSupplies {
                    code: investigator.code.clone(),
                    name: investigator.name.clone(),
                    spent,
                    total,
                    remaining: total.saturating_sub(spent),
                    supplies,
                }
            })
            .collect();

        SuppliesView {
            editable,
            investigators: rows,
        }
    }
}

/// Render-ready state of a supplies prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuppliesView {
    pub editable: bool,
    pub investigators: Vec<InvestigatorSupplies>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestigatorSupplies {
    pub code: String,
    pub name: String,
    pub spent: u32,
    pub total: u32,
    pub remaining: u32,
    pub supplies: Vec<SupplyRow>,
}

impl InvestigatorSupplies {
    #[must_use]
    pub const fn over_budget(&self) -> bool {
        self.spent > self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplyRow {
    pub supply_id: String,
    pub name: String,
    pub cost: u32,
    pub count: u32,
}
