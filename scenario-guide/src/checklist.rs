//! Check-list prompts: pick a subset of listed items.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::choices::StringChoices;
use crate::prompt::Resolved;
use crate::selection::{CommitGate, SelectionBounds};
use crate::state::{FieldKind, LedgerError, PromptId, ScenarioState};

/// One selectable entry in a check-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub tint_color: Option<String>,
}

impl ListItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            tint_color: None,
        }
    }
}

/// A check-list prompt definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckListPrompt {
    pub id: PromptId,
    /// Option id recorded against every checked item.
    pub choice_id: String,
    /// Items start checked when set.
    #[serde(default)]
    pub default_state: bool,
    /// Keep `min` even when fewer items are listed.
    #[serde(default)]
    pub fixed_min: bool,
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

impl CheckListPrompt {
    pub fn new(
        id: impl Into<PromptId>,
        choice_id: impl Into<String>,
        items: Vec<ListItem>,
    ) -> Self {
        Self {
            id: id.into(),
            choice_id: choice_id.into(),
            default_state: false,
            fixed_min: false,
            min: None,
            max: None,
            items,
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_default_state(mut self, default_state: bool) -> Self {
        self.default_state = default_state;
        self
    }

    #[must_use]
    pub fn with_fixed_min(mut self, fixed_min: bool) -> Self {
        self.fixed_min = fixed_min;
        self
    }

    #[must_use]
    pub fn bounds(&self) -> SelectionBounds {
        SelectionBounds::resolve(self.min, self.max, self.fixed_min, self.items.len())
    }

    #[must_use]
    pub fn is_pending(&self, state: &ScenarioState) -> bool {
        state.string_choices(&self.id).is_none()
    }

    #[must_use]
    pub fn gate(&self, draft: &CheckListDraft) -> CommitGate {
        self.bounds().gate(draft.selected_count())
    }

    /// Flip an item in the draft. Returns `None` once the prompt is committed.
    pub fn toggle(
        &self,
        draft: &mut CheckListDraft,
        state: &ScenarioState,
        code: &str,
    ) -> Option<bool> {
        self.is_pending(state).then(|| draft.toggle(code))
    }

    /// Record the checked items as `{code: [choice_id]}`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SelectionOutOfBounds`] when the draft does not
    /// satisfy the prompt's bounds. Once the prompt is recorded the draft is
    /// not consulted: a repeat commit returns [`LedgerError::AlreadyCommitted`]
    /// or, under [`DuplicateCommit::Ignore`](crate::DuplicateCommit::Ignore),
    /// `Ok(())`.
    pub fn commit(
        &self,
        draft: &CheckListDraft,
        state: &mut ScenarioState,
    ) -> Result<(), LedgerError> {
        if !self.is_pending(state) {
            return state.refuse_duplicate(&self.id, FieldKind::StringChoices);
        }
        let gate = self.gate(draft);
        if !gate.is_ready() {
            return Err(LedgerError::SelectionOutOfBounds {
                prompt: self.id.clone(),
                gate,
                selected: draft.selected_count(),
            });
        }
        state.set_string_choices(&self.id, draft.to_record(&self.choice_id))
    }

    /// Lay out the prompt, preferring the committed record over the draft.
    #[must_use]
    pub fn view(&self, draft: &CheckListDraft, state: &ScenarioState) -> CheckListView {
        let draft_record = draft.to_record(&self.choice_id);
        let resolved = Resolved::resolve(state.string_choices(&self.id), &draft_record);
        let record = resolved.value();
        let editable = resolved.is_editable();

        let rows = self
            .items
            .iter()
            .map(|item| CheckRow {
                code: item.code.clone(),
                name: item.name.clone(),
                tint_color: item.tint_color.clone(),
                selected: record.contains(&item.code),
                editable,
            })
            .collect();

        CheckListView {
            rows,
            show_none: self.items.is_empty() || (resolved.is_committed() && record.is_empty()),
            gate: editable.then(|| self.gate(draft)),
        }
    }
}

/// Live check-list selection held by the prompt until commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckListDraft {
    selected: BTreeMap<String, bool>,
}

impl CheckListDraft {
    #[must_use]
    pub fn new(prompt: &CheckListPrompt) -> Self {
        let selected = prompt
            .items
            .iter()
            .map(|item| (item.code.clone(), prompt.default_state))
            .collect();
        Self { selected }
    }

    /// Flip `code`, returning its new state. Unknown codes become checked.
    pub fn toggle(&mut self, code: &str) -> bool {
        let selected = self.selected.entry(code.to_string()).or_insert(false);
        *selected = !*selected;
        *selected
    }

    #[must_use]
    pub fn is_selected(&self, code: &str) -> bool {
        self.selected.get(code).copied().unwrap_or(false)
    }

    /// Follow a changed item list: new items arrive checked, vanished ones are dropped.
    pub fn sync_items(&mut self, prompt: &CheckListPrompt) {
        self.selected
            .retain(|code, _| prompt.items.iter().any(|item| &item.code == code));
        for item in &prompt.items {
            self.selected.entry(item.code.clone()).or_insert(true);
        }
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.values().filter(|selected| **selected).count()
    }

    #[must_use]
    pub fn to_record(&self, choice_id: &str) -> StringChoices {
        StringChoices::uniform(
            self.selected
                .iter()
                .filter(|(_, selected)| **selected)
                .map(|(code, _)| code.as_str()),
            choice_id,
        )
    }
}

/// Render-ready state of a check-list prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckListView {
    pub rows: Vec<CheckRow>,
    /// Nothing to show: no items, or an empty decision was recorded.
    pub show_none: bool,
    /// Commit affordance while pending; `None` once recorded.
    pub gate: Option<CommitGate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRow {
    pub code: String,
    pub name: String,
    pub tint_color: Option<String>,
    pub selected: bool,
    pub editable: bool,
}
