//! Scenario decision ledger.
//!
//! Every prompt shown during a scenario walk-through records its outcome here.
//! Entries are keyed by prompt id and field kind and are write-once: the
//! presence of an entry is what tells a prompt that its decision has been
//! made and that it must stop offering edits.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::choices::StringChoices;
use crate::selection::CommitGate;
use crate::supplies::SupplyAllocation;

/// Identifier of a single prompt instance within a scenario.
pub type PromptId = String;

/// Payload kinds a prompt can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    StringChoices,
    Supplies,
    Count,
    Decision,
}

impl FieldKind {
    pub const ALL: [Self; 4] = [
        Self::StringChoices,
        Self::Supplies,
        Self::Count,
        Self::Decision,
    ];
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StringChoices => write!(f, "string_choices"),
            Self::Supplies => write!(f, "supplies"),
            Self::Count => write!(f, "count"),
            Self::Decision => write!(f, "decision"),
        }
    }
}

/// What the ledger does when a prompt commits twice for the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateCommit {
    /// Return [`LedgerError::AlreadyCommitted`] and keep the first value.
    #[default]
    Reject,
    /// Log a warning and keep the first value.
    Ignore,
}

/// Ledger behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub duplicate_commit: DuplicateCommit,
}

impl LedgerConfig {
    /// Get default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names an unknown policy.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Errors raised by ledger commits and ledger (de)serialization.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("prompt '{prompt}' already has a committed {kind} entry")]
    AlreadyCommitted { prompt: PromptId, kind: FieldKind },
    #[error("prompt '{prompt}' cannot commit {selected} selection(s): {gate}")]
    SelectionOutOfBounds {
        prompt: PromptId,
        gate: CommitGate,
        selected: usize,
    },
    #[error("ledger serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything recorded for one prompt id. Absent kinds are still pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_choices: Option<StringChoices>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplies: Option<SupplyAllocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decision: Option<bool>,
}

impl PromptEntry {
    fn string_choices_slot(&mut self) -> &mut Option<StringChoices> {
        &mut self.string_choices
    }

    fn supplies_slot(&mut self) -> &mut Option<SupplyAllocation> {
        &mut self.supplies
    }

    fn count_slot(&mut self) -> &mut Option<i32> {
        &mut self.count
    }

    fn decision_slot(&mut self) -> &mut Option<bool> {
        &mut self.decision
    }

    #[must_use]
    pub fn has(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::StringChoices => self.string_choices.is_some(),
            FieldKind::Supplies => self.supplies.is_some(),
            FieldKind::Count => self.count.is_some(),
            FieldKind::Decision => self.decision.is_some(),
        }
    }

    /// Kinds already committed for this prompt.
    pub fn kinds(&self) -> impl Iterator<Item = FieldKind> + '_ {
        FieldKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }
}

/// Append-style ledger of player decisions for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioState {
    #[serde(default)]
    entries: BTreeMap<PromptId, PromptEntry>,
    #[serde(skip)]
    config: LedgerConfig,
}

impl ScenarioState {
    /// Fresh ledger with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, config: LedgerConfig) {
        self.config = config;
    }

    #[must_use]
    pub const fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Committed check-list style record for `id`, if any.
    #[must_use]
    pub fn string_choices(&self, id: &str) -> Option<&StringChoices> {
        self.entries
            .get(id)
            .and_then(|entry| entry.string_choices.as_ref())
    }

    /// Commit `record` for `id`.
    ///
    /// Selection bounds are the caller's concern; the ledger records whatever
    /// it is given.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyCommitted`] if `id` already has string
    /// choices and the duplicate policy is [`DuplicateCommit::Reject`].
    pub fn set_string_choices(
        &mut self,
        id: &str,
        record: StringChoices,
    ) -> Result<(), LedgerError> {
        self.commit(
            id,
            FieldKind::StringChoices,
            record,
            PromptEntry::string_choices_slot,
        )
    }

    #[must_use]
    pub fn has_supplies(&self, id: &str) -> bool {
        self.supplies(id).is_some()
    }

    #[must_use]
    pub fn supplies(&self, id: &str) -> Option<&SupplyAllocation> {
        self.entries.get(id).and_then(|entry| entry.supplies.as_ref())
    }

    /// Commit the final per-investigator supply spend for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyCommitted`] on a rejected second commit.
    pub fn set_supplies(
        &mut self,
        id: &str,
        allocation: SupplyAllocation,
    ) -> Result<(), LedgerError> {
        self.commit(id, FieldKind::Supplies, allocation, PromptEntry::supplies_slot)
    }

    #[must_use]
    pub fn count(&self, id: &str) -> Option<i32> {
        self.entries.get(id).and_then(|entry| entry.count)
    }

    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyCommitted`] on a rejected second commit.
    pub fn set_count(&mut self, id: &str, value: i32) -> Result<(), LedgerError> {
        self.commit(id, FieldKind::Count, value, PromptEntry::count_slot)
    }

    #[must_use]
    pub fn decision(&self, id: &str) -> Option<bool> {
        self.entries.get(id).and_then(|entry| entry.decision)
    }

    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyCommitted`] on a rejected second commit.
    pub fn set_decision(&mut self, id: &str, value: bool) -> Result<(), LedgerError> {
        self.commit(id, FieldKind::Decision, value, PromptEntry::decision_slot)
    }

    #[must_use]
    pub fn is_committed(&self, id: &str, kind: FieldKind) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.has(kind))
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&PromptEntry> {
        self.entries.get(id)
    }

    pub fn prompt_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of prompts with at least one committed field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every recorded decision, e.g. when the scenario is restarted.
    pub fn reset(&mut self) {
        log::debug!("resetting scenario ledger ({} prompts)", self.entries.len());
        self.entries.clear();
    }

    /// Serialize the full entry map.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a ledger verbatim from [`ScenarioState::to_json`] output.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a ledger.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Outcome of a second commit of `kind` for `id` under the configured
    /// policy. The recorded value is never touched.
    pub(crate) fn refuse_duplicate(&self, id: &str, kind: FieldKind) -> Result<(), LedgerError> {
        Self::duplicate_commit(self.config.duplicate_commit, id, kind)
    }

    fn duplicate_commit(
        policy: DuplicateCommit,
        id: &str,
        kind: FieldKind,
    ) -> Result<(), LedgerError> {
        match policy {
            DuplicateCommit::Reject => Err(LedgerError::AlreadyCommitted {
                prompt: id.to_string(),
                kind,
            }),
            DuplicateCommit::Ignore => {
                log::warn!("ignoring second {kind} commit for prompt '{id}'");
                Ok(())
            }
        }
    }

    fn commit<T>(
        &mut self,
        id: &str,
        kind: FieldKind,
        value: T,
        slot: fn(&mut PromptEntry) -> &mut Option<T>,
    ) -> Result<(), LedgerError> {
        let policy = self.config.duplicate_commit;
        let target = slot(self.entries.entry(id.to_string()).or_default());
        if target.is_some() {
            return Self::duplicate_commit(policy, id, kind);
        }
        *target = Some(value);
        log::debug!("committed {kind} for prompt '{id}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_ids_read_as_absent() {
        let state = ScenarioState::new();
        assert!(state.string_choices("never").is_none());
        assert!(state.supplies("never").is_none());
        assert!(!state.has_supplies("never"));
        assert!(state.count("never").is_none());
        assert!(state.decision("never").is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn empty_record_is_distinct_from_absent() {
        let mut state = ScenarioState::new();
        state.set_string_choices("p1", StringChoices::new()).unwrap();
        let record = state.string_choices("p1").expect("committed");
        assert!(record.is_empty());
        assert!(state.is_committed("p1", FieldKind::StringChoices));
        assert!(!state.is_committed("p1", FieldKind::Supplies));
    }

    #[test]
    fn second_commit_is_rejected_and_first_value_kept() {
        let mut state = ScenarioState::new();
        let first = StringChoices::uniform(["A"], "x");
        state.set_string_choices("p1", first.clone()).unwrap();

        let err = state
            .set_string_choices("p1", StringChoices::uniform(["B"], "x"))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AlreadyCommitted {
                kind: FieldKind::StringChoices,
                ..
            }
        ));
        assert_eq!(state.string_choices("p1"), Some(&first));
    }

    #[test]
    fn ignore_policy_keeps_first_value_without_error() {
        let config = LedgerConfig {
            duplicate_commit: DuplicateCommit::Ignore,
        };
        let mut state = ScenarioState::new().with_config(config);
        state.set_count("pick", 3).unwrap();
        state.set_count("pick", 7).unwrap();
        assert_eq!(state.count("pick"), Some(3));
    }

    #[test]
    fn kinds_are_independent_per_prompt() {
        let mut state = ScenarioState::new();
        state.set_decision("p1", true).unwrap();
        state.set_count("p1", 2).unwrap();
        assert_eq!(state.decision("p1"), Some(true));
        assert_eq!(state.count("p1"), Some(2));
        assert!(state.string_choices("p1").is_none());
        let kinds: Vec<_> = state.entry("p1").unwrap().kinds().collect();
        assert_eq!(kinds, vec![FieldKind::Count, FieldKind::Decision]);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn reset_clears_entries_but_keeps_config() {
        let config = LedgerConfig {
            duplicate_commit: DuplicateCommit::Ignore,
        };
        let mut state = ScenarioState::new().with_config(config);
        state.set_decision("p1", false).unwrap();
        state.reset();
        assert!(state.is_empty());
        assert_eq!(state.config(), config);
    }

    #[test]
    fn json_omits_pending_kinds() {
        let mut state = ScenarioState::new();
        state.set_decision("door", true).unwrap();
        let json = state.to_json().unwrap();
        assert_eq!(json, r#"{"entries":{"door":{"decision":true}}}"#);
        let restored = ScenarioState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn config_parses_with_defaults() {
        let config = LedgerConfig::from_json("{}").unwrap();
        assert_eq!(config.duplicate_commit, DuplicateCommit::Reject);
        let config = LedgerConfig::from_json(r#"{"duplicate_commit":"ignore"}"#).unwrap();
        assert_eq!(config.duplicate_commit, DuplicateCommit::Ignore);
        assert!(LedgerConfig::from_json(r#"{"duplicate_commit":"overwrite"}"#).is_err());
    }
}
