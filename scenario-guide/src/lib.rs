//! Scenario Guide Ledger
//!
//! Platform-agnostic decision tracking for campaign-guide scenario
//! walk-throughs. Prompts keep a local draft while the player edits and
//! commit the final decision into a write-once [`ScenarioState`] ledger.
//! Rendering and persistence engines live outside this crate.

pub mod checklist;
pub mod choices;
pub mod constants;
pub mod prompt;
pub mod selection;
pub mod state;
pub mod supplies;

// Re-export commonly used types
pub use checklist::{CheckListDraft, CheckListPrompt, CheckListView, CheckRow, ListItem};
pub use choices::{ChoiceIds, StringChoices};
pub use prompt::Resolved;
pub use selection::{CommitGate, SelectionBounds};
pub use state::{
    DuplicateCommit, FieldKind, LedgerConfig, LedgerError, PromptEntry, PromptId, ScenarioState,
};
pub use supplies::{
    Investigator, InvestigatorSupplies, SuppliesDraft, SuppliesInput, SuppliesPrompt,
    SuppliesView, Supply, SupplyAllocation, SupplyCounts, SupplyRow,
};

/// Trait for abstracting save/resume of scenario ledgers.
/// Platform-specific implementations should provide this
pub trait LedgerStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a ledger snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be saved.
    fn save_ledger(&self, slot: &str, state: &ScenarioState) -> Result<(), Self::Error>;

    /// Load a ledger snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be loaded.
    fn load_ledger(&self, slot: &str) -> Result<Option<ScenarioState>, Self::Error>;

    /// Delete a saved ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_ledger(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Starts, saves, and resumes scenario ledgers through an injected storage.
pub struct ScenarioGuide<S>
where
    S: LedgerStorage,
{
    storage: S,
    config: LedgerConfig,
}

impl<S> ScenarioGuide<S>
where
    S: LedgerStorage,
{
    /// Create a guide with the provided storage and ledger configuration
    pub const fn new(storage: S, config: LedgerConfig) -> Self {
        Self { storage, config }
    }

    #[must_use]
    pub const fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Fresh ledger for a scenario that is just starting.
    #[must_use]
    pub fn start_scenario(&self) -> ScenarioState {
        ScenarioState::new().with_config(self.config)
    }

    /// Save a ledger at a scenario save point
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be saved.
    pub fn save(&self, slot: &str, state: &ScenarioState) -> Result<(), S::Error> {
        log::debug!("saving scenario ledger to '{slot}' ({} prompts)", state.len());
        self.storage.save_ledger(slot, state)
    }

    /// Resume a saved ledger verbatim, reapplying this guide's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be loaded.
    pub fn resume(&self, slot: &str) -> Result<Option<ScenarioState>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let Some(mut state) = self.storage.load_ledger(slot).map_err(Into::into)? else {
            log::debug!("no scenario ledger saved in '{slot}'");
            return Ok(None);
        };
        state.set_config(self.config);
        Ok(Some(state))
    }

    /// Discard the saved ledger of an abandoned scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn abandon(&self, slot: &str) -> Result<(), S::Error> {
        log::debug!("abandoning scenario ledger '{slot}'");
        self.storage.delete_ledger(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, String>>>,
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

    #[derive(Clone, Copy, Default)]
    struct NullStorage;

    impl LedgerStorage for NullStorage {
        type Error = Infallible;

        fn save_ledger(&self, _slot: &str, _state: &ScenarioState) -> Result<(), Self::Error> {
            Ok(())
        }

        fn load_ledger(&self, _slot: &str) -> Result<Option<ScenarioState>, Self::Error> {
            Ok(None)
        }

        fn delete_ledger(&self, _slot: &str) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn guide_saves_and_resumes_verbatim() {
        let config = LedgerConfig {
            duplicate_commit: DuplicateCommit::Ignore,
        };
        let guide = ScenarioGuide::new(MemoryStorage::default(), config);
        let mut state = guide.start_scenario();
        state
            .set_string_choices("p1", StringChoices::uniform(["A"], "x"))
            .unwrap();
        state.set_decision("p2", false).unwrap();
        guide.save("slot-one", &state).unwrap();

        let resumed = guide.resume("slot-one").unwrap().expect("save exists");
        assert_eq!(resumed, state);
        assert_eq!(resumed.config(), config);
        assert!(guide.resume("missing-slot").unwrap().is_none());

        guide.abandon("slot-one").unwrap();
        assert!(guide.resume("slot-one").unwrap().is_none());
    }

    #[test]
    fn start_scenario_applies_config() {
        let guide = ScenarioGuide::new(NullStorage, LedgerConfig::default_config());
        let state = guide.start_scenario();
        assert!(state.is_empty());
        assert_eq!(state.config().duplicate_commit, DuplicateCommit::Reject);
        assert!(guide.resume("anything").unwrap().is_none());
    }
}
