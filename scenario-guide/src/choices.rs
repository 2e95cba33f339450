//! Recorded string choices for list-style prompts.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Option ids recorded against a single item. Check-lists record exactly one.
pub type ChoiceIds = SmallVec<[String; 1]>;

/// Item code to the option ids selected for it.
///
/// An empty record is a valid committed decision ("nothing chosen") and must
/// not be confused with an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringChoices {
    choices: BTreeMap<String, ChoiceIds>,
}

impl StringChoices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record where every code maps to the same single option id.
    #[must_use]
    pub fn uniform<I, S>(codes: I, choice_id: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut record = Self::new();
        for code in codes {
            record.insert(code, choice_id);
        }
        record
    }

    /// Append `choice_id` to the options recorded for `code`.
    pub fn insert(&mut self, code: impl Into<String>, choice_id: impl Into<String>) {
        self.choices
            .entry(code.into())
            .or_default()
            .push(choice_id.into());
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&[String]> {
        self.choices.get(code).map(SmallVec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.choices.contains_key(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.choices.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.choices
            .iter()
            .map(|(code, ids)| (code.as_str(), ids.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for StringChoices
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (code, choice_id) in iter {
            record.insert(code, choice_id);
        }
        record
    }
}
