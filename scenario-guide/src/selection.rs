//! Cardinality bounds for multi-select prompts.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a live selection may be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitGate {
    /// Selection is within bounds
    Ready,
    /// Fewer items selected than the minimum
    NotEnough,
    /// More items selected than the maximum
    TooMany,
}

impl CommitGate {
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for CommitGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::NotEnough => write!(f, "not enough"),
            Self::TooMany => write!(f, "too many"),
        }
    }
}

/// Inclusive `{min, max}` selection bounds. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionBounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl SelectionBounds {
    #[must_use]
    pub const fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Resolve a prompt's declared bounds against the items it actually shows.
    ///
    /// Unless `fixed_min` is set, a minimum larger than the item count is
    /// lowered to the item count so a short list can still be completed.
    #[must_use]
    pub fn resolve(
        min: Option<usize>,
        max: Option<usize>,
        fixed_min: bool,
        item_count: usize,
    ) -> Self {
        let min = match min {
            Some(min) if !fixed_min => Some(min.min(item_count)),
            other => other,
        };
        Self { min, max }
    }

    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    #[must_use]
    pub fn gate(&self, selected: usize) -> CommitGate {
        if self.min.is_some_and(|min| selected < min) {
            CommitGate::NotEnough
        } else if self.max.is_some_and(|max| selected > max) {
            CommitGate::TooMany
        } else {
            CommitGate::Ready
        }
    }
}
