//! Two-phase read path shared by prompts.
//!
//! A prompt owns a draft while its decision is pending. Reads prefer the
//! ledger's committed value and fall back to the draft.

/// A prompt value resolved from either the ledger or the prompt's draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a, T> {
    Committed(&'a T),
    Draft(&'a T),
}

impl<'a, T> Resolved<'a, T> {
    /// Prefer `committed`, else `draft`.
    #[must_use]
    pub fn resolve(committed: Option<&'a T>, draft: &'a T) -> Self {
        committed.map_or(Self::Draft(draft), Self::Committed)
    }

    #[must_use]
    pub const fn value(&self) -> &'a T {
        match self {
            Self::Committed(value) | Self::Draft(value) => *value,
        }
    }

    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// Drafts are editable; committed values are history.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !self.is_committed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_value_wins_over_draft() {
        let committed = 1;
        let draft = 2;
        let resolved = Resolved::resolve(Some(&committed), &draft);
        assert_eq!(*resolved.value(), 1);
        assert!(!resolved.is_editable());

        let pending = Resolved::resolve(None, &draft);
        assert_eq!(*pending.value(), 2);
        assert!(pending.is_editable());
    }
}
