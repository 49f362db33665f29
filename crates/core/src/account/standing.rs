//! Account standing driven by client lifecycle changes.
//!
//! The `active` flag has three producers: the local admin toggle, the
//! remote lifecycle events, and nothing else; plus one consumer, the
//! registration guard. All of them go through this machine, so an
//! actual change is always distinguishable from a no-op. Lifecycle
//! notifications are only published for actual changes.

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Whether an account (or its owning client) is in good standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    /// Accepts ledger writes.
    Active,
    /// Deactivated; reads still work.
    Inactive,
}

impl Standing {
    /// Builds a standing from the persisted `active` flag.
    #[must_use]
    pub const fn from_flag(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    /// Returns the persisted `active` flag for this standing.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Guards ledger writes: only an active account accepts them.
    ///
    /// # Errors
    ///
    /// Returns `InactiveAccount` for a deactivated account.
    pub fn ensure_active(self, account_ref: &str) -> Result<(), LedgerError> {
        match self {
            Self::Active => Ok(()),
            Self::Inactive => Err(LedgerError::InactiveAccount(account_ref.to_string())),
        }
    }
}

/// A lifecycle action requested against a standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Move to `Active`.
    Activate,
    /// Move to `Inactive`.
    Deactivate,
}

impl LifecycleAction {
    /// The action that drives an account to the given persisted flag.
    #[must_use]
    pub const fn for_flag(active: bool) -> Self {
        if active { Self::Activate } else { Self::Deactivate }
    }

    /// The standing every account ends in after this action.
    #[must_use]
    pub const fn target(self) -> Standing {
        match self {
            Self::Activate => Standing::Active,
            Self::Deactivate => Standing::Inactive,
        }
    }
}

/// Outcome of applying a lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The standing after the action.
    pub next: Standing,
    /// False when the action was a no-op.
    pub changed: bool,
}

impl Standing {
    /// Applies a lifecycle action, reporting whether anything changed.
    #[must_use]
    pub fn apply(self, action: LifecycleAction) -> Transition {
        let next = action.target();
        Transition {
            next,
            changed: next != self,
        }
    }
}
