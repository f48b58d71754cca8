//! Generic lifecycle status shared by every item kind.

use super::ParseItemStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a tracked item.
///
/// Kinds present these under their own labels (a bug's `InProgress` reads
/// "wip", a feature's `Open` reads "proposed"); see
/// [`KindDescriptor::status_label`](super::KindDescriptor::status_label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Initial state; nobody is working on the item.
    Open,
    /// A claimant is working on the item.
    InProgress,
    /// Terminal: the item was resolved, done, completed, or accepted.
    Resolved,
    /// Terminal: the item was rejected.
    Rejected,
}

impl ItemStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Rejected];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether the only further transition is reopen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ItemStatus {
    type Error = ParseItemStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseItemStatusError(value.to_owned())),
        }
    }
}

/// Lifecycle operation that drives a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Take ownership of an open item.
    Claim,
    /// Finish an item successfully.
    Resolve,
    /// Decline an item.
    Reject,
    /// Return a terminal item to `Open`.
    Reopen,
}

impl Trigger {
    /// Returns the action name used in presentation action identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Resolve => "resolve",
            Self::Reject => "reject",
            Self::Reopen => "reopen",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edge group of a kind's transition table.
///
/// `from` is ordered: the engine attempts a conditional status swap from each
/// source in turn and stops at the first that matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Operation that fires the edge.
    pub trigger: Trigger,
    /// Accepted source states, in attempt order.
    pub from: &'static [ItemStatus],
    /// Destination state.
    pub to: ItemStatus,
}

impl TransitionRule {
    /// Returns whether `status` is an accepted source state for this rule.
    #[must_use]
    pub fn accepts(&self, status: ItemStatus) -> bool {
        self.from.contains(&status)
    }
}
