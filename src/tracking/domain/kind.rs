//! Item kinds and the descriptors that parametrize the lifecycle engine.
//!
//! A kind is configuration data, not code: the engine reads the transition
//! table, cleanup policy, and labels from the kind's [`KindDescriptor`].

use super::{ItemStatus, ParseItemKindError, Priority, TransitionRule, Trigger};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The families of tracked items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Defect reports.
    Bug,
    /// Plain work items.
    Todo,
    /// Feature requests.
    Feature,
    /// Product ideas.
    Idea,
}

impl ItemKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [Self::Bug, Self::Todo, Self::Feature, Self::Idea];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Todo => "todo",
            Self::Feature => "feature",
            Self::Idea => "idea",
        }
    }

    /// Returns the static descriptor for this kind.
    #[must_use]
    pub const fn descriptor(self) -> &'static KindDescriptor {
        match self {
            Self::Bug => &BUG,
            Self::Todo => &TODO,
            Self::Feature => &FEATURE,
            Self::Idea => &IDEA,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ItemKind {
    type Error = ParseItemKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "bug" => Ok(Self::Bug),
            "todo" => Ok(Self::Todo),
            "feature" => Ok(Self::Feature),
            "idea" => Ok(Self::Idea),
            _ => Err(ParseItemKindError(value.to_owned())),
        }
    }
}

/// How a kind colours its presentation cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourScheme {
    /// Colour follows item priority.
    ByPriority,
    /// Colour follows lifecycle status.
    ByStatus,
}

/// Per-kind display names for each generic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabels {
    /// Label for [`ItemStatus::Open`].
    pub open: &'static str,
    /// Label for [`ItemStatus::InProgress`].
    pub in_progress: &'static str,
    /// Label for [`ItemStatus::Resolved`].
    pub resolved: &'static str,
    /// Label for [`ItemStatus::Rejected`].
    pub rejected: &'static str,
}

/// Configuration that specializes the generic engine to one item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    /// Kind this descriptor belongs to.
    pub kind: ItemKind,
    /// Singular noun used in surface names and action identifiers.
    pub noun: &'static str,
    /// Plural, capitalized noun used in category names.
    pub plural_title: &'static str,
    /// Status labels shown to users.
    pub labels: StatusLabels,
    /// Enabled transition edges.
    pub rules: &'static [TransitionRule],
    /// Terminal states that arm a cleanup timer on entry.
    pub cleanup_states: &'static [ItemStatus],
    /// Card colouring policy.
    pub colour_scheme: ColourScheme,
    /// Priority applied when a creation request omits one.
    pub default_priority: Priority,
}

impl KindDescriptor {
    /// Returns the rule fired by `trigger`, if this kind enables it.
    #[must_use]
    pub fn rule(&self, trigger: Trigger) -> Option<&'static TransitionRule> {
        self.rules.iter().find(|rule| rule.trigger == trigger)
    }

    /// Returns whether the kind enables `trigger` at all.
    #[must_use]
    pub fn supports(&self, trigger: Trigger) -> bool {
        self.rule(trigger).is_some()
    }

    /// Returns whether a direct edge `from -> to` exists in the table.
    #[must_use]
    pub fn can_transition(&self, from: ItemStatus, to: ItemStatus) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.to == to && rule.accepts(from))
    }

    /// Returns whether entering `status` arms a cleanup timer.
    #[must_use]
    pub fn is_cleanup_eligible(&self, status: ItemStatus) -> bool {
        self.cleanup_states.contains(&status)
    }

    /// Returns the kind-specific label for a status.
    #[must_use]
    pub const fn status_label(&self, status: ItemStatus) -> &'static str {
        match status {
            ItemStatus::Open => self.labels.open,
            ItemStatus::InProgress => self.labels.in_progress,
            ItemStatus::Resolved => self.labels.resolved,
            ItemStatus::Rejected => self.labels.rejected,
        }
    }
}

const CLAIM: TransitionRule = TransitionRule {
    trigger: Trigger::Claim,
    from: &[ItemStatus::Open],
    to: ItemStatus::InProgress,
};

const RESOLVE: TransitionRule = TransitionRule {
    trigger: Trigger::Resolve,
    from: &[ItemStatus::InProgress, ItemStatus::Open],
    to: ItemStatus::Resolved,
};

const REJECT: TransitionRule = TransitionRule {
    trigger: Trigger::Reject,
    from: &[ItemStatus::InProgress, ItemStatus::Open],
    to: ItemStatus::Rejected,
};

const REOPEN_RESOLVED: TransitionRule = TransitionRule {
    trigger: Trigger::Reopen,
    from: &[ItemStatus::Resolved],
    to: ItemStatus::Open,
};

const REOPEN_ANY: TransitionRule = TransitionRule {
    trigger: Trigger::Reopen,
    from: &[ItemStatus::Resolved, ItemStatus::Rejected],
    to: ItemStatus::Open,
};

const BUG: KindDescriptor = KindDescriptor {
    kind: ItemKind::Bug,
    noun: "bug",
    plural_title: "Bugs",
    labels: StatusLabels {
        open: "open",
        in_progress: "wip",
        resolved: "resolved",
        rejected: "rejected",
    },
    rules: &[CLAIM, RESOLVE, REOPEN_RESOLVED],
    cleanup_states: &[ItemStatus::Resolved],
    colour_scheme: ColourScheme::ByPriority,
    default_priority: Priority::Medium,
};

const TODO: KindDescriptor = KindDescriptor {
    kind: ItemKind::Todo,
    noun: "todo",
    plural_title: "Todos",
    labels: StatusLabels {
        open: "open",
        in_progress: "in_progress",
        resolved: "done",
        rejected: "rejected",
    },
    rules: &[CLAIM, RESOLVE, REOPEN_RESOLVED],
    cleanup_states: &[ItemStatus::Resolved],
    colour_scheme: ColourScheme::ByPriority,
    default_priority: Priority::Medium,
};

const FEATURE: KindDescriptor = KindDescriptor {
    kind: ItemKind::Feature,
    noun: "feature",
    plural_title: "Features",
    labels: StatusLabels {
        open: "proposed",
        in_progress: "in_progress",
        resolved: "completed",
        rejected: "rejected",
    },
    rules: &[CLAIM, RESOLVE, REJECT, REOPEN_ANY],
    cleanup_states: &[ItemStatus::Resolved, ItemStatus::Rejected],
    colour_scheme: ColourScheme::ByPriority,
    default_priority: Priority::Medium,
};

// Accepted ideas keep their discussion surface; only rejections are cleaned up.
const IDEA: KindDescriptor = KindDescriptor {
    kind: ItemKind::Idea,
    noun: "idea",
    plural_title: "Ideas",
    labels: StatusLabels {
        open: "open",
        in_progress: "under_review",
        resolved: "accepted",
        rejected: "rejected",
    },
    rules: &[CLAIM, RESOLVE, REJECT, REOPEN_ANY],
    cleanup_states: &[ItemStatus::Rejected],
    colour_scheme: ColourScheme::ByStatus,
    default_priority: Priority::Medium,
};
