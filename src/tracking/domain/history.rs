//! Chronological merge of an item's update and reopen logs.

use super::{Actor, ReopenEntry, UpdateEntry};
use chrono::{DateTime, Utc};

/// One entry of the merged history timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A free-form update.
    Update {
        /// Update author.
        author: Actor,
        /// Update text.
        text: String,
        /// When the update was recorded.
        at: DateTime<Utc>,
    },
    /// A reopen transition.
    Reopen {
        /// Actor who reopened the item.
        author: Actor,
        /// When the item was reopened.
        at: DateTime<Utc>,
    },
}

impl HistoryEntry {
    /// Returns the entry timestamp.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Update { at, .. } | Self::Reopen { at, .. } => *at,
        }
    }

    /// Returns the entry author.
    #[must_use]
    pub const fn author(&self) -> &Actor {
        match self {
            Self::Update { author, .. } | Self::Reopen { author, .. } => author,
        }
    }

    /// Merges both logs into one timeline ordered by timestamp.
    ///
    /// Both logs are append-only and therefore already sorted; on equal
    /// timestamps the update precedes the reopen.
    #[must_use]
    pub fn merge(updates: &[UpdateEntry], reopens: &[ReopenEntry]) -> Vec<Self> {
        let mut timeline: Vec<Self> = updates
            .iter()
            .map(|entry| Self::Update {
                author: entry.author.clone(),
                text: entry.text.clone(),
                at: entry.created_at,
            })
            .chain(reopens.iter().map(|entry| Self::Reopen {
                author: entry.author.clone(),
                at: entry.reopened_at,
            }))
            .collect();
        // Stable sort keeps log order within equal timestamps.
        timeline.sort_by_key(|entry| (entry.at(), entry.rank()));
        timeline
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Update { .. } => 0,
            Self::Reopen { .. } => 1,
        }
    }
}
