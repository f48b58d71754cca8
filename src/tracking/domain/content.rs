//! Presentation data contract.
//!
//! These types describe what a surface should show. Adapters turn them into
//! platform widgets; the engine compares them to decide whether an edit is
//! needed.

use super::{ItemId, ItemKind, Trigger};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content of one presentation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    /// Plain text body.
    pub text: Option<String>,
    /// Rich card, if any.
    pub card: Option<Card>,
    /// Interactive actions attached to the message.
    pub actions: Vec<ActionButton>,
}

impl MessageContent {
    /// Creates a text-only message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates a card-only message.
    #[must_use]
    pub fn card(card: Card) -> Self {
        Self {
            card: Some(card),
            ..Self::default()
        }
    }

    /// Attaches actions to the message.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<ActionButton>) -> Self {
        self.actions = actions;
        self
    }
}

/// Rich card rendered for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card heading.
    pub title: String,
    /// Card body.
    pub description: String,
    /// RGB accent colour.
    pub colour: u32,
    /// Labelled fields.
    pub fields: Vec<CardField>,
    /// Footer line.
    pub footer: Option<String>,
}

/// One labelled field on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    /// Field label.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Whether the field may share a row.
    pub inline: bool,
}

impl CardField {
    /// Creates an inline field.
    #[must_use]
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }

    /// Creates a full-width field.
    #[must_use]
    pub fn block(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Main call to action.
    Primary,
    /// Neutral action.
    Secondary,
    /// Positive action.
    Success,
    /// Destructive action.
    Danger,
}

/// Action a presentation button routes back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    /// Fires a lifecycle trigger.
    Transition(Trigger),
    /// Opens the add-update form.
    Update,
}

impl ItemAction {
    /// Returns the action segment of a custom id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transition(trigger) => trigger.as_str(),
            Self::Update => "update",
        }
    }
}

impl fmt::Display for ItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interactive button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    /// Routing identifier, `<noun>_<action>_<item id>`.
    pub custom_id: String,
    /// Button label.
    pub label: String,
    /// Visual weight.
    pub style: ButtonStyle,
    /// Whether the button is shown but inert.
    pub disabled: bool,
}

impl ActionButton {
    /// Creates an enabled button routed to `action` on `id`.
    #[must_use]
    pub fn new(
        kind: ItemKind,
        action: ItemAction,
        id: ItemId,
        label: impl Into<String>,
        style: ButtonStyle,
    ) -> Self {
        Self {
            custom_id: action_custom_id(kind, action, id),
            label: label.into(),
            style,
            disabled: false,
        }
    }

    /// Marks the button as disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Builds the routing identifier for an action on an item.
#[must_use]
pub fn action_custom_id(kind: ItemKind, action: ItemAction, id: ItemId) -> String {
    format!("{}_{}_{}", kind.descriptor().noun, action, id)
}

/// Parses a routing identifier back into its parts.
///
/// Returns `None` for identifiers that do not belong to a tracked item.
#[must_use]
pub fn parse_action_custom_id(custom_id: &str) -> Option<(ItemKind, ItemAction, ItemId)> {
    let mut parts = custom_id.splitn(3, '_');
    let kind = ItemKind::try_from(parts.next()?).ok()?;
    let action = match parts.next()? {
        "claim" => ItemAction::Transition(Trigger::Claim),
        "resolve" => ItemAction::Transition(Trigger::Resolve),
        "reject" => ItemAction::Transition(Trigger::Reject),
        "reopen" => ItemAction::Transition(Trigger::Reopen),
        "update" => ItemAction::Update,
        _ => return None,
    };
    let id = parts.next()?.parse::<ItemId>().ok()?;
    Some((kind, action, id))
}
