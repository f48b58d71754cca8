//! Template-driven rendering of items into presentation content.

use crate::tracking::domain::{
    ActionButton, Actor, ButtonStyle, Card, CardField, ColourScheme, HistoryEntry, Item,
    ItemAction, ItemStatus, MessageContent, Priority, Trigger, UpdateEntry,
};
use minijinja::{Environment, Value, context};
use thiserror::Error;

const DETAIL_TITLE: &str = "{{ noun | title }}: {{ title }}";
const LIST_DESCRIPTION: &str = concat!(
    "Status: {{ status }} | Priority: {{ priority }}",
    "{% if claimant %} | Claimed by {{ claimant }}{% endif %}",
    "{% if category %} | {{ category }}{% endif %}",
);
const EMPTY_BODY: &str = "_No description provided._";
const FOOTER: &str = "{{ noun | title }} ID: {{ id }}";
const CLAIM_NOTICE: &str = "{{ actor }} is now working on this {{ noun }}.";
const CLOSE_NOTICE: &str = "This {{ noun }} was marked {{ label }} by {{ actor }}.";
const REOPEN_NOTICE: &str = "This {{ noun }} was reopened by {{ actor }}.";
const UPDATE_TITLE: &str = "Update from {{ author }}";
const UPDATE_FOOTER: &str = "Posted {{ at }}";
const HISTORY: &str = concat!(
    "**History of {{ title }}**\n",
    "{% for entry in entries %}",
    "- {{ entry.at }} ",
    "{% if entry.kind == 'update' %}{{ entry.author }}: {{ entry.text }}",
    "{% else %}Reopened by {{ entry.author }}{% endif %}\n",
    "{% else %}No updates recorded.\n{% endfor %}",
);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Error raised when a template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {template}: {reason}")]
pub struct RenderError {
    /// Name of the failing template.
    pub template: &'static str,
    /// Renderer message.
    pub reason: String,
}

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Lifecycle event announced on an item's detail surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Someone claimed the item.
    Claimed(Actor),
    /// Someone resolved the item.
    Resolved(Actor),
    /// Someone rejected the item.
    Rejected(Actor),
    /// Someone reopened the item.
    Reopened(Actor),
}

/// Renders items into [`MessageContent`].
pub struct ItemRenderer {
    environment: Environment<'static>,
}

impl Default for ItemRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ItemRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemRenderer").finish_non_exhaustive()
    }
}

impl ItemRenderer {
    /// Creates a renderer with the default environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    fn render(&self, name: &'static str, template: &str, ctx: Value) -> RenderResult<String> {
        self.environment
            .render_str(template, ctx)
            .map_err(|error| RenderError {
                template: name,
                reason: error.to_string(),
            })
    }

    fn title(&self, item: &Item) -> RenderResult<String> {
        self.render(
            "title",
            DETAIL_TITLE,
            context! { noun => item.kind().descriptor().noun, title => item.title() },
        )
    }

    fn footer(&self, item: &Item) -> RenderResult<String> {
        self.render(
            "footer",
            FOOTER,
            context! { noun => item.kind().descriptor().noun, id => item.id().to_string() },
        )
    }

    /// Renders the detail view shown at the top of the detail surface.
    ///
    /// Terminal items render without actions.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when a template fails.
    pub fn detail_view(&self, item: &Item) -> RenderResult<MessageContent> {
        let descriptor = item.kind().descriptor();
        let description = if item.body().trim().is_empty() {
            EMPTY_BODY.to_owned()
        } else {
            item.body().to_owned()
        };
        let mut fields = vec![
            CardField::inline("Status", descriptor.status_label(item.status())),
            CardField::inline("Priority", item.priority().as_str()),
            CardField::inline("Reported by", item.creator().display_name.clone()),
        ];
        if let Some(claimant) = item.claimant() {
            fields.push(CardField::inline(
                "Claimed by",
                claimant.display_name.clone(),
            ));
        }
        if let Some(category) = item.category() {
            fields.push(CardField::inline("Repository", category));
        }
        if !item.tags().is_empty() {
            fields.push(CardField::inline("Tags", item.tags().join(", ")));
        }
        if let Some(due) = item.due_date() {
            fields.push(CardField::inline("Due", due.to_string()));
        }
        if !item.supplementary_text().trim().is_empty() {
            fields.push(CardField::block("Details", item.supplementary_text()));
        }
        let card = Card {
            title: self.title(item)?,
            description,
            colour: card_colour(item),
            fields,
            footer: Some(self.footer(item)?),
        };
        Ok(MessageContent::card(card).with_actions(detail_actions(item)))
    }

    /// Renders the item's entry on the scope-wide list surface.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when a template fails.
    pub fn list_entry(&self, item: &Item) -> RenderResult<MessageContent> {
        let descriptor = item.kind().descriptor();
        let description = self.render(
            "list entry",
            LIST_DESCRIPTION,
            context! {
                status => descriptor.status_label(item.status()),
                priority => item.priority().as_str(),
                claimant => item.claimant().map(|actor| actor.display_name.clone()),
                category => item.category(),
            },
        )?;
        let card = Card {
            title: self.title(item)?,
            description,
            colour: card_colour(item),
            fields: Vec::new(),
            footer: Some(self.footer(item)?),
        };
        let actions = if descriptor
            .rule(Trigger::Reopen)
            .is_some_and(|rule| rule.accepts(item.status()))
        {
            vec![reopen_button(item)]
        } else {
            Vec::new()
        };
        Ok(MessageContent::card(card).with_actions(actions))
    }

    /// Renders a lifecycle notice for the detail surface.
    ///
    /// Resolve and reject notices carry a reopen action.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when a template fails.
    pub fn notice(&self, item: &Item, notice: &Notice) -> RenderResult<MessageContent> {
        let descriptor = item.kind().descriptor();
        let noun = descriptor.noun;
        match notice {
            Notice::Claimed(actor) => self
                .render(
                    "claim notice",
                    CLAIM_NOTICE,
                    context! { actor => &actor.display_name, noun => noun },
                )
                .map(MessageContent::text),
            Notice::Resolved(actor) | Notice::Rejected(actor) => {
                let status = if matches!(notice, Notice::Resolved(_)) {
                    ItemStatus::Resolved
                } else {
                    ItemStatus::Rejected
                };
                let text = self.render(
                    "close notice",
                    CLOSE_NOTICE,
                    context! {
                        actor => &actor.display_name,
                        noun => noun,
                        label => descriptor.status_label(status),
                    },
                )?;
                let actions = if descriptor.supports(Trigger::Reopen) {
                    vec![reopen_button(item)]
                } else {
                    Vec::new()
                };
                Ok(MessageContent::text(text).with_actions(actions))
            }
            Notice::Reopened(actor) => self
                .render(
                    "reopen notice",
                    REOPEN_NOTICE,
                    context! { actor => &actor.display_name, noun => noun },
                )
                .map(MessageContent::text),
        }
    }

    /// Renders one update posted to the detail surface.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when a template fails.
    pub fn update_message(&self, item: &Item, entry: &UpdateEntry) -> RenderResult<MessageContent> {
        let card = Card {
            title: self.render(
                "update title",
                UPDATE_TITLE,
                context! { author => &entry.author.display_name },
            )?,
            description: entry.text.clone(),
            colour: card_colour(item),
            fields: Vec::new(),
            footer: Some(self.render(
                "update footer",
                UPDATE_FOOTER,
                context! { at => entry.created_at.format(TIMESTAMP_FORMAT).to_string() },
            )?),
        };
        Ok(MessageContent::card(card))
    }

    /// Renders the merged update and reopen history as one message.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when a template fails.
    pub fn history_block(&self, item: &Item) -> RenderResult<MessageContent> {
        let entries: Vec<Value> = item
            .history()
            .iter()
            .map(|entry| {
                let at = entry.at().format(TIMESTAMP_FORMAT).to_string();
                match entry {
                    HistoryEntry::Update { author, text, .. } => context! {
                        kind => "update",
                        at => at,
                        author => &author.display_name,
                        text => text,
                    },
                    HistoryEntry::Reopen { author, .. } => context! {
                        kind => "reopen",
                        at => at,
                        author => &author.display_name,
                    },
                }
            })
            .collect();
        self.render(
            "history",
            HISTORY,
            context! { title => item.title(), entries => entries },
        )
        .map(MessageContent::text)
    }
}

fn card_colour(item: &Item) -> u32 {
    match item.kind().descriptor().colour_scheme {
        ColourScheme::ByPriority if item.status().is_terminal() => 0x0095_A5A6,
        ColourScheme::ByPriority => match item.priority() {
            Priority::Low => 0x002E_CC71,
            Priority::Medium => 0x00F1_C40F,
            Priority::High => 0x00E6_7E22,
            Priority::Critical => 0x00E7_4C3C,
        },
        ColourScheme::ByStatus => match item.status() {
            ItemStatus::Open => 0x0034_98DB,
            ItemStatus::InProgress => 0x00F1_C40F,
            ItemStatus::Resolved => 0x002E_CC71,
            ItemStatus::Rejected => 0x00E7_4C3C,
        },
    }
}

fn detail_actions(item: &Item) -> Vec<ActionButton> {
    if item.status().is_terminal() {
        return Vec::new();
    }
    let descriptor = item.kind().descriptor();
    let (kind, id) = (item.kind(), item.id());
    let mut actions = vec![
        ActionButton::new(
            kind,
            ItemAction::Transition(Trigger::Claim),
            id,
            "Claim",
            ButtonStyle::Primary,
        )
        .disabled(item.status() == ItemStatus::InProgress),
        ActionButton::new(
            kind,
            ItemAction::Update,
            id,
            "Add Update",
            ButtonStyle::Secondary,
        ),
        ActionButton::new(
            kind,
            ItemAction::Transition(Trigger::Resolve),
            id,
            capitalize(descriptor.labels.resolved),
            ButtonStyle::Success,
        ),
    ];
    if descriptor.supports(Trigger::Reject) {
        actions.push(ActionButton::new(
            kind,
            ItemAction::Transition(Trigger::Reject),
            id,
            "Reject",
            ButtonStyle::Danger,
        ));
    }
    actions
}

fn reopen_button(item: &Item) -> ActionButton {
    ActionButton::new(
        item.kind(),
        ItemAction::Transition(Trigger::Reopen),
        item.id(),
        "Open Again",
        ButtonStyle::Secondary,
    )
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
