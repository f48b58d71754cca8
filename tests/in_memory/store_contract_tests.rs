//! Store contract tests against the in-memory adapter.

use chrono::{TimeDelta, Utc};
use itemflow::tracking::{
    adapters::memory::InMemoryItemStore,
    domain::{
        ItemFieldUpdate, ItemId, ItemKind, ItemStatus, LogEntry, ReopenEntry, ScopeId,
        UpdateEntry,
    },
    ports::{ItemStore, StatusSwap},
};
use rstest::rstest;

use super::helpers::{actor, draft, scope, store};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_assigns_id_and_open_status(store: InMemoryItemStore) -> Result<(), eyre::Report> {
    let item = store.create(draft(ItemKind::Bug, "Fresh")).await?;

    eyre::ensure!(item.status() == ItemStatus::Open, "new items start open");
    let found = store
        .get_by_id(item.id())
        .await?
        .ok_or_else(|| eyre::eyre!("created item not found"))?;
    eyre::ensure!(found == item, "stored snapshot differs");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn compare_and_set_applies_extras_only_on_match(
    store: InMemoryItemStore,
) -> Result<(), eyre::Report> {
    let item = store.create(draft(ItemKind::Todo, "Swap me")).await?;
    let claimant = actor("alice");

    let mismatch = store
        .compare_and_set_status(
            item.id(),
            ItemStatus::InProgress,
            ItemStatus::Resolved,
            &[ItemFieldUpdate::Claimant(Some(claimant.clone()))],
        )
        .await?;
    eyre::ensure!(mismatch == StatusSwap::NoMatch, "status should not match");
    let untouched = store
        .get_by_id(item.id())
        .await?
        .ok_or_else(|| eyre::eyre!("item vanished"))?;
    eyre::ensure!(untouched.claimant().is_none(), "extras applied on mismatch");

    let swapped = store
        .compare_and_set_status(
            item.id(),
            ItemStatus::Open,
            ItemStatus::InProgress,
            &[ItemFieldUpdate::Claimant(Some(claimant.clone()))],
        )
        .await?
        .into_item()
        .ok_or_else(|| eyre::eyre!("swap should match"))?;
    eyre::ensure!(swapped.status() == ItemStatus::InProgress, "status not swapped");
    eyre::ensure!(swapped.claimant() == Some(&claimant), "claimant not set");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn compare_and_set_on_missing_item_does_not_match(
    store: InMemoryItemStore,
) -> Result<(), eyre::Report> {
    let swap = store
        .compare_and_set_status(ItemId::new(), ItemStatus::Open, ItemStatus::InProgress, &[])
        .await?;
    eyre::ensure!(swap == StatusSwap::NoMatch, "missing item cannot swap");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn appends_keep_both_logs_in_order(store: InMemoryItemStore) -> Result<(), eyre::Report> {
    let item = store.create(draft(ItemKind::Feature, "Logged")).await?;
    let now = Utc::now();
    for (offset, text) in [(0, "one"), (1, "two")] {
        store
            .append_to_log(
                item.id(),
                LogEntry::Update(UpdateEntry {
                    author: actor("alice"),
                    text: text.to_owned(),
                    created_at: now + TimeDelta::seconds(offset),
                }),
            )
            .await?;
    }
    let updated = store
        .append_to_log(
            item.id(),
            LogEntry::Reopen(ReopenEntry {
                author: actor("bob"),
                reopened_at: now + TimeDelta::seconds(2),
            }),
        )
        .await?
        .ok_or_else(|| eyre::eyre!("item vanished"))?;

    let texts: Vec<&str> = updated
        .update_log()
        .iter()
        .map(|entry| entry.text.as_str())
        .collect();
    eyre::ensure!(texts == ["one", "two"], "update log out of order: {texts:?}");
    eyre::ensure!(updated.reopen_log().len() == 1, "reopen log not appended");
    eyre::ensure!(updated.history().len() == 3, "history should merge both logs");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_to_missing_item_returns_none(store: InMemoryItemStore) -> Result<(), eyre::Report> {
    let result = store
        .append_to_log(
            ItemId::new(),
            LogEntry::Reopen(ReopenEntry {
                author: actor("bob"),
                reopened_at: Utc::now(),
            }),
        )
        .await?;
    eyre::ensure!(result.is_none(), "append should report a missing item");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scope_query_filters_kind_and_scope(store: InMemoryItemStore) -> Result<(), eyre::Report> {
    let first = store.create(draft(ItemKind::Bug, "First")).await?;
    store.create(draft(ItemKind::Todo, "Other kind")).await?;
    let mut elsewhere = draft(ItemKind::Bug, "Other scope");
    elsewhere.scope = ScopeId::new("guild-7")?;
    store.create(elsewhere).await?;
    let mut later = draft(ItemKind::Bug, "Second");
    later.created_at = first.created_at() + TimeDelta::seconds(5);
    let second = store.create(later).await?;

    let found = store.query_by_scope(ItemKind::Bug, &scope()).await?;

    let ids: Vec<ItemId> = found.iter().map(|item| item.id()).collect();
    eyre::ensure!(ids == [first.id(), second.id()], "unexpected query result {ids:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recovery_queries_select_flagged_items(
    store: InMemoryItemStore,
) -> Result<(), eyre::Report> {
    let armed = store.create(draft(ItemKind::Bug, "Armed")).await?;
    store
        .compare_and_set_status(
            armed.id(),
            ItemStatus::Open,
            ItemStatus::Resolved,
            &[ItemFieldUpdate::DeletionArmedAt(Some(Utc::now()))],
        )
        .await?;
    let replaying = store.create(draft(ItemKind::Idea, "Replaying")).await?;
    store
        .set_field(replaying.id(), ItemFieldUpdate::ReplayPending(true))
        .await?;
    store.create(draft(ItemKind::Todo, "Idle")).await?;

    let armed_found = store.query_terminal_with_armed_deletion().await?;
    let replay_found = store.query_replay_pending().await?;

    eyre::ensure!(
        armed_found.iter().map(|item| item.id()).eq([armed.id()]),
        "armed query mismatch"
    );
    eyre::ensure!(
        replay_found.iter().map(|item| item.id()).eq([replaying.id()]),
        "replay query mismatch"
    );
    Ok(())
}
