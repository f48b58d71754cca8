//! Item store behaviour against a real `PostgreSQL` server.

use chrono::{TimeDelta, Utc};
use itemflow::tracking::{
    domain::{
        ItemFieldUpdate, ItemKind, ItemStatus, LogEntry, MessageId, ReopenEntry, SurfaceId,
        UpdateEntry,
    },
    ports::{ItemStore, StatusSwap},
};

use super::helpers::{BoxError, actor, draft, setup_store};

#[tokio::test(flavor = "multi_thread")]
async fn created_item_round_trips() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let created = schema.store.create(draft(ItemKind::Bug, "Crash on save")?).await?;

    let found = schema
        .store
        .get_by_id(created.id())
        .await?
        .ok_or("created item missing")?;

    assert_eq!(found.id(), created.id());
    assert_eq!(found.status(), ItemStatus::Open);
    assert_eq!(found.tags(), ["ui", "regression"]);
    assert_eq!(found.category(), Some("acme/editor"));
    assert_eq!(found.creator(), created.creator());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn compare_and_set_matches_only_expected_status() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let item = schema.store.create(draft(ItemKind::Todo, "Swap")?).await?;
    let claimant = actor("alice")?;
    let extra = [ItemFieldUpdate::Claimant(Some(claimant.clone()))];

    let miss = schema
        .store
        .compare_and_set_status(item.id(), ItemStatus::InProgress, ItemStatus::Resolved, &[])
        .await?;
    let hit = schema
        .store
        .compare_and_set_status(item.id(), ItemStatus::Open, ItemStatus::InProgress, &extra)
        .await?;

    assert_eq!(miss, StatusSwap::NoMatch);
    let swapped = hit.into_item().ok_or("swap should apply")?;
    assert_eq!(swapped.status(), ItemStatus::InProgress);
    assert_eq!(swapped.claimant(), Some(&claimant));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_swaps_have_one_winner() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let item = schema.store.create(draft(ItemKind::Bug, "Race")?).await?;
    let id = item.id();

    let mut handles = Vec::new();
    for index in 0..6 {
        let store = schema.store.clone();
        let claimant = actor(&format!("user{index}"))?;
        handles.push(tokio::spawn(async move {
            store
                .compare_and_set_status(
                    id,
                    ItemStatus::Open,
                    ItemStatus::InProgress,
                    &[ItemFieldUpdate::Claimant(Some(claimant))],
                )
                .await
        }));
    }
    let mut winners = 0;
    for handle in handles {
        if matches!(handle.await??, StatusSwap::Swapped(_)) {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn log_appends_preserve_order() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let item = schema.store.create(draft(ItemKind::Feature, "Logged")?).await?;
    let now = Utc::now();
    for (offset, text) in [(0, "first"), (1, "second")] {
        schema
            .store
            .append_to_log(
                item.id(),
                LogEntry::Update(UpdateEntry {
                    author: actor("alice")?,
                    text: text.to_owned(),
                    created_at: now + TimeDelta::seconds(offset),
                }),
            )
            .await?;
    }
    let updated = schema
        .store
        .append_to_log(
            item.id(),
            LogEntry::Reopen(ReopenEntry {
                author: actor("bob")?,
                reopened_at: now + TimeDelta::seconds(2),
            }),
        )
        .await?
        .ok_or("item missing after append")?;

    let texts: Vec<&str> = updated
        .update_log()
        .iter()
        .map(|entry| entry.text.as_str())
        .collect();
    assert_eq!(texts, ["first", "second"]);
    assert_eq!(updated.reopen_log().len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn presentation_references_can_be_set_and_cleared() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let item = schema.store.create(draft(ItemKind::Idea, "Refs")?).await?;
    let surface = SurfaceId::new("chan-1")?;
    let message = MessageId::new("msg-1")?;

    schema
        .store
        .set_field(item.id(), ItemFieldUpdate::DetailSurface(Some(surface.clone())))
        .await?;
    let with_message = schema
        .store
        .set_field(item.id(), ItemFieldUpdate::DetailMessage(Some(message.clone())))
        .await?
        .ok_or("item missing")?;
    let cleared = schema
        .store
        .set_field(item.id(), ItemFieldUpdate::DetailMessage(None))
        .await?
        .ok_or("item missing")?;

    assert_eq!(with_message.presentation().detail_surface_id, Some(surface.clone()));
    assert_eq!(with_message.presentation().detail_message_id, Some(message));
    assert_eq!(cleared.presentation().detail_message_id, None);
    assert_eq!(cleared.presentation().detail_surface_id, Some(surface));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn recovery_queries_select_flagged_rows() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let armed = schema.store.create(draft(ItemKind::Bug, "Armed")?).await?;
    schema
        .store
        .compare_and_set_status(
            armed.id(),
            ItemStatus::Open,
            ItemStatus::Resolved,
            &[ItemFieldUpdate::DeletionArmedAt(Some(Utc::now()))],
        )
        .await?;
    let replaying = schema.store.create(draft(ItemKind::Todo, "Replay")?).await?;
    schema
        .store
        .set_field(replaying.id(), ItemFieldUpdate::ReplayPending(true))
        .await?;
    schema.store.create(draft(ItemKind::Todo, "Idle")?).await?;

    let armed_ids: Vec<_> = schema
        .store
        .query_terminal_with_armed_deletion()
        .await?
        .iter()
        .map(|item| item.id())
        .collect();
    let replay_ids: Vec<_> = schema
        .store
        .query_replay_pending()
        .await?
        .iter()
        .map(|item| item.id())
        .collect();

    assert_eq!(armed_ids, [armed.id()]);
    assert_eq!(replay_ids, [replaying.id()]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn claimant_outside_in_progress_is_rejected_by_the_schema() -> Result<(), BoxError> {
    let Some(schema) = setup_store()? else {
        return Ok(());
    };
    let item = schema.store.create(draft(ItemKind::Bug, "Guarded")?).await?;

    let result = schema
        .store
        .set_field(item.id(), ItemFieldUpdate::Claimant(Some(actor("alice")?)))
        .await;

    assert!(result.is_err());
    Ok(())
}
