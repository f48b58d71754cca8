//! Racing operations on a single item.

use std::sync::Arc;

use itemflow::tracking::{
    domain::{ItemKind, ItemStatus},
    ports::ItemStore,
    services::TransitionOutcome,
};
use rstest::rstest;

use super::helpers::{Engine, actor, engine, request};

#[rstest]
#[case(2)]
#[case(16)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_produce_one_winner(
    engine: Engine,
    #[case] claimers: usize,
) -> Result<(), eyre::Report> {
    let item = engine
        .service
        .create_item(request(ItemKind::Bug, "Contended"))
        .await?;
    let shared = Arc::new(engine.service);

    let handles: Vec<_> = (0..claimers)
        .map(|index| {
            let service = Arc::clone(&shared);
            let id = item.id();
            tokio::spawn(async move {
                let who = actor(&format!("user{index}"));
                service.claim(id, &who).await.map(|outcome| (who, outcome))
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        let (who, outcome) = handle.await??;
        match outcome {
            TransitionOutcome::Applied(_) => winners.push(who),
            TransitionOutcome::AlreadyClaimedOrClosed => {}
            other => eyre::bail!("unexpected outcome {other:?}"),
        }
    }
    eyre::ensure!(winners.len() == 1, "expected one winner, got {}", winners.len());

    let stored = engine
        .store
        .get_by_id(item.id())
        .await?
        .ok_or_else(|| eyre::eyre!("item vanished"))?;
    eyre::ensure!(stored.status() == ItemStatus::InProgress, "claim not persisted");
    eyre::ensure!(
        stored.claimant() == winners.first(),
        "claimant is not the winner"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn resolve_and_reject_race_settles_on_one_terminal_state(
    engine: Engine,
) -> Result<(), eyre::Report> {
    let item = engine
        .service
        .create_item(request(ItemKind::Feature, "Contested"))
        .await?;
    let resolver = engine.service.clone();
    let rejecter = engine.service.clone();
    let id = item.id();

    let (resolved, rejected) = tokio::join!(
        tokio::spawn(async move { resolver.resolve(id, &actor("alice")).await }),
        tokio::spawn(async move { rejecter.reject(id, &actor("bob")).await }),
    );
    let resolve_outcome = resolved??;
    let reject_outcome = rejected??;

    eyre::ensure!(
        resolve_outcome.is_applied() != reject_outcome.is_applied(),
        "exactly one close should apply: {resolve_outcome:?} / {reject_outcome:?}"
    );
    let stored = engine
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(|| eyre::eyre!("item vanished"))?;
    let expected = if resolve_outcome.is_applied() {
        ItemStatus::Resolved
    } else {
        ItemStatus::Rejected
    };
    eyre::ensure!(stored.status() == expected, "stored status disagrees");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_are_all_recorded(engine: Engine) -> Result<(), eyre::Report> {
    let item = engine
        .service
        .create_item(request(ItemKind::Todo, "Busy"))
        .await?;
    let handles: Vec<_> = (0..10)
        .map(|index| {
            let service = engine.service.clone();
            let id = item.id();
            tokio::spawn(async move {
                service
                    .add_update(id, &actor("alice"), &format!("note {index}"))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let stored = engine
        .store
        .get_by_id(item.id())
        .await?
        .ok_or_else(|| eyre::eyre!("item vanished"))?;
    eyre::ensure!(stored.update_log().len() == 10, "updates lost");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_resolves_have_one_winner(engine: Engine) -> Result<(), eyre::Report> {
    let item = engine
        .service
        .create_item(request(ItemKind::Bug, "Double close"))
        .await?;
    let first = engine.service.clone();
    let second = engine.service.clone();
    let id = item.id();

    let (one, two) = tokio::join!(
        tokio::spawn(async move { first.resolve(id, &actor("alice")).await }),
        tokio::spawn(async move { second.resolve(id, &actor("bob")).await }),
    );
    let outcomes = [one??, two??];

    let applied = outcomes.iter().filter(|outcome| outcome.is_applied()).count();
    eyre::ensure!(applied == 1, "expected one resolve to apply: {outcomes:?}");
    eyre::ensure!(
        outcomes.contains(&TransitionOutcome::NotResolvable),
        "loser should report not resolvable: {outcomes:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reopens_produce_one_winner(engine: Engine) -> Result<(), eyre::Report> {
    let item = engine
        .service
        .create_item(request(ItemKind::Feature, "Reconsidered"))
        .await?;
    let resolved = engine.service.resolve(item.id(), &actor("alice")).await?;
    eyre::ensure!(resolved.is_applied(), "resolve should apply");
    let first = engine.service.clone();
    let second = engine.service.clone();
    let id = item.id();

    let (one, two) = tokio::join!(
        tokio::spawn(async move { first.reopen(id, &actor("bob")).await }),
        tokio::spawn(async move { second.reopen(id, &actor("carol")).await }),
    );
    let outcomes = [one??, two??];

    let applied = outcomes.iter().filter(|outcome| outcome.is_applied()).count();
    eyre::ensure!(applied == 1, "expected one reopen to apply: {outcomes:?}");
    eyre::ensure!(
        outcomes.contains(&TransitionOutcome::NotReopenable),
        "loser should report not reopenable: {outcomes:?}"
    );
    let stored = engine
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(|| eyre::eyre!("item vanished"))?;
    eyre::ensure!(stored.status() == ItemStatus::Open, "item should be open");
    eyre::ensure!(
        stored.reopen_log().len() == 1,
        "expected one reopen entry, got {}",
        stored.reopen_log().len()
    );
    eyre::ensure!(
        !engine.service.timers().is_armed(id),
        "cleanup timer should be cancelled"
    );
    Ok(())
}
