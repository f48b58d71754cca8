//! When steps for tracked item lifecycle scenarios.

use super::world::{LifecycleWorld, actor, run_async};
use eyre::WrapErr;
use itemflow::tracking::services::CleanupOutcome;
use rstest_bdd_macros::when;

#[when(r#""{name}" claims the item"#)]
fn claims(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.item()?.id();
    let who = actor(&name)?;
    let outcome = run_async(world.service.claim(id, &who)).wrap_err("claim item")?;
    world.record(outcome);
    Ok(())
}

#[when(r#""{first}" and "{second}" claim the item at the same time"#)]
fn claim_simultaneously(
    world: &mut LifecycleWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let id = world.item()?.id();
    let (one_actor, two_actor) = (actor(&first)?, actor(&second)?);
    let service = &world.service;
    let (one, two) = run_async(async {
        tokio::join!(service.claim(id, &one_actor), service.claim(id, &two_actor))
    });
    world.claim_outcomes = vec![one.wrap_err("first claim")?, two.wrap_err("second claim")?];
    Ok(())
}

#[when(r#""{name}" resolves the item"#)]
fn resolves(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.item()?.id();
    let who = actor(&name)?;
    let outcome = run_async(world.service.resolve(id, &who)).wrap_err("resolve item")?;
    world.record(outcome);
    Ok(())
}

#[when(r#""{name}" rejects the item"#)]
fn rejects(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.item()?.id();
    let who = actor(&name)?;
    let outcome = run_async(world.service.reject(id, &who)).wrap_err("reject item")?;
    world.record(outcome);
    Ok(())
}

#[when(r#""{name}" reopens the item"#)]
fn reopens(world: &mut LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.item()?.id();
    let who = actor(&name)?;
    let outcome = run_async(world.service.reopen(id, &who)).wrap_err("reopen item")?;
    world.record(outcome);
    Ok(())
}

#[when("the cleanup timer fires")]
fn cleanup_fires(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let item = world.item()?;
    let (id, status) = (item.id(), item.status());
    eyre::ensure!(
        world.service.timers().cancel(id),
        "no cleanup timer was armed"
    );
    let outcome =
        run_async(world.service.run_cleanup(id, status)).wrap_err("run cleanup")?;
    let CleanupOutcome::Cleaned(cleaned) = outcome else {
        eyre::bail!("cleanup did not run: {outcome:?}");
    };
    world.item = Some(cleaned);
    Ok(())
}
