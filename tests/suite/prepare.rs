//! Server-side preparation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future;
use serde_json::json;

use kindle_engine::{
    ComponentRegistry, InitAction, InitConfigBuilder, InitError, InitOutcome, InitRoutine,
    PrepareKey, Preparable, RootAction, init_status, prepare_component, prepare_components,
};

use crate::common::{AppStore, Isomorphic, counting_routine, props, resolving_routine, wrap};

fn init_actions(actions: Vec<RootAction<()>>) -> Vec<InitAction> {
    actions
        .into_iter()
        .filter_map(|action| match action {
            RootAction::Init(init) => Some(init),
            RootAction::App(()) => None,
        })
        .collect()
}

#[tokio::test]
async fn slow_routine_marks_pending_then_complete() {
    let env = Isomorphic::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let post = wrap(
        InitConfigBuilder::new()
            .init_props(["id"])
            .init_action(counting_routine(&calls, 40)),
        "Post",
        &mut ComponentRegistry::new(),
    );

    let task = prepare_component(&env.server, &post, &props(json!({ "id": 1 }))).unwrap();
    let key = PrepareKey::from("Post[1]");
    assert_eq!(env.server.snapshot().init.prepared_status(&key), Some(false));

    task.await.unwrap();
    assert_eq!(env.server.snapshot().init.prepared_status(&key), Some(true));
    assert_eq!(
        init_actions(env.server.dispatched()),
        vec![
            init_status("Post[1]", false, true),
            init_status("Post[1]", true, true)
        ]
    );
}

#[tokio::test]
async fn preparing_twice_runs_once() {
    let env = Isomorphic::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let post = wrap(
        InitConfigBuilder::new()
            .init_props(["id"])
            .init_action(counting_routine(&calls, 0)),
        "Post",
        &mut ComponentRegistry::new(),
    );
    let page = props(json!({ "id": 1 }));

    prepare_component(&env.server, &post, &page).unwrap().await.unwrap();
    env.server.clear_dispatched();
    let again = prepare_component(&env.server, &post, &page).unwrap().await.unwrap();

    assert_eq!(again, InitOutcome::Skipped);
    assert!(env.server.dispatched().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn different_props_prepare_separately() {
    let env = Isomorphic::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let post = wrap(
        InitConfigBuilder::new()
            .init_props(["id"])
            .init_action(counting_routine(&calls, 5)),
        "Post",
        &mut ComponentRegistry::new(),
    );

    let first = prepare_component(&env.server, &post, &props(json!({ "id": 1 }))).unwrap();
    let second = prepare_component(&env.server, &post, &props(json!({ "id": 2 }))).unwrap();
    future::try_join(first, second).await.unwrap();

    let state = env.server.snapshot().init;
    assert_eq!(state.prepared().len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn prepare_components_resolves_in_component_order() {
    let env = Isomorphic::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ComponentRegistry::new();
    let slow = wrap(
        InitConfigBuilder::new().init_action(counting_routine(&calls, 30)),
        "Slow",
        &mut registry,
    );
    let fast = wrap(
        InitConfigBuilder::new().init_action(counting_routine(&calls, 0)),
        "Fast",
        &mut registry,
    );

    let components: [&dyn Preparable<AppStore>; 2] = [&slow, &fast];
    let outcomes = prepare_components(&env.server, &components, &props(json!({ "x": 1 })))
        .unwrap()
        .await
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            InitOutcome::Prepared(json!({})),
            InitOutcome::Prepared(json!({}))
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn missing_init_prop_fails_before_anything_runs() {
    let env = Isomorphic::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ComponentRegistry::new();
    let ok = wrap(
        InitConfigBuilder::new().init_action(counting_routine(&calls, 0)),
        "Ok",
        &mut registry,
    );
    let needs_id = wrap(
        InitConfigBuilder::new()
            .init_props(["id"])
            .init_action(resolving_routine()),
        "NeedsId",
        &mut registry,
    );

    let components: [&dyn Preparable<AppStore>; 2] = [&ok, &needs_id];
    let err = prepare_components(&env.server, &components, &props(json!({})))
        .err()
        .unwrap();

    assert!(matches!(
        err,
        InitError::MissingInitProp { ref component_id, ref prop }
            if component_id == "NeedsId" && prop == "id"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(env.server.dispatched().is_empty());
}

#[tokio::test]
async fn batch_can_be_retried_after_a_missing_prop() {
    let env = Isomorphic::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ComponentRegistry::new();
    let header = wrap(
        InitConfigBuilder::new().init_action(counting_routine(&calls, 0)),
        "Header",
        &mut registry,
    );
    let post = wrap(
        InitConfigBuilder::new()
            .init_props(["id"])
            .init_action(counting_routine(&calls, 0)),
        "Post",
        &mut registry,
    );
    let components: [&dyn Preparable<AppStore>; 2] = [&header, &post];

    assert!(prepare_components(&env.server, &components, &props(json!({}))).is_err());
    prepare_components(&env.server, &components, &props(json!({ "id": 2 })))
        .unwrap()
        .await
        .unwrap();

    let state = env.server.snapshot().init;
    assert_eq!(state.prepared_status(&PrepareKey::from("Header[]")), Some(true));
    assert_eq!(state.prepared_status(&PrepareKey::from("Post[2]")), Some(true));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn on_error_swallows_failures_during_preparation() {
    let env = Isomorphic::new();
    let handled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&handled);
    let broken = wrap(
        InitConfigBuilder::new()
            .init_action(InitRoutine::from_async(|_, _| async {
                Err(anyhow::anyhow!("timeout"))
            }))
            .on_error(move |err| {
                assert!(err.routine_failure().is_some());
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        "Broken",
        &mut ComponentRegistry::new(),
    );

    let outcome = prepare_component(&env.server, &broken, &props(json!({})))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome, InitOutcome::ErrorHandled);
    assert_eq!(handled.load(Ordering::SeqCst), 1);
    assert_eq!(
        env.server
            .snapshot()
            .init
            .prepared_status(&PrepareKey::from("Broken[]")),
        Some(true)
    );
}
