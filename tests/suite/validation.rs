//! Mount-time validation errors

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use serde_json::json;

use kindle_engine::{ComponentRegistry, ErrorCategory, InitConfigBuilder, prepare_component};

use crate::common::{Isomorphic, counting_routine, props, resolving_routine, wrap};

#[test]
fn never_prepared_without_init_props() {
    let env = Isomorphic::new();
    let nav = wrap(
        InitConfigBuilder::new().init_action(resolving_routine()),
        "Nav",
        &mut ComponentRegistry::new(),
    );
    let mut instance = nav.instance(&env.server, props(json!({}))).unwrap();
    let err = instance.on_first_render().err().unwrap();
    let validation = err.validation().unwrap();

    assert_eq!(validation.category(), ErrorCategory::PrepareComponentNotCalled);
    assert_eq!(validation.component_id(), "Nav");
    assert_eq!(validation.meta().init_props_object, None);
    assert!(
        validation
            .docs_link()
            .ends_with("prepare-component-not-called.html#Component=Nav")
    );
    assert!(err.to_string().contains("For more information see"));
}

#[test]
fn long_props_are_truncated_in_metadata() {
    let env = Isomorphic::new();
    let search = wrap(
        InitConfigBuilder::new()
            .init_props(["query"])
            .init_action(resolving_routine()),
        "Search",
        &mut ComponentRegistry::new(),
    );
    let query = "x".repeat(200);
    let mut instance = search
        .instance(&env.server, props(json!({ "query": query })))
        .unwrap();
    let err = instance.on_first_render().err().unwrap();
    let validation = err.validation().unwrap();

    assert_eq!(
        validation.category(),
        ErrorCategory::PrepareComponentNotCalledWithProps
    );
    let meta = validation.meta().init_props_object.clone().unwrap();
    assert_eq!(meta.chars().count(), 103);
    assert!(meta.starts_with(r#"{"query":"xxx"#));
    assert!(meta.ends_with("..."));
    assert!(validation.message().contains(&query));
}

#[tokio::test]
async fn mounting_during_preparation_reports_pending() {
    let env = Isomorphic::new();
    let post = wrap(
        InitConfigBuilder::new()
            .init_props(["id"])
            .init_action(counting_routine(&Arc::new(AtomicUsize::new(0)), 40)),
        "Post",
        &mut ComponentRegistry::new(),
    );
    let page = props(json!({ "id": 4 }));

    let task = prepare_component(&env.server, &post, &page).unwrap();
    let mut instance = post.instance(&env.server, page).unwrap();
    let err = instance.on_first_render().err().unwrap();
    let validation = err.validation().unwrap();
    assert_eq!(validation.category(), ErrorCategory::PreparationNotCompleted);
    assert_eq!(
        validation.meta().init_props_object.as_deref(),
        Some(r#"{"id":4}"#)
    );

    task.await.unwrap();
    instance.on_store_change().unwrap();
    assert!(instance.on_first_render().is_ok());
}

#[test]
fn pending_without_init_props_says_so() {
    let env = Isomorphic::new();
    let nav = wrap(
        InitConfigBuilder::new().init_action(resolving_routine()),
        "Nav",
        &mut ComponentRegistry::new(),
    );
    let _task = prepare_component(&env.server, &nav, &props(json!({}))).unwrap();

    let mut instance = nav.instance(&env.server, props(json!({}))).unwrap();
    let err = instance.on_first_render().err().unwrap();
    assert_eq!(
        err.validation()
            .and_then(|v| v.meta().init_props_object.clone())
            .as_deref(),
        Some("(no init props)")
    );
}
