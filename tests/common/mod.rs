//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests, including an isomorphic
//! harness: a server store whose state is serialized and used as the initial
//! state of a client store.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use kindle_engine::{
    Component, ComponentRegistry, InitConfigBuilder, InitMode, InitRoutine, MemoryStore, Props,
    RootAction, RootState, Store, WithInit, attach_init, set_mode,
};

/// Root state with the init slice and no application state.
pub type AppState = RootState<()>;
pub type AppStore = MemoryStore<AppState, RootAction<()>>;

/// Renders to the props it receives.
pub struct Echo(pub &'static str);

impl Component for Echo {
    type Output = Props;

    fn name(&self) -> &str {
        self.0
    }

    fn render(&self, props: &Props) -> Props {
        props.clone()
    }
}

pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        other => panic!("props fixture must be an object, got {other}"),
    }
}

/// A routine that counts its calls, waits `delay_ms` and resolves with its
/// init props.
pub fn counting_routine(calls: &Arc<AtomicUsize>, delay_ms: u64) -> InitRoutine<AppStore> {
    let calls = Arc::clone(calls);
    InitRoutine::from_async(move |props, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(Value::Object(props))
        }
    })
}

pub fn resolving_routine() -> InitRoutine<AppStore> {
    InitRoutine::from_async(|_, _| async { Ok(json!(null)) })
}

pub fn wrap(
    builder: InitConfigBuilder<AppStore>,
    name: &'static str,
    registry: &mut ComponentRegistry,
) -> WithInit<Echo, AppStore> {
    attach_init(builder, Echo(name), registry).unwrap()
}

/// A server store and, after [`Isomorphic::hydrate`], the client store built
/// from its serialized state.
pub struct Isomorphic {
    pub server: Arc<AppStore>,
}

impl Isomorphic {
    pub fn new() -> Self {
        Self {
            server: Arc::new(MemoryStore::recording(AppState::default())),
        }
    }

    /// The server state as it would be embedded in the page.
    pub fn transfer(&self) -> String {
        serde_json::to_string(&self.server.snapshot()).unwrap()
    }

    /// A client store initialized from the transferred server state.
    pub fn hydrate(&self) -> Arc<AppStore> {
        let state: AppState = serde_json::from_str(&self.transfer()).unwrap();
        Arc::new(MemoryStore::recording(state))
    }
}

/// Switch a client store to self-init after its first render.
pub fn enter_self_init(store: &AppStore) {
    store.dispatch(set_mode(InitMode::SelfInit).into());
}
