//! Init state slice, actions and their serialized forms

use serde_json::json;

use kindle_core::{InitAction, InitState, RootAction, RootState, init_status, set_mode};
use kindle_engine::{InitMode, MemoryStore, Store};

use crate::common::{AppState, AppStore};

#[test]
fn actions_serialize_with_type_and_payload() {
    assert_eq!(
        serde_json::to_value(init_status("Post[1]", false, true)).unwrap(),
        json!({
            "type": "@@kindle/INIT_COMPONENT",
            "payload": { "prepareKey": "Post[1]", "complete": false, "isPrepare": true }
        })
    );
    assert_eq!(
        serde_json::to_value(set_mode(InitMode::SelfInit)).unwrap(),
        json!({ "type": "@@kindle/SET_INIT_MODE", "payload": "MODE_INIT_SELF" })
    );
}

#[test]
fn actions_deserialize_from_wire_form() {
    let action: InitAction = serde_json::from_value(json!({
        "type": "@@kindle/INIT_COMPONENT",
        "payload": { "prepareKey": "A[]", "complete": true, "isPrepare": false }
    }))
    .unwrap();
    assert_eq!(action, init_status("A[]", true, false));
}

#[test]
fn root_state_serializes_init_slice() {
    let store = AppStore::new(AppState::default());
    store.dispatch(init_status("Post[1]", true, true).into());
    store.dispatch(init_status("Nav[]", false, false).into());

    assert_eq!(
        serde_json::to_value(store.snapshot()).unwrap(),
        json!({
            "init": {
                "mode": "MODE_PREPARE",
                "prepared": { "Post[1]": true },
                "selfInit": { "Nav[]": false }
            },
            "app": null
        })
    );
}

#[test]
fn transferred_state_round_trips() {
    let state = InitState::new(InitMode::Prepare)
        .with_status("A[]", true, true)
        .with_status("B[1]", false, false);
    let json = serde_json::to_string(&state).unwrap();
    assert_eq!(serde_json::from_str::<InitState>(&json).unwrap(), state);
}

#[test]
fn missing_maps_default_to_empty() {
    let state: InitState = serde_json::from_value(json!({ "mode": "MODE_INIT_SELF" })).unwrap();
    assert_eq!(state.mode(), InitMode::SelfInit);
    assert!(state.prepared().is_empty());
    assert!(state.self_init().is_empty());
}

#[derive(Debug, Default)]
struct Counter(u32);

impl kindle_core::Reducer<u32> for Counter {
    fn reduce(&mut self, action: &u32) {
        self.0 += action;
    }
}

#[tokio::test]
async fn subscribers_see_every_dispatch() {
    let store: MemoryStore<RootState<Counter>, RootAction<u32>> =
        MemoryStore::new(RootState::default());
    let mut changes = store.subscribe();

    store.dispatch(RootAction::App(2));
    store.dispatch(set_mode(InitMode::SelfInit).into());

    changes.changed().await.unwrap();
    assert_eq!(*changes.borrow_and_update(), 2);
    assert_eq!(store.with_state(|s| s.app.0), 2);
    assert_eq!(store.with_state(|s| s.init.mode()), InitMode::SelfInit);
}
