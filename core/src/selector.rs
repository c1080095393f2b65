//! Derived per-instance init state.
//!
//! For a component and its current props the selector derives the init
//! values, the prepare key and both completion statuses. Work is memoized in
//! two stages so an unchanged input yields the very same `Arc`:
//!
//! 1. init values (element-wise equality) -> prepare key + shared values
//! 2. (stage-one output identity, prepared status, self-init status) -> state

use std::sync::Arc;

use kindle_types::{GetPrepareKey, InitValues, PrepareKey, Props, extract_from_props};

use crate::memo::{MemoCache, shallow_slice_eq};
use crate::state::InitState;

/// Projection of the init state for one component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInitState {
    pub prepare_key: PrepareKey,
    pub init_values: Arc<InitValues>,
    /// Preparation was started for this key (possibly still in flight).
    pub is_prepared: bool,
    pub self_init_status: Option<bool>,
}

#[derive(Debug)]
struct KeyedValues {
    prepare_key: PrepareKey,
    init_values: Arc<InitValues>,
}

type StatusInput = (Arc<KeyedValues>, Option<bool>, Option<bool>);

fn status_input_eq(a: &StatusInput, b: &StatusInput) -> bool {
    Arc::ptr_eq(&a.0, &b.0) && a.1 == b.1 && a.2 == b.2
}

/// One selector per component instance.
#[derive(Debug)]
pub struct ComponentInitSelector {
    component_id: String,
    init_props: Vec<String>,
    get_prepare_key: GetPrepareKey,
    keyed: MemoCache<InitValues, KeyedValues>,
    state: MemoCache<StatusInput, ComponentInitState>,
}

impl ComponentInitSelector {
    #[must_use]
    pub fn new(
        component_id: impl Into<String>,
        init_props: Vec<String>,
        get_prepare_key: GetPrepareKey,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            init_props,
            get_prepare_key,
            keyed: MemoCache::new(shallow_slice_eq),
            state: MemoCache::new(status_input_eq),
        }
    }

    pub fn select(&mut self, init_state: &InitState, props: &Props) -> Arc<ComponentInitState> {
        let values = extract_from_props(props, &self.init_props);
        let component_id = &self.component_id;
        let get_prepare_key = self.get_prepare_key;
        let keyed = self.keyed.get_or_compute(values, |values| KeyedValues {
            prepare_key: get_prepare_key(component_id, values),
            init_values: Arc::new(values.clone()),
        });

        let prepared = init_state.prepared_status(&keyed.prepare_key);
        let self_init = init_state.self_init_status(&keyed.prepare_key);

        self.state
            .get_or_compute((keyed, prepared, self_init), |(keyed, prepared, self_init)| {
                ComponentInitState {
                    prepare_key: keyed.prepare_key.clone(),
                    init_values: Arc::clone(&keyed.init_values),
                    is_prepared: prepared.is_some(),
                    self_init_status: *self_init,
                }
            })
    }

    /// How many times the prepare key has been derived.
    #[must_use]
    pub fn key_derivations(&self) -> usize {
        self.keyed.recomputations()
    }
}
