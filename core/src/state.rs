//! The init state slice and its reducer.
//!
//! The slice tracks the current [`InitMode`] and two independent completion
//! tracks keyed by [`PrepareKey`]: `prepared` (server-driven preparation) and
//! `self_init` (client-driven initialization). For either track a key that is
//! absent was never started, `false` is in flight and `true` is done.
//! The slice only changes through [`InitState::reduce`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kindle_types::{InitMode, PrepareKey};

/// Name of the root-state slice the init state lives under by default.
pub const DEFAULT_SLICE: &str = "init";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitState {
    mode: InitMode,
    #[serde(default)]
    prepared: BTreeMap<PrepareKey, bool>,
    #[serde(default)]
    self_init: BTreeMap<PrepareKey, bool>,
}

impl InitState {
    #[must_use]
    pub fn new(mode: InitMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Apply an `InitStatus` action to a fresh state. Used to build fixtures.
    #[must_use]
    pub fn with_status(
        mut self,
        prepare_key: impl Into<PrepareKey>,
        complete: bool,
        is_prepare: bool,
    ) -> Self {
        self.reduce(&init_status(prepare_key, complete, is_prepare));
        self
    }

    #[must_use]
    pub fn mode(&self) -> InitMode {
        self.mode
    }

    #[must_use]
    pub fn prepared_status(&self, key: &PrepareKey) -> Option<bool> {
        self.prepared.get(key).copied()
    }

    #[must_use]
    pub fn self_init_status(&self, key: &PrepareKey) -> Option<bool> {
        self.self_init.get(key).copied()
    }

    /// Preparation was started for `key`, whether or not it has completed.
    #[must_use]
    pub fn is_prepared(&self, key: &PrepareKey) -> bool {
        self.prepared.contains_key(key)
    }

    #[must_use]
    pub fn prepared(&self) -> &BTreeMap<PrepareKey, bool> {
        &self.prepared
    }

    #[must_use]
    pub fn self_init(&self) -> &BTreeMap<PrepareKey, bool> {
        &self.self_init
    }

    pub fn reduce(&mut self, action: &InitAction) {
        match action {
            InitAction::SetMode(mode) => self.mode = *mode,
            InitAction::InitStatus {
                prepare_key,
                complete,
                is_prepare,
            } => {
                let track = if *is_prepare {
                    &mut self.prepared
                } else {
                    &mut self.self_init
                };
                track.insert(prepare_key.clone(), *complete);
            }
        }
    }
}

/// Actions understood by the init reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum InitAction {
    #[serde(rename = "@@kindle/SET_INIT_MODE")]
    SetMode(InitMode),
    #[serde(rename = "@@kindle/INIT_COMPONENT", rename_all = "camelCase")]
    InitStatus {
        prepare_key: PrepareKey,
        complete: bool,
        is_prepare: bool,
    },
}

/// Action creator switching the mode the init system operates in.
#[must_use]
pub fn set_mode(mode: InitMode) -> InitAction {
    InitAction::SetMode(mode)
}

#[must_use]
pub fn init_status(
    prepare_key: impl Into<PrepareKey>,
    complete: bool,
    is_prepare: bool,
) -> InitAction {
    InitAction::InitStatus {
        prepare_key: prepare_key.into(),
        complete,
        is_prepare,
    }
}

// ============================================================================
// Slice composition
// ============================================================================

/// A state tree that can be updated by actions of type `A`.
pub trait Reducer<A> {
    fn reduce(&mut self, action: &A);
}

impl Reducer<InitAction> for InitState {
    fn reduce(&mut self, action: &InitAction) {
        InitState::reduce(self, action);
    }
}

/// Application state without a slice of its own ignores every action.
impl<A> Reducer<A> for () {
    fn reduce(&mut self, _action: &A) {}
}

/// Locates the init slice inside a state tree.
pub trait InitSlice {
    fn init_slice(&self) -> Option<&InitState>;
}

impl InitSlice for InitState {
    fn init_slice(&self) -> Option<&InitState> {
        Some(self)
    }
}

/// The default `get_init_state` accessor: the slice named [`DEFAULT_SLICE`].
pub fn default_init_state<S: InitSlice>(state: &S) -> Option<&InitState> {
    state.init_slice()
}

/// Root state composed of the init slice and the application's own state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RootState<T> {
    pub init: InitState,
    pub app: T,
}

impl<T> RootState<T> {
    pub fn new(init: InitState, app: T) -> Self {
        Self { init, app }
    }
}

impl<T> InitSlice for RootState<T> {
    fn init_slice(&self) -> Option<&InitState> {
        Some(&self.init)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RootAction<A> {
    Init(InitAction),
    App(A),
}

impl<A> From<InitAction> for RootAction<A> {
    fn from(action: InitAction) -> Self {
        RootAction::Init(action)
    }
}

impl<T: Reducer<A>, A> Reducer<RootAction<A>> for RootState<T> {
    fn reduce(&mut self, action: &RootAction<A>) {
        match action {
            RootAction::Init(init) => self.init.reduce(init),
            RootAction::App(app) => self.app.reduce(app),
        }
    }
}
