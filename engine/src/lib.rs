//! Init engine for Kindle - orchestration and component wrapping.
//!
//! This crate decides when component init routines run, drives them, and
//! records their progress in the init state. The state itself lives in
//! `kindle-core`; this crate only reads it and dispatches actions.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::module_name_repetitions)] // InitConfig in config, InitError in error

mod config;
mod error;
mod orchestrator;
mod prepare;
mod wrapper;

pub use config::{
    DefaultsError, ErrorHandler, GetInitState, InitActionSpec, InitConfig, InitConfigBuilder,
    InitContext, InitDefaults, InitFuture, InitOptions, InitRoutine, RoutineReturn, RoutineSlot,
};
pub use error::InitError;
pub use orchestrator::{InitOutcome, InitTask, init_component};
pub use prepare::{PrepareAll, Preparable, prepare_component, prepare_components};
pub use wrapper::{
    Component, IS_INITIALIZING_PROP, InitInstance, InstancePhase, WithInit, attach_init,
};

// Re-export from crates for public API
pub use kindle_core::{
    ComponentInitSelector, ComponentInitState, ComponentRegistry, DEFAULT_SLICE, InitAction,
    InitSlice, InitState, MemoryStore, Reducer, RootAction, RootState, Store, init_status,
    set_mode,
};
pub use kindle_types::{
    Caller, ConfigError, ErrorCategory, ErrorMeta, InitMode, InitSelfPolicy, PrepareKey,
    PrepareValidationError, Props, derive_prepare_key,
};
