//! Init state management for Kindle.
//!
//! This crate holds the state side of component initialization: the init
//! slice and its reducer, the [`Store`] seam with an in-memory implementation,
//! the memoized per-instance selector, and the component id registry.

mod memo;
mod registry;
mod selector;
mod state;
mod store;

pub use memo::{Equality, MemoCache, exact_eq, identity_eq, shallow_map_eq, shallow_slice_eq};
pub use registry::ComponentRegistry;
pub use selector::{ComponentInitSelector, ComponentInitState};
pub use state::{
    DEFAULT_SLICE, InitAction, InitSlice, InitState, Reducer, RootAction, RootState,
    default_init_state, init_status, set_mode,
};
pub use store::{MemoryStore, Store};
