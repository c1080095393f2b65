//! The seam to the state container.
//!
//! The orchestrator never touches state directly: it reads through
//! [`Store::with_state`] and changes things by dispatching actions. Any state
//! container can sit behind this trait; [`MemoryStore`] is the in-process one
//! used by the binary and the tests.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::state::{InitAction, Reducer};

pub trait Store: Send + Sync + 'static {
    /// The root state tree.
    type State;
    /// The root action type. Init actions must convert into it.
    type Action: From<InitAction> + Send + 'static;

    fn dispatch(&self, action: Self::Action);

    /// Read the current state. `read` must not dispatch.
    fn with_state<R>(&self, read: impl FnOnce(&Self::State) -> R) -> R;
}

/// A synchronous, in-memory state container.
///
/// Every dispatch runs the reducer under a lock and bumps a version counter
/// that subscribers observe through a `watch` channel. A recording store also
/// keeps every dispatched action, in order.
#[derive(Debug)]
pub struct MemoryStore<S, A> {
    state: Mutex<S>,
    log: Option<Mutex<Vec<A>>>,
    version: watch::Sender<u64>,
}

impl<S, A> MemoryStore<S, A>
where
    S: Reducer<A>,
{
    pub fn new(initial: S) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: Mutex::new(initial),
            log: None,
            version,
        }
    }

    /// A store that remembers every dispatched action.
    pub fn recording(initial: S) -> Self {
        Self {
            log: Some(Mutex::new(Vec::new())),
            ..Self::new(initial)
        }
    }

    /// Receives the store version after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Actions dispatched so far. Empty unless the store is recording.
    pub fn dispatched(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.log.as_ref().map_or_else(Vec::new, |log| {
            log.lock().unwrap_or_else(PoisonError::into_inner).clone()
        })
    }

    pub fn clear_dispatched(&self) {
        if let Some(log) = &self.log {
            log.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    fn apply(&self, action: A) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reduce(&action);
        if let Some(log) = &self.log {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(action);
        }
        self.version.send_modify(|version| *version = version.wrapping_add(1));
    }
}

impl<S, A> Store for MemoryStore<S, A>
where
    S: Reducer<A> + Send + 'static,
    A: From<InitAction> + Send + 'static,
{
    type State = S;
    type Action = A;

    fn dispatch(&self, action: A) {
        self.apply(action);
    }

    fn with_state<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        read(&state)
    }
}
