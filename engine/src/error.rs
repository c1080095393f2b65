//! Errors surfaced by the orchestrator, the prepare helpers and the wrapper.

use thiserror::Error;

use kindle_types::{ConfigError, PrepareValidationError};

use crate::config::RoutineSlot;

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] PrepareValidationError),

    /// An init routine did not hand back a future. Never passed to `on_error`.
    #[error(
        "expected {slot} to return a future, returned {returned} instead; check the init action for \"{component_id}\""
    )]
    InvalidReturn {
        component_id: String,
        slot: RoutineSlot,
        returned: &'static str,
    },

    #[error("could not find init state; did you attach the init reducer?")]
    MissingInitState,

    #[error(
        "component \"{component_id}\" expected prop \"{prop}\" but it was not passed to prepare_component"
    )]
    MissingInitProp { component_id: String, prop: String },

    /// An init routine failed.
    #[error("init action for \"{component_id}\" failed: {source}")]
    Routine {
        component_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl InitError {
    #[must_use]
    pub fn is_invalid_return(&self) -> bool {
        matches!(self, InitError::InvalidReturn { .. })
    }

    /// The error an init routine failed with, if that is what happened.
    #[must_use]
    pub fn routine_failure(&self) -> Option<&anyhow::Error> {
        match self {
            InitError::Routine { source, .. } => Some(source),
            _ => None,
        }
    }

    #[must_use]
    pub fn validation(&self) -> Option<&PrepareValidationError> {
        match self {
            InitError::Validation(err) => Some(err),
            _ => None,
        }
    }
}
