//! Core domain types for Kindle.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! prop-path extraction, prepare-key derivation, the operating modes, and the
//! configuration/validation error taxonomy.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod errors;
mod key;
mod text;
mod values;

pub use errors::{ConfigError, ERROR_DOCS_PATH, ErrorCategory, ErrorMeta, PrepareValidationError};
pub use key::{GetPrepareKey, PrepareKey, canonicalize, derive_prepare_key};
pub use text::{META_PREVIEW_CHARS, truncate_meta};
pub use values::{
    InitValues, Props, build_values_object, extract_from_props, extract_values_for_props,
};

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Modes
// ============================================================================

/// The mode the whole init system operates in.
///
/// `Prepare` is the server pass (and the client's first, hydrating render):
/// components must have been prepared before they mount. `SelfInit` is the
/// client after its first render: components initialize themselves on mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InitMode {
    #[default]
    #[serde(rename = "MODE_PREPARE")]
    Prepare,
    #[serde(rename = "MODE_INIT_SELF")]
    SelfInit,
}

impl InitMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InitMode::Prepare => "MODE_PREPARE",
            InitMode::SelfInit => "MODE_INIT_SELF",
        }
    }
}

impl fmt::Display for InitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side behavior while a component initializes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InitSelfPolicy {
    /// Render immediately with `isInitializing` set while pending.
    #[default]
    Async,
    /// Do not render until the first initialization completes; stay rendered
    /// during reinitialization.
    Blocking,
    /// Like `Blocking`, but also hide the component during reinitialization.
    Unmount,
    /// Only initialize during preparation; skip self-initialization entirely.
    Never,
}

impl InitSelfPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InitSelfPolicy::Async => "ASYNC",
            InitSelfPolicy::Blocking => "BLOCKING",
            InitSelfPolicy::Unmount => "UNMOUNT",
            InitSelfPolicy::Never => "NEVER",
        }
    }
}

impl fmt::Display for InitSelfPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lifecycle point asked for initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    /// `prepare_component()` during the preparation pass.
    Prepare,
    /// First client activation of a mounted instance.
    DidMount,
    /// A change of init props on an already mounted instance.
    DidUpdate,
}

impl Caller {
    #[must_use]
    pub fn is_prepare(self) -> bool {
        matches!(self, Caller::Prepare)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Caller::Prepare => "prepare",
            Caller::DidMount => "didMount",
            Caller::DidUpdate => "didUpdate",
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
