//! Configuration and validation errors.
//!
//! Configuration errors are raised while wrapping a component. Validation
//! errors are raised when a component mounts in prepare mode without having
//! been prepared for its current props; they carry a machine-readable
//! category and metadata so tooling can link to documentation.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::text::truncate_meta;
use crate::values::Props;

/// Relative location of the generated error documentation pages.
pub const ERROR_DOCS_PATH: &str = "docs/errors/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a wrapped component requires a non-empty component id or name")]
    MissingComponentId,
    #[error(
        "invalid init action for \"{component_id}\": a split action needs a `prepared` or a `client_only` routine"
    )]
    MalformedInitAction { component_id: String },
    #[error(
        "each component passed to attach_init() needs a unique id; found duplicate \"{component_id}\""
    )]
    DuplicateComponentId { component_id: String },
}

/// Machine-readable validation error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Mounted in prepare mode; never prepared and the component has no init props.
    PrepareComponentNotCalled,
    /// Mounted in prepare mode; never prepared with the current init props.
    PrepareComponentNotCalledWithProps,
    /// Preparation started for the current props but has not completed.
    PreparationNotCompleted,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 3] = [
        ErrorCategory::PrepareComponentNotCalled,
        ErrorCategory::PrepareComponentNotCalledWithProps,
        ErrorCategory::PreparationNotCompleted,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::PrepareComponentNotCalled => "prepare-component-not-called",
            ErrorCategory::PrepareComponentNotCalledWithProps => {
                "prepare-component-not-called-with-props"
            }
            ErrorCategory::PreparationNotCompleted => "preparation-not-completed",
        }
    }

    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            ErrorCategory::PrepareComponentNotCalled => {
                "A component with an init action was rendered in prepare mode, but prepare_component() was never called for it."
            }
            ErrorCategory::PrepareComponentNotCalledWithProps => {
                "A component was rendered in prepare mode with init props that prepare_component() was not called with."
            }
            ErrorCategory::PreparationNotCompleted => {
                "A component was rendered in prepare mode while its preparation was still in flight. Await prepare_component() before rendering."
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured metadata attached to a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMeta {
    pub component: String,
    /// Serialized init props, truncated. Absent when the category has no props.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_props_object: Option<String>,
}

impl ErrorMeta {
    /// URL-form-encoded metadata, used as the fragment of the docs link.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("Component", &self.component);
        if let Some(props) = &self.init_props_object {
            serializer.append_pair("initPropsObject", props);
        }
        serializer.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}\nFor more information see: \n{docs_link}")]
pub struct PrepareValidationError {
    message: String,
    category: ErrorCategory,
    meta: ErrorMeta,
    docs_link: String,
}

impl PrepareValidationError {
    /// The component never had `prepare_component()` called for its current props.
    #[must_use]
    pub fn not_prepared(component_id: &str, init_props: &Props) -> Self {
        if init_props.is_empty() {
            return Self::build(
                format!(
                    "Expected component \"{component_id}\" to be prepared but prepare_component has not been called"
                ),
                ErrorCategory::PrepareComponentNotCalled,
                ErrorMeta {
                    component: component_id.to_string(),
                    init_props_object: None,
                },
            );
        }

        let props_json = props_json(init_props);
        Self::build(
            format!(
                "Expected component \"{component_id}\" to be prepared but prepare_component has not been called with props: {props_json}"
            ),
            ErrorCategory::PrepareComponentNotCalledWithProps,
            ErrorMeta {
                component: component_id.to_string(),
                init_props_object: Some(truncate_meta(&props_json)),
            },
        )
    }

    /// Preparation for the current props is still in flight.
    #[must_use]
    pub fn pending(component_id: &str, init_props: &Props) -> Self {
        let (message, props_string) = if init_props.is_empty() {
            (
                format!(
                    "Component \"{component_id}\" is preparing but preparation has not completed"
                ),
                "(no init props)".to_string(),
            )
        } else {
            let props_json = props_json(init_props);
            (
                format!(
                    "Component \"{component_id}\" is preparing for props {props_json} but preparation has not completed"
                ),
                truncate_meta(&props_json),
            )
        };

        Self::build(
            message,
            ErrorCategory::PreparationNotCompleted,
            ErrorMeta {
                component: component_id.to_string(),
                init_props_object: Some(props_string),
            },
        )
    }

    fn build(message: String, category: ErrorCategory, meta: ErrorMeta) -> Self {
        let docs_link = format!("{ERROR_DOCS_PATH}{category}.html#{}", meta.to_query());
        Self {
            message,
            category,
            meta,
            docs_link,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    #[must_use]
    pub fn meta(&self) -> &ErrorMeta {
        &self.meta
    }

    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.meta.component
    }

    #[must_use]
    pub fn docs_link(&self) -> &str {
        &self.docs_link
    }
}

fn props_json(props: &Props) -> String {
    Value::Object(props.clone()).to_string()
}
