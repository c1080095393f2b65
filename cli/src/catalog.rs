//! Validation error catalog.

use serde_json::json;

use kindle_engine::{ErrorCategory, PrepareValidationError, Props};

const EXAMPLE_COMPONENT: &str = "PostPage";

fn example(category: ErrorCategory) -> PrepareValidationError {
    let mut props = Props::new();
    props.insert("post".to_string(), json!({ "id": 1 }));

    match category {
        ErrorCategory::PrepareComponentNotCalled => {
            PrepareValidationError::not_prepared(EXAMPLE_COMPONENT, &Props::new())
        }
        ErrorCategory::PrepareComponentNotCalledWithProps => {
            PrepareValidationError::not_prepared(EXAMPLE_COMPONENT, &props)
        }
        ErrorCategory::PreparationNotCompleted => {
            PrepareValidationError::pending(EXAMPLE_COMPONENT, &props)
        }
    }
}

pub(crate) fn print() {
    for category in ErrorCategory::ALL {
        println!("{category}");
        println!("  {}", category.summary());
        println!();
        for line in example(category).to_string().lines() {
            println!("    {line}");
        }
        println!();
    }
}
