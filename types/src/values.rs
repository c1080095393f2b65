//! Prop-path extraction.
//!
//! Components declare the props relevant to initialization as a list of
//! paths. A path without a `.` names a top-level prop; `"foo.bar"` names the
//! `bar` member of the `foo` prop. Missing data never fails: the slot for
//! that path is simply `None`.

use serde_json::{Map, Value};

/// A props object as passed to a component.
pub type Props = Map<String, Value>;

/// One extracted slot per declared prop path. `None` means the prop was absent.
pub type InitValues = Vec<Option<Value>>;

const PATH_SEPARATOR: char = '.';

/// Extract the value for each path in `paths` from `target`, in order.
#[must_use]
pub fn extract_values_for_props<S: AsRef<str>>(target: &Value, paths: &[S]) -> InitValues {
    paths
        .iter()
        .map(|path| lookup_path(target, path.as_ref()).cloned())
        .collect()
}

/// Same as [`extract_values_for_props`] for a bare props map.
#[must_use]
pub fn extract_from_props<S: AsRef<str>>(props: &Props, paths: &[S]) -> InitValues {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            match path.split_once(PATH_SEPARATOR) {
                None => props.get(path).cloned(),
                Some((head, rest)) => props
                    .get(head)
                    .and_then(|value| lookup_path(value, rest))
                    .cloned(),
            }
        })
        .collect()
}

fn lookup_path<'a>(target: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(target, |current, segment| step(current, segment))
}

/// One level of descent. Only objects and arrays can be traversed; `null` and
/// scalars stop the walk.
fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

/// Build a (possibly nested) object from parallel path and value lists.
///
/// Dotted paths create intermediate objects, merging with siblings that share
/// a prefix. A `None` value still creates its intermediates but stores no leaf.
#[must_use]
pub fn build_values_object<S: AsRef<str>>(paths: &[S], values: &[Option<Value>]) -> Props {
    let mut result = Props::new();
    for (index, path) in paths.iter().enumerate() {
        let value = values.get(index).cloned().flatten();
        insert_path(&mut result, path.as_ref(), value);
    }
    result
}

fn insert_path(root: &mut Props, path: &str, value: Option<Value>) {
    let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut target = root;
    for segment in segments {
        let slot = target
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Props::new()));
        if !slot.is_object() {
            *slot = Value::Object(Props::new());
        }
        target = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }

    if let Some(value) = value {
        target.insert(leaf.to_string(), value);
    }
}
