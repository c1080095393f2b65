//! Prop extraction and prepare key derivation

use serde_json::json;

use kindle_types::{
    build_values_object, derive_prepare_key, extract_from_props, extract_values_for_props,
};

use crate::common::props;

#[test]
fn key_for_component_without_init_props() {
    assert_eq!(derive_prepare_key("Foo", &[]).as_str(), "Foo[]");
}

#[test]
fn key_ignores_object_member_order() {
    let a = derive_prepare_key("Foo", &[Some(json!({ "b": 1, "a": { "d": 2, "c": 3 } }))]);
    let b = derive_prepare_key("Foo", &[Some(json!({ "a": { "c": 3, "d": 2 }, "b": 1 }))]);
    assert_eq!(a, b);
    assert_eq!(a.as_str(), r#"Foo[{"a":{"c":3,"d":2},"b":1}]"#);
}

#[test]
fn key_respects_array_order_and_missing_slots() {
    let a = derive_prepare_key("Foo", &[Some(json!([1, 2])), None]);
    let b = derive_prepare_key("Foo", &[Some(json!([2, 1])), None]);
    assert_ne!(a, b);
    assert_eq!(a.as_str(), "Foo[[1,2],null]");
}

#[test]
fn extraction_walks_objects_and_arrays() {
    let target = json!({
        "user": { "id": 7, "tags": ["x", "y"] },
        "page": null,
    });
    assert_eq!(
        extract_values_for_props(&target, &["user.id", "user.tags.1", "page.number", "nope"]),
        vec![Some(json!(7)), Some(json!("y")), None, None]
    );
}

#[test]
fn extraction_from_props_matches_value_extraction() {
    let raw = json!({ "a": { "b": [10, 20] }, "c": "d" });
    let paths = ["a.b.0", "c", "a.b.5"];
    assert_eq!(
        extract_from_props(&props(raw.clone()), &paths),
        extract_values_for_props(&raw, &paths)
    );
}

#[test]
fn values_object_nests_dotted_paths() {
    let object = build_values_object(
        &["post.id", "post.slug", "page", "filter.tag"],
        &[Some(json!(1)), Some(json!("hello")), Some(json!(2)), None],
    );
    assert_eq!(
        serde_json::Value::Object(object),
        json!({ "post": { "id": 1, "slug": "hello" }, "page": 2, "filter": {} })
    );
}
