use std::sync::atomic::Ordering;

use serde_json::json;

use crate::{
    resolver_fn,
    tests::{error, error_set, run, ElementValue},
    FieldDefinition, ObjectType, Operation, Schema, Selection,
};

fn items_schema(items_type: &str, resolver: ElementValue, items: serde_json::Value) -> Schema {
    Schema::builder()
        .object(
            ObjectType::new("Item"),
            [FieldDefinition::new("value", "String!").resolver(resolver)],
        )
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("items", items_type)
                    .resolver(resolver_fn(move |_, _, _, _| Ok(items.clone()))),
                FieldDefinition::new("total", "Int")
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!(3)))),
            ],
        )
        .bake()
        .unwrap()
}

fn items_query() -> Operation {
    Operation::query([
        Selection::field("items").select([Selection::field("value")]),
        Selection::field("total"),
    ])
}

#[tokio::test]
async fn resolves_every_element() {
    let resolver = ElementValue::failing_on([]);
    let paths = resolver.paths.clone();
    let schema = items_schema("[Item!]", resolver, json!([{ "n": 0 }, { "n": 1 }]));

    let response = run(schema, items_query()).await;

    assert_eq!(
        response.data,
        Some(json!({
            "items": [{ "value": "value-0" }, { "value": "value-1" }],
            "total": 3,
        }))
    );
    assert!(response.errors.is_empty());

    let mut paths = paths.lock().unwrap().clone();
    paths.sort();
    assert_eq!(paths, vec!["items.0.value", "items.1.value"]);
}

#[tokio::test]
async fn failing_element_collapses_the_list_while_siblings_finish() {
    let resolver = ElementValue::failing_on([1]);
    let completed = resolver.completed.clone();
    let schema = items_schema(
        "[Item!]",
        resolver,
        json!([{ "n": 0 }, { "n": 1 }, { "n": 2 }]),
    );

    let response = run(schema, items_query()).await;

    assert_eq!(response.data, Some(json!({ "items": null, "total": 3 })));
    assert_eq!(
        error_set(&response),
        vec![error("value 1 unavailable", "items.1.value")]
    );
    assert_eq!(completed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_bubbles_into_the_same_slot_are_idempotent() {
    let resolver = ElementValue::failing_on([0, 2]);
    let completed = resolver.completed.clone();
    let schema = items_schema(
        "[Item!]",
        resolver,
        json!([{ "n": 0 }, { "n": 1 }, { "n": 2 }]),
    );

    let response = run(schema, items_query()).await;

    assert_eq!(response.data, Some(json!({ "items": null, "total": 3 })));
    assert_eq!(
        error_set(&response),
        vec![
            error("value 0 unavailable", "items.0.value"),
            error("value 2 unavailable", "items.2.value"),
        ]
    );
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_null_list_keeps_bubbling_past_the_list() {
    let resolver = ElementValue::failing_on([1]);
    let schema = Schema::builder()
        .object(
            ObjectType::new("Item"),
            [FieldDefinition::new("value", "String!").resolver(resolver)],
        )
        .object(
            ObjectType::new("Catalog"),
            [FieldDefinition::new("items", "[Item!]!")],
        )
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("catalog", "Catalog").resolver(resolver_fn(|_, _, _, _| {
                Ok(json!({ "items": [{ "n": 0 }, { "n": 1 }] }))
            }))],
        )
        .bake()
        .unwrap();

    let response = run(
        schema,
        Operation::query([Selection::field("catalog")
            .select([Selection::field("items").select([Selection::field("value")])])]),
    )
    .await;

    assert_eq!(response.data, Some(json!({ "catalog": null })));
    assert_eq!(
        error_set(&response),
        vec![error("value 1 unavailable", "catalog.items.1.value")]
    );
}

#[tokio::test]
async fn nullable_elements_still_collapse_the_whole_list() {
    let resolver = ElementValue::failing_on([1]);
    let schema = items_schema("[Item]", resolver, json!([{ "n": 0 }, { "n": 1 }]));

    let response = run(schema, items_query()).await;

    assert_eq!(response.data, Some(json!({ "items": null, "total": 3 })));
}

#[tokio::test]
async fn null_elements_have_no_sub_tree() {
    let resolver = ElementValue::failing_on([]);
    let paths = resolver.paths.clone();
    let schema = items_schema("[Item]", resolver, json!([{ "n": 0 }, null]));

    let response = run(schema, items_query()).await;

    assert_eq!(
        response.data,
        Some(json!({ "items": [{ "value": "value-0" }, null], "total": 3 }))
    );
    assert_eq!(*paths.lock().unwrap(), vec!["items.0.value"]);
}

#[tokio::test]
async fn null_element_in_non_null_list_fails_the_list_field() {
    let resolver = ElementValue::failing_on([]);
    let completed = resolver.completed.clone();
    let schema = items_schema("[Item!]", resolver, json!([{ "n": 0 }, null]));

    let response = run(schema, items_query()).await;

    assert_eq!(response.data, Some(json!({ "items": null, "total": 3 })));
    assert_eq!(
        error_set(&response),
        vec![error(
            "Invalid value (value: null) for field `items` of type `[Item!]`",
            "items"
        )]
    );
    assert_eq!(completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn nested_lists_fan_out_per_layer() {
    let resolver = ElementValue::failing_on([]);
    let paths = resolver.paths.clone();
    let schema = items_schema(
        "[[Item]]",
        resolver,
        json!([[{ "n": 0 }], [{ "n": 1 }, { "n": 2 }]]),
    );

    let response = run(schema, items_query()).await;

    assert_eq!(
        response.data,
        Some(json!({
            "items": [
                [{ "value": "value-0" }],
                [{ "value": "value-1" }, { "value": "value-2" }],
            ],
            "total": 3,
        }))
    );

    let mut paths = paths.lock().unwrap().clone();
    paths.sort();
    assert_eq!(
        paths,
        vec!["items.0.0.value", "items.1.0.value", "items.1.1.value"]
    );
}

#[tokio::test]
async fn nested_list_failure_collapses_the_outer_field() {
    let resolver = ElementValue::failing_on([2]);
    let schema = items_schema(
        "[[Item!]]",
        resolver,
        json!([[{ "n": 0 }], [{ "n": 1 }, { "n": 2 }]]),
    );

    let response = run(schema, items_query()).await;

    assert_eq!(response.data, Some(json!({ "items": null, "total": 3 })));
    assert_eq!(
        error_set(&response),
        vec![error("value 2 unavailable", "items.1.1.value")]
    );
}
