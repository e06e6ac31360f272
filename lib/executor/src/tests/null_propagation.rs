use serde_json::json;

use graft_config::execution::ExecutionConfig;

use crate::{
    resolver_fn,
    response::graphql_error::NON_NULL_VIOLATION_CODE,
    tests::{error, error_set, run, run_with, Failing},
    FieldDefinition, ObjectType, Operation, Schema, Selection,
};

fn user_schema(name_type: &str, user_type: &str) -> Schema {
    Schema::builder()
        .object(
            ObjectType::new("User"),
            [
                FieldDefinition::new("id", "ID!"),
                FieldDefinition::new("name", name_type).resolver(Failing("name unavailable")),
            ],
        )
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("user", user_type)
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!({ "id": "1" })))),
                FieldDefinition::new("version", "String")
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!("1.0")))),
            ],
        )
        .bake()
        .unwrap()
}

fn user_query() -> Operation {
    Operation::query([
        Selection::field("user")
            .at(1, 3)
            .select([Selection::field("id"), Selection::field("name").at(1, 13)]),
        Selection::field("version"),
    ])
}

#[tokio::test]
async fn nullable_failure_stays_in_its_slot() {
    let response = run(user_schema("String", "User"), user_query()).await;

    assert_eq!(
        response.data,
        Some(json!({ "user": { "id": "1", "name": null }, "version": "1.0" }))
    );
    assert_eq!(
        error_set(&response),
        vec![error("name unavailable", "user.name")]
    );
    assert_eq!(response.errors[0].extension("code"), None);
    insta::assert_snapshot!(response.to_string_pretty().unwrap(), @r#"
    {
      "data": {
        "user": {
          "id": "1",
          "name": null
        },
        "version": "1.0"
      },
      "errors": [
        {
          "message": "name unavailable",
          "locations": [
            {
              "line": 1,
              "column": 13
            }
          ],
          "path": [
            "user",
            "name"
          ]
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn non_null_failure_nulls_the_nearest_nullable_parent() {
    let response = run(user_schema("String!", "User"), user_query()).await;

    assert_eq!(response.data, Some(json!({ "user": null, "version": "1.0" })));
    assert_eq!(
        error_set(&response),
        vec![error("name unavailable", "user.name")]
    );
    assert_eq!(
        response.errors[0].extension("code"),
        Some(&json!(NON_NULL_VIOLATION_CODE))
    );
}

#[tokio::test]
async fn non_null_chain_up_to_the_root_nulls_the_document() {
    let response = run(user_schema("String!", "User!"), user_query()).await;

    assert_eq!(response.data, None);
    assert_eq!(
        error_set(&response),
        vec![error("name unavailable", "user.name")]
    );
}

#[tokio::test]
async fn failing_non_null_root_field_nulls_the_document() {
    let schema = Schema::builder()
        .object(ObjectType::new("User"), [FieldDefinition::new("id", "ID!")])
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("viewer", "User!").resolver(Failing("not signed in")),
                FieldDefinition::new("version", "String")
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!("1.0")))),
            ],
        )
        .bake()
        .unwrap();

    let response = run(
        schema,
        Operation::query([
            Selection::field("viewer").select([Selection::field("id")]),
            Selection::field("version"),
        ]),
    )
    .await;

    assert_eq!(response.data, None);
    assert_eq!(error_set(&response), vec![error("not signed in", "viewer")]);
    insta::assert_snapshot!(String::from_utf8(response.to_vec().unwrap()).unwrap(), @r#"{"data":null,"errors":[{"message":"not signed in","locations":[{"line":0,"column":0}],"path":["viewer"],"extensions":{"code":"NON_NULL_VIOLATION"}}]}"#);
}

#[tokio::test]
async fn null_returned_for_non_null_field_is_an_invalid_value() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("User"),
            [
                FieldDefinition::new("id", "ID!"),
                FieldDefinition::new("email", "String!"),
            ],
        )
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("user", "User")
                .resolver(resolver_fn(|_, _, _, _| Ok(json!({ "id": "1", "email": null }))))],
        )
        .bake()
        .unwrap();

    let response = run(
        schema,
        Operation::query([Selection::field("user")
            .select([Selection::field("id"), Selection::field("email")])]),
    )
    .await;

    assert_eq!(response.data, Some(json!({ "user": null })));
    assert_eq!(
        error_set(&response),
        vec![error(
            "Invalid value (value: null) for field `email` of type `String!`",
            "user.email"
        )]
    );
}

#[tokio::test]
async fn wrongly_typed_leaf_is_reported_with_its_value() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("count", "Int")
                .resolver(resolver_fn(|_, _, _, _| Ok(json!("many"))))],
        )
        .bake()
        .unwrap();

    let response = run(schema, Operation::query([Selection::field("count")])).await;

    assert_eq!(response.data, Some(json!({ "count": null })));
    assert_eq!(
        error_set(&response),
        vec![error(
            "Invalid value (value: \"many\") for field `count` of type `Int`",
            "count"
        )]
    );
}

#[tokio::test]
async fn violation_code_can_be_disabled() {
    let config = ExecutionConfig {
        mark_non_null_violations: false,
        ..Default::default()
    };

    let response = run_with(user_schema("String!", "User"), user_query(), config).await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].extensions, None);
}

#[tokio::test]
async fn resolver_extensions_are_kept() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("secret", "String").resolver(resolver_fn(|_, _, _, _| {
                Err(crate::ResolverError::new("forbidden").with_extension("code", "FORBIDDEN"))
            }))],
        )
        .bake()
        .unwrap();

    let response = run(schema, Operation::query([Selection::field("secret")])).await;

    assert_eq!(response.data, Some(json!({ "secret": null })));
    assert_eq!(response.errors[0].extension("code"), Some(&json!("FORBIDDEN")));
}

#[tokio::test]
async fn panicking_resolver_becomes_a_field_error() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("unstable", "String")
                    .resolver(resolver_fn(|_, _, _, _| panic!("resolver exploded"))),
                FieldDefinition::new("stable", "String")
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!("fine")))),
            ],
        )
        .bake()
        .unwrap();

    let response = run(
        schema,
        Operation::query([Selection::field("unstable"), Selection::field("stable")]),
    )
    .await;

    assert_eq!(
        response.data,
        Some(json!({ "unstable": null, "stable": "fine" }))
    );
    assert_eq!(
        error_set(&response),
        vec![error("resolver exploded", "unstable")]
    );
}
