use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use graft_config::execution::ExecutionConfig;
use serde_json::{json, Value};

use crate::{
    execute_operation, resolver_fn,
    schema::directives::{Arguments, DirectiveHook, DirectiveUse},
    schema::field::FieldDescriptor,
    tests::{run, run_with, Recording},
    ArgumentDefinition, FieldDefinition, InputValue, InterfaceType, ObjectType, Operation,
    RequestState, ResolverError, Schema, Selection, UnionType, Variables,
};

fn recording_schema(root: &str, log: &Arc<Mutex<Vec<&'static str>>>) -> Schema {
    let slow = Recording {
        label: "slow",
        delay: Duration::from_millis(30),
        log: log.clone(),
        value: json!(1),
    };
    let fast = Recording {
        label: "fast",
        delay: Duration::from_millis(1),
        log: log.clone(),
        value: json!(2),
    };

    let mut builder = Schema::builder().object(
        ObjectType::new(root),
        [
            FieldDefinition::new("slow", "Int").resolver(slow),
            FieldDefinition::new("fast", "Int").resolver(fast),
        ],
    );
    if root != "Query" {
        builder = builder.object(
            ObjectType::new("Query"),
            [FieldDefinition::new("ping", "String")],
        );
    }
    builder.bake().unwrap()
}

fn slow_then_fast() -> [Selection; 2] {
    [Selection::field("slow"), Selection::field("fast")]
}

#[tokio::test]
async fn query_root_fields_run_concurrently() {
    let log = Arc::new(Mutex::new(vec![]));
    let response = run(
        recording_schema("Query", &log),
        Operation::query(slow_then_fast()),
    )
    .await;

    assert_eq!(response.data, Some(json!({ "slow": 1, "fast": 2 })));
    assert_eq!(*log.lock().unwrap(), vec!["fast", "slow"]);
}

#[tokio::test]
async fn mutation_root_fields_run_in_selection_order() {
    let log = Arc::new(Mutex::new(vec![]));
    let response = run(
        recording_schema("Mutation", &log),
        Operation::mutation(slow_then_fast()),
    )
    .await;

    assert_eq!(response.data, Some(json!({ "slow": 1, "fast": 2 })));
    assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
}

#[tokio::test]
async fn concurrency_limit_of_one_serializes_fields() {
    let log = Arc::new(Mutex::new(vec![]));
    let config = ExecutionConfig {
        max_concurrent_fields: Some(1),
        ..Default::default()
    };

    run_with(
        recording_schema("Query", &log),
        Operation::query(slow_then_fast()),
        config,
    )
    .await;

    assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
}

fn search_schema() -> Schema {
    Schema::builder()
        .object(
            ObjectType::new("User"),
            [FieldDefinition::new("name", "String")],
        )
        .object(
            ObjectType::new("Post"),
            [FieldDefinition::new("title", "String")],
        )
        .union(UnionType::new("SearchResult", ["User", "Post"]))
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("search", "[SearchResult!]!").resolver(resolver_fn(
                |_, _, _, _| {
                    Ok(json!([
                        { "__typename": "User", "name": "Ada" },
                        { "__typename": "Post", "title": "Notes" },
                    ]))
                },
            ))],
        )
        .bake()
        .unwrap()
}

#[tokio::test]
async fn type_conditions_follow_the_runtime_type() {
    let response = run(
        search_schema(),
        Operation::query([Selection::field("search").select([
            Selection::field("__typename"),
            Selection::field("name").on("User"),
            Selection::field("title").on("Post"),
        ])]),
    )
    .await;

    assert!(response.errors.is_empty());
    insta::assert_snapshot!(response.to_string_pretty().unwrap(), @r#"
    {
      "data": {
        "search": [
          {
            "__typename": "User",
            "name": "Ada"
          },
          {
            "__typename": "Post",
            "title": "Notes"
          }
        ]
      }
    }
    "#);
}

fn pets_schema() -> Schema {
    let owner = || FieldDefinition::new("owner", "Owner");
    Schema::builder()
        .object(
            ObjectType::new("Owner"),
            [
                FieldDefinition::new("id", "ID!"),
                FieldDefinition::new("name", "String"),
            ],
        )
        .interface(InterfaceType::new("Pet"), [owner()])
        .object(ObjectType::new("Dog").implements("Pet"), [owner()])
        .object(ObjectType::new("Cat").implements("Pet"), [owner()])
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("pets", "[Pet!]!").resolver(resolver_fn(|_, _, _, _| {
                Ok(json!([
                    { "__typename": "Dog", "owner": { "id": "1", "name": "Ada" } },
                    { "__typename": "Cat", "owner": { "id": "2", "name": "Grace" } },
                ]))
            }))],
        )
        .bake()
        .unwrap()
}

#[tokio::test]
async fn same_key_selections_merge_their_sub_selections() {
    let response = run(
        pets_schema(),
        Operation::query([Selection::field("pets").select([
            Selection::field("owner").select([Selection::field("id")]),
            Selection::field("owner")
                .on("Dog")
                .select([Selection::field("name")]),
        ])]),
    )
    .await;

    assert!(response.errors.is_empty());
    assert_eq!(
        response.data,
        Some(json!({
            "pets": [
                { "owner": { "id": "1", "name": "Ada" } },
                { "owner": { "id": "2" } },
            ]
        }))
    );
}

#[tokio::test]
async fn aliases_and_variables_select_the_same_field_twice() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("greet", "String!")
                .argument(ArgumentDefinition::new("name", "String").default_value("world"))
                .resolver(resolver_fn(|_, arguments, _, _| {
                    let name = arguments.get("name").and_then(Value::as_str).unwrap_or("?");
                    Ok(json!(format!("hello {}", name)))
                }))],
        )
        .bake()
        .unwrap();

    let operation = Operation::query([
        Selection::field("greet").alias("plain"),
        Selection::field("greet")
            .alias("named")
            .argument("name", InputValue::variable("who")),
    ]);
    let variables = Variables::from([("who".to_string(), json!("Ada"))]);

    let response = execute_operation(
        Arc::new(schema),
        &operation,
        &variables,
        &json!({}),
        &RequestState::default(),
        &ExecutionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        response.data,
        Some(json!({ "plain": "hello world", "named": "hello Ada" }))
    );
}

#[tokio::test]
async fn invalid_argument_fails_only_its_field() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("page", "Int")
                    .argument(ArgumentDefinition::new("size", "Int!"))
                    .resolver(resolver_fn(|_, arguments, _, _| {
                        Ok(arguments.get("size").cloned().unwrap_or_default())
                    })),
                FieldDefinition::new("ok", "Boolean")
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!(true)))),
            ],
        )
        .bake()
        .unwrap();

    let response = run(
        schema,
        Operation::query([
            Selection::field("page").argument("size", InputValue::literal("ten")),
            Selection::field("ok"),
        ]),
    )
    .await;

    assert_eq!(response.data, Some(json!({ "page": null, "ok": true })));
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0]
        .message
        .starts_with("Invalid value for argument `size` of field `page`"));
}

struct Viewer {
    name: &'static str,
}

#[tokio::test]
async fn resolvers_read_request_state_and_parent_type() {
    let schema = Schema::builder()
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("me", "String").resolver(resolver_fn(|_, _, state, _| {
                    let entry = state.get_ref_entry::<Viewer>();
                    Ok(json!(entry.get_ref().map(|viewer| viewer.name)))
                })),
                FieldDefinition::new("where", "String").resolver(resolver_fn(|_, _, _, info| {
                    Ok(json!(format!("{}.{}", info.parent_type_name, info.path)))
                })),
            ],
        )
        .bake()
        .unwrap();

    let state = RequestState::default();
    state.insert(Viewer { name: "Ada" });

    let response = execute_operation(
        Arc::new(schema),
        &Operation::query([Selection::field("me"), Selection::field("where")]),
        &Variables::new(),
        &json!({}),
        &state,
        &ExecutionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        response.data,
        Some(json!({ "me": "Ada", "where": "Query.where" }))
    );
}

struct Shout;

impl DirectiveHook for Shout {
    fn on_pre_output_coercion(
        &self,
        arguments: &Arguments,
        value: Value,
        _field: &FieldDescriptor,
    ) -> Result<Value, ResolverError> {
        let suffix = arguments.get("suffix").and_then(Value::as_str).unwrap_or("");
        match value {
            Value::String(text) => Ok(json!(format!("{}{}", text.to_uppercase(), suffix))),
            Value::Null => Err(ResolverError::new("nothing to shout")),
            other => Ok(other),
        }
    }
}

#[tokio::test]
async fn directive_hooks_run_before_output_coercion() {
    let schema = Schema::builder()
        .directive("shout", Shout)
        .object(
            ObjectType::new("Query"),
            [
                FieldDefinition::new("greeting", "String")
                    .directive(DirectiveUse::new("shout").argument("suffix", "!"))
                    .resolver(resolver_fn(|_, _, _, _| Ok(json!("hi")))),
                FieldDefinition::new("silence", "String")
                    .directive(DirectiveUse::new("shout"))
                    .resolver(resolver_fn(|_, _, _, _| Ok(Value::Null))),
            ],
        )
        .bake()
        .unwrap();

    let response = run(
        schema,
        Operation::query([Selection::field("greeting"), Selection::field("silence")]),
    )
    .await;

    assert_eq!(
        response.data,
        Some(json!({ "greeting": "HI!", "silence": null }))
    );
    assert_eq!(response.errors[0].message, "nothing to shout");
}
