//! A small product catalog used by the sample operation.

use graft_executor::{
    resolver_fn, ArgumentDefinition, FieldDefinition, InputValue, ObjectType, Operation,
    ResolverError, Schema, SchemaError, Selection,
};
use serde_json::{json, Value};

fn products() -> Value {
    json!([
        { "id": "1", "name": "Kettle", "price": 39.5, "reviews": [{ "rating": 5 }, { "rating": 4 }] },
        { "id": "2", "name": "Toaster", "price": 24.0, "reviews": [{ "rating": null }] },
        { "id": "3", "name": "Blender", "price": 89.99, "reviews": [] },
        { "id": "4", "name": "Juicer", "price": 59.0, "reviews": [{ "rating": 3 }] },
    ])
}

pub fn schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .object(
            ObjectType::new("Review"),
            [FieldDefinition::new("rating", "Int!")],
        )
        .object(
            ObjectType::new("Product"),
            [
                FieldDefinition::new("id", "ID!"),
                FieldDefinition::new("name", "String!"),
                FieldDefinition::new("price", "Float!"),
                FieldDefinition::new("reviews", "[Review!]"),
                FieldDefinition::new("stock", "Int").resolver(resolver_fn(|parent, _, _, _| {
                    match parent.get("id").and_then(Value::as_str) {
                        Some("2") => Err(ResolverError::new("inventory service unavailable")
                            .with_extension("code", "UPSTREAM_UNAVAILABLE")),
                        _ => Ok(json!(12)),
                    }
                })),
            ],
        )
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("products", "[Product!]!")
                .argument(ArgumentDefinition::new("first", "Int").default_value(10))
                .resolver(resolver_fn(|_, arguments, _, _| {
                    let first = arguments
                        .get("first")
                        .and_then(Value::as_u64)
                        .unwrap_or(10) as usize;
                    let all = products();
                    let items = all.as_array().map(Vec::as_slice).unwrap_or_default();
                    Ok(Value::Array(items.iter().take(first).cloned().collect()))
                }))],
        )
        .bake()
}

pub fn operation() -> Operation {
    Operation::query([Selection::field("products")
        .argument("first", InputValue::variable("first"))
        .at(1, 3)
        .select([
            Selection::field("id"),
            Selection::field("name"),
            Selection::field("price"),
            Selection::field("stock").at(1, 40),
            Selection::field("reviews")
                .at(1, 46)
                .select([Selection::field("rating").at(1, 56)]),
        ])])
}
