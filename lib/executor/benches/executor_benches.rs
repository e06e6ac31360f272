use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, Criterion};
use graft_config::execution::ExecutionConfig;
use graft_executor::{
    execute, resolver_fn, ExecutionTree, FieldDefinition, ObjectType, Operation, RequestState,
    Schema, Selection, Variables,
};
use serde_json::{json, Value};

fn catalog_schema(size: usize) -> Schema {
    let products: Vec<Value> = (0..size)
        .map(|i| json!({ "id": i.to_string(), "name": format!("product-{}", i), "price": i }))
        .collect();

    Schema::builder()
        .object(
            ObjectType::new("Product"),
            [
                FieldDefinition::new("id", "ID!"),
                FieldDefinition::new("name", "String!"),
                FieldDefinition::new("price", "Int"),
            ],
        )
        .object(
            ObjectType::new("Query"),
            [FieldDefinition::new("products", "[Product!]!")
                .resolver(resolver_fn(move |_, _, _, _| Ok(Value::Array(products.clone()))))],
        )
        .bake()
        .unwrap()
}

fn wide_list_execution(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let schema = Arc::new(catalog_schema(1_000));
    let operation = Operation::query([Selection::field("products").select([
        Selection::field("id"),
        Selection::field("name"),
        Selection::field("price"),
    ])]);
    let tree = ExecutionTree::compile(&schema, &operation, &Variables::new()).unwrap();
    let root = json!({});
    let config = ExecutionConfig::default();

    c.bench_function("execute_wide_list", |b| {
        b.to_async(&runtime).iter(|| async {
            let state = RequestState::default();
            let response = execute(schema.clone(), black_box(&tree), &root, &state, &config)
                .await
                .unwrap();
            black_box(response);
        })
    });
}

fn compile_operation(c: &mut Criterion) {
    let schema = catalog_schema(0);
    let operation = Operation::query([Selection::field("products").select([
        Selection::field("id"),
        Selection::field("name"),
        Selection::field("name"),
        Selection::field("price"),
    ])]);

    c.bench_function("compile_execution_tree", |b| {
        b.iter(|| {
            let tree = ExecutionTree::compile(&schema, black_box(&operation), &Variables::new());
            black_box(tree.unwrap());
        })
    });
}

criterion_group!(benches, wide_list_execution, compile_operation);
criterion_main!(benches);
