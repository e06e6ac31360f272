use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;

pub mod builder;
pub mod directives;
pub mod error;
pub mod field;
pub mod metadata;
pub mod scalars;
pub mod type_ref;
pub mod types;

use crate::schema::{
    builder::SchemaBuilder,
    directives::FieldIntrospection,
    field::FieldDescriptor,
    metadata::PossibleTypes,
    types::{TypeDescriptor, TypeMap},
};

pub type FieldMap = IndexMap<String, Arc<FieldDescriptor>>;

/// A baked schema. Immutable once built and shared by every request.
pub struct Schema {
    pub(crate) types: TypeMap,
    pub(crate) fields: HashMap<String, FieldMap>,
    pub(crate) possible_types: PossibleTypes,
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn types(&self) -> &TypeMap {
        &self.types
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.get(type_name)?.get(field_name)
    }

    pub fn fields_of(&self, type_name: &str) -> Option<&FieldMap> {
        self.fields.get(type_name)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn possible_types(&self) -> &PossibleTypes {
        &self.possible_types
    }

    /// Fields of a type as introspection lists them: meta fields and fields hidden by a
    /// directive are left out.
    pub fn introspect_fields(&self, type_name: &str) -> Vec<FieldIntrospection> {
        self.fields_of(type_name)
            .into_iter()
            .flat_map(|fields| fields.values())
            .filter(|field| !field.name.starts_with("__"))
            .filter_map(|field| field.introspect())
            .collect()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("query_type", &self.query_type)
            .field("mutation_type", &self.mutation_type)
            .finish()
    }
}
