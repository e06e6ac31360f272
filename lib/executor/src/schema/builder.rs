use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    resolver::{DefaultResolver, Resolver},
    schema::{
        directives::{builtin_directives, DirectiveHook, DirectiveRegistry},
        error::SchemaError,
        field::{BakeContext, FieldDefinition, FieldDescriptor},
        metadata::PossibleTypes,
        scalars::{builtin_scalars, ScalarType},
        types::{
            EnumType, InputObjectType, InterfaceType, ObjectType, TypeDescriptor, TypeMap,
            UnionType,
        },
        FieldMap, Schema,
    },
};

/// Collects type definitions and bakes them into a [`Schema`] in one pass.
///
/// The built-in scalars (`String`, `Int`, `Float`, `Boolean`, `ID`) and directives
/// (`@deprecated`, `@nonIntrospectable`) are registered up front; registering a scalar or a
/// directive under the same name replaces the built-in one.
pub struct SchemaBuilder {
    scalars: IndexMap<String, ScalarType>,
    enums: Vec<EnumType>,
    objects: Vec<(ObjectType, Vec<FieldDefinition>)>,
    interfaces: Vec<(InterfaceType, Vec<FieldDefinition>)>,
    unions: Vec<UnionType>,
    input_objects: Vec<InputObjectType>,
    directives: DirectiveRegistry,
    default_resolver: Option<Arc<dyn Resolver>>,
    query_type: String,
    mutation_type: Option<String>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder {
            scalars: builtin_scalars()
                .into_iter()
                .map(|scalar| (scalar.name.clone(), scalar))
                .collect(),
            enums: vec![],
            objects: vec![],
            interfaces: vec![],
            unions: vec![],
            input_objects: vec![],
            directives: builtin_directives(),
            default_resolver: None,
            query_type: "Query".to_string(),
            mutation_type: None,
        }
    }

    pub fn scalar(mut self, scalar: ScalarType) -> Self {
        self.scalars.insert(scalar.name.clone(), scalar);
        self
    }

    pub fn enum_type(mut self, enum_type: EnumType) -> Self {
        self.enums.push(enum_type);
        self
    }

    pub fn object(
        mut self,
        object: ObjectType,
        fields: impl IntoIterator<Item = FieldDefinition>,
    ) -> Self {
        self.objects.push((object, fields.into_iter().collect()));
        self
    }

    pub fn interface(
        mut self,
        interface: InterfaceType,
        fields: impl IntoIterator<Item = FieldDefinition>,
    ) -> Self {
        self.interfaces
            .push((interface, fields.into_iter().collect()));
        self
    }

    pub fn union(mut self, union: UnionType) -> Self {
        self.unions.push(union);
        self
    }

    pub fn input_object(mut self, input_object: InputObjectType) -> Self {
        self.input_objects.push(input_object);
        self
    }

    pub fn directive(
        mut self,
        name: impl Into<String>,
        hook: impl DirectiveHook + 'static,
    ) -> Self {
        self.directives.insert(name.into(), Arc::new(hook));
        self
    }

    /// Resolver bound to every field declared without one.
    pub fn default_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.default_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.query_type = name.into();
        self
    }

    /// Defaults to `Mutation` when an object of that name exists.
    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    pub fn bake(self) -> Result<Schema, SchemaError> {
        let mut types = TypeMap::new();

        for (_, scalar) in self.scalars {
            register(&mut types, TypeDescriptor::Scalar(Arc::new(scalar)))?;
        }
        for enum_type in self.enums {
            register(&mut types, TypeDescriptor::Enum(Arc::new(enum_type)))?;
        }
        for input_object in self.input_objects {
            register(&mut types, TypeDescriptor::InputObject(Arc::new(input_object)))?;
        }

        let mut implementations: Vec<(String, String)> = vec![];
        let mut composite_fields: Vec<(String, Vec<FieldDefinition>)> = vec![];

        for (object, fields) in self.objects {
            for interface in &object.interfaces {
                implementations.push((object.name.clone(), interface.clone()));
            }
            composite_fields.push((object.name.clone(), fields));
            register(&mut types, TypeDescriptor::Object(Arc::new(object)))?;
        }
        for (interface, fields) in self.interfaces {
            for parent in &interface.interfaces {
                implementations.push((interface.name.clone(), parent.clone()));
            }
            composite_fields.push((interface.name.clone(), fields));
            register(&mut types, TypeDescriptor::Interface(Arc::new(interface)))?;
        }

        let mut union_members: Vec<(String, String)> = vec![];
        for union in self.unions {
            for member in &union.members {
                union_members.push((union.name.clone(), member.clone()));
            }
            composite_fields.push((union.name.clone(), vec![]));
            register(&mut types, TypeDescriptor::Union(Arc::new(union)))?;
        }

        validate_implementations(&types, &implementations)?;
        validate_union_members(&types, &union_members)?;
        validate_input_objects(&types)?;

        let query_type = self.query_type;
        match types.get(&query_type) {
            None => return Err(SchemaError::MissingQueryType(query_type)),
            Some(TypeDescriptor::Object(_)) => {}
            Some(_) => return Err(SchemaError::RootTypeNotObject(query_type)),
        }

        let mutation_type = match self.mutation_type {
            Some(name) => match types.get(&name) {
                None => return Err(SchemaError::MissingMutationType(name)),
                Some(TypeDescriptor::Object(_)) => Some(name),
                Some(_) => return Err(SchemaError::RootTypeNotObject(name)),
            },
            None => match types.get("Mutation") {
                Some(TypeDescriptor::Object(_)) => Some("Mutation".to_string()),
                _ => None,
            },
        };

        let default_resolver: Arc<dyn Resolver> = self
            .default_resolver
            .unwrap_or_else(|| Arc::new(DefaultResolver));
        let bake_context = BakeContext {
            types: &types,
            directives: &self.directives,
            default_resolver: &default_resolver,
        };

        let mut fields: HashMap<String, FieldMap> = HashMap::with_capacity(composite_fields.len());
        for (type_name, definitions) in composite_fields {
            let mut baked = FieldMap::with_capacity(definitions.len() + 1);
            for definition in definitions {
                if baked.contains_key(&definition.name) {
                    return Err(SchemaError::DuplicateField {
                        type_name,
                        field: definition.name,
                    });
                }
                let descriptor = FieldDescriptor::bake(definition, &type_name, &bake_context)?;
                baked.insert(descriptor.name.clone(), Arc::new(descriptor));
            }

            if !baked.contains_key("__typename") {
                let typename =
                    FieldDescriptor::bake(FieldDefinition::typename(), &type_name, &bake_context)?;
                baked.insert(typename.name.clone(), Arc::new(typename));
            }

            fields.insert(type_name, baked);
        }

        let possible_types = PossibleTypes::new(
            implementations
                .iter()
                .map(|(implementor, interface)| (implementor.as_str(), interface.as_str())),
            union_members
                .iter()
                .map(|(union_name, member)| (union_name.as_str(), member.as_str())),
        );

        debug!(
            types = types.len(),
            query_type = query_type.as_str(),
            mutation_type = mutation_type.as_deref(),
            "schema baked"
        );

        Ok(Schema {
            types,
            fields,
            possible_types,
            query_type,
            mutation_type,
        })
    }
}

fn register(types: &mut TypeMap, descriptor: TypeDescriptor) -> Result<(), SchemaError> {
    let name = descriptor.named_type_name().to_string();
    if types.contains_key(&name) {
        return Err(SchemaError::DuplicateType(name));
    }
    types.insert(name, descriptor);
    Ok(())
}

fn validate_implementations(
    types: &TypeMap,
    implementations: &[(String, String)],
) -> Result<(), SchemaError> {
    for (implementor, interface) in implementations {
        if !matches!(types.get(interface), Some(TypeDescriptor::Interface(_))) {
            return Err(SchemaError::UnknownInterface {
                type_name: implementor.clone(),
                interface: interface.clone(),
            });
        }
    }
    Ok(())
}

fn validate_union_members(
    types: &TypeMap,
    union_members: &[(String, String)],
) -> Result<(), SchemaError> {
    for (union_name, member) in union_members {
        if !matches!(types.get(member), Some(TypeDescriptor::Object(_))) {
            return Err(SchemaError::UnionMemberNotObject {
                union_name: union_name.clone(),
                member: member.clone(),
            });
        }
    }
    Ok(())
}

fn validate_input_objects(types: &TypeMap) -> Result<(), SchemaError> {
    for descriptor in types.values() {
        let TypeDescriptor::InputObject(input_object) = descriptor else {
            continue;
        };

        for field in input_object.fields.values() {
            let coordinate = format!("{}.{}", input_object.name, field.name);
            let field_type = TypeDescriptor::resolve(&field.type_ref, types, &coordinate)?;
            if !field_type.is_input_type() {
                return Err(SchemaError::InputTypeExpected {
                    referenced_by: coordinate,
                    type_name: field_type.named_type_name().to_string(),
                });
            }
        }
    }
    Ok(())
}
