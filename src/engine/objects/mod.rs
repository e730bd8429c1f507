//! Contains the Juniper object that serves every generated node type, and the input wrapper used
//! to read filter arguments.

use super::context::GraphQLContext;
use super::resolvers::{resolver_name, Filters};
use super::schema::{Argument, GraphqlType, Info, Property, PropertyKind};
use crate::engine::database::Record;
use crate::engine::value::Value;
use crate::error::Error;
use juniper::meta::{Field, MetaType};
use juniper::{
    Arguments, DefaultScalarValue, ExecutionResult, Executor, FromInputValue, GraphQLType,
    GraphQLValue, InputValue, Registry, ID,
};
use log::{error, trace};
use std::convert::{TryFrom, TryInto};
use std::panic::panic_any;

/// A filter argument value, read from the GraphQL input
#[derive(Clone, Debug)]
pub(crate) struct FilterInput(Value);

impl FilterInput {
    pub(crate) fn into_value(self) -> Value {
        self.0
    }
}

impl FromInputValue for FilterInput {
    fn from_input_value(v: &InputValue) -> Option<Self> {
        serde_json::to_value(v)
            .ok()
            .and_then(|val| val.try_into().ok())
            .map(FilterInput)
    }
}

/// An object in a query response: the query root, or one record of a generated node type.
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::database::Record;
/// use graphqlize::engine::objects::Entity;
/// use std::collections::HashMap;
///
/// let e = Entity::new(Record::new("Widget", HashMap::new()));
/// assert_eq!(e.record().unwrap().model(), "Widget");
/// ```
#[derive(Clone, Debug)]
pub struct Entity {
    record: Option<Record>,
}

impl Entity {
    pub fn new(record: Record) -> Entity {
        Entity {
            record: Some(record),
        }
    }

    pub(crate) fn root() -> Entity {
        Entity { record: None }
    }

    /// The record backing this object, or `None` for the query root
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    fn field_meta<'r>(
        p: &Property,
        info: &Info,
        registry: &mut Registry<'r>,
    ) -> Field<'r, DefaultScalarValue>
    where
        DefaultScalarValue: 'r,
    {
        let name = p.graphql_name();
        let f = match p.kind() {
            PropertyKind::Scalar { type_name, .. } => match type_name {
                GraphqlType::Boolean => registry.field::<Option<bool>>(name, &()),
                GraphqlType::Float => registry.field::<Option<f64>>(name, &()),
                GraphqlType::ID => registry.field::<Option<ID>>(name, &()),
                GraphqlType::Int => registry.field::<Option<i32>>(name, &()),
                GraphqlType::String => registry.field::<Option<String>>(name, &()),
                GraphqlType::Uuid => registry.field::<Option<uuid::Uuid>>(name, &()),
            },
            PropertyKind::Object {
                node, arguments, ..
            } => {
                let f = registry.field::<Option<Entity>>(
                    name,
                    &Info::new(node.name().to_string(), info.type_defs()),
                );
                arguments
                    .iter()
                    .fold(f, |f, a| f.argument(Entity::argument_meta(a, registry)))
            }
            PropertyKind::List {
                node, arguments, ..
            } => {
                let f = registry.field::<Option<Vec<Entity>>>(
                    name,
                    &Info::new(node.name().to_string(), info.type_defs()),
                );
                arguments
                    .iter()
                    .fold(f, |f, a| f.argument(Entity::argument_meta(a, registry)))
            }
        };

        match p.description() {
            Some(d) => f.description(d),
            None => f,
        }
    }

    fn argument_meta<'r>(
        a: &Argument,
        registry: &mut Registry<'r>,
    ) -> juniper::meta::Argument<'r, DefaultScalarValue>
    where
        DefaultScalarValue: 'r,
    {
        let name = a.graphql_name();
        let arg = match a.type_name() {
            GraphqlType::Boolean => registry.arg::<Option<bool>>(name, &()),
            GraphqlType::Float => registry.arg::<Option<f64>>(name, &()),
            GraphqlType::ID => registry.arg::<Option<ID>>(name, &()),
            GraphqlType::Int => registry.arg::<Option<i32>>(name, &()),
            GraphqlType::String => registry.arg::<Option<String>>(name, &()),
            GraphqlType::Uuid => registry.arg::<Option<uuid::Uuid>>(name, &()),
        };

        match a.description() {
            Some(d) => arg.description(d),
            None => arg,
        }
    }

    /// Reads the filter arguments given on a field, keyed by model field name. Null arguments
    /// are dropped.
    fn filters(arguments: &[Argument], args: &Arguments) -> Filters {
        arguments
            .iter()
            .filter_map(|a| {
                args.get::<FilterInput>(a.graphql_name())
                    .map(FilterInput::into_value)
                    .filter(|v| !v.is_null())
                    .map(|v| (a.name().to_string(), v))
            })
            .collect()
    }

    fn resolve_scalar(
        &self,
        p: &Property,
        type_name: GraphqlType,
        default: Option<&Value>,
        executor: &Executor<GraphQLContext>,
    ) -> ExecutionResult {
        let value = self
            .record
            .as_ref()
            .and_then(|r| r.get(p.name()))
            .filter(|v| !v.is_null())
            .or(default)
            .cloned();

        match (type_name, value) {
            (_, None) => executor.resolve_with_ctx(&(), &None::<String>),
            (GraphqlType::Boolean, Some(v)) => executor.resolve_with_ctx(&(), &bool::try_from(v)?),
            (GraphqlType::Float, Some(v)) => executor.resolve_with_ctx(&(), &f64::try_from(v)?),
            (GraphqlType::ID, Some(v)) => {
                executor.resolve_with_ctx(&(), &ID::from(v.to_id_string()?))
            }
            (GraphqlType::Int, Some(v)) => executor.resolve_with_ctx(&(), &i32::try_from(v)?),
            (GraphqlType::String, Some(v)) => {
                executor.resolve_with_ctx(&(), &String::try_from(v)?)
            }
            (GraphqlType::Uuid, Some(v)) => {
                let s = String::try_from(v)?;
                let u = uuid::Uuid::parse_str(&s).map_err(|_| Error::TypeConversionFailed {
                    src: s,
                    dst: "Uuid".to_string(),
                })?;
                executor.resolve_with_ctx(&(), &u)
            }
        }
    }

    /// True if this object's record holds no key for the reference property `p`
    fn reference_is_null(&self, p: &Property) -> bool {
        self.record
            .as_ref()
            .map_or(false, |r| r.get(p.name()).map_or(true, Value::is_null))
    }
}

impl GraphQLType for Entity {
    fn name(info: &Self::TypeInfo) -> Option<&str> {
        Some(info.name())
    }

    fn meta<'r>(info: &Self::TypeInfo, registry: &mut Registry<'r>) -> MetaType<'r>
    where
        DefaultScalarValue: 'r,
    {
        trace!("Entity::meta called -- info.name: {}", info.name());

        let props = info.props().unwrap_or_else(|e| {
            // only reached if a node reference escaped collection in the schema builder
            error!("Entity::meta panicking on type: {}", info.name());
            panic_any(e)
        });

        let fields = props
            .iter()
            .map(|p| Entity::field_meta(p, info, registry))
            .collect::<Vec<_>>();

        registry
            .build_object_type::<Entity>(info, &fields)
            .into_meta()
    }
}

impl GraphQLValue for Entity {
    type Context = GraphQLContext;
    type TypeInfo = Info;

    fn type_name<'i>(&self, info: &'i Self::TypeInfo) -> Option<&'i str> {
        <Entity as GraphQLType>::name(info)
    }

    fn resolve_field(
        &self,
        info: &Self::TypeInfo,
        field_name: &str,
        args: &Arguments,
        executor: &Executor<Self::Context>,
    ) -> ExecutionResult {
        trace!(
            "Entity::resolve_field called -- info.name: {}, field_name: {}",
            info.name(),
            field_name
        );

        let p = info.property(field_name)?;

        match p.kind() {
            PropertyKind::Scalar { type_name, default } => {
                self.resolve_scalar(p, *type_name, default.as_ref(), executor)
            }
            PropertyKind::Object {
                node,
                arguments,
                resolver,
            } => {
                let node_info = Info::new(node.name().to_string(), info.type_defs());
                if self.reference_is_null(p) {
                    return executor.resolve(&node_info, &None::<Entity>);
                }

                let resolver = resolver.as_ref().ok_or_else(|| Error::SchemaItemNotFound {
                    name: resolver_name(p.name()),
                })?;
                let filters = Entity::filters(arguments, args);
                let record = resolver.call(self.record.as_ref(), executor.context(), &filters)?;

                executor.resolve(&node_info, &Some(Entity::new(record)))
            }
            PropertyKind::List {
                node,
                arguments,
                resolver,
            } => {
                let node_info = Info::new(node.name().to_string(), info.type_defs());
                let resolver = resolver.as_ref().ok_or(Error::TypeNotExpected)?;
                let filters = Entity::filters(arguments, args);
                let entities = resolver
                    .call(self.record.as_ref(), executor.context(), &filters)?
                    .map(Entity::new)
                    .collect::<Vec<_>>();

                executor.resolve(&node_info, &entities)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, FilterInput};
    use crate::engine::config::mock_widget_catalog;
    use crate::engine::database::Record;
    use crate::engine::mapper::CatalogMapper;
    use crate::engine::schema::generate;
    use crate::engine::value::Value;
    use juniper::{FromInputValue, InputValue};
    use maplit::hashmap;
    use std::sync::Arc;

    /// Passes if GraphQL inputs convert into filter values
    #[test]
    fn filter_input_from_input_value() {
        let s = FilterInput::from_input_value(&InputValue::scalar("7".to_string())).unwrap();
        assert_eq!(s.into_value(), Value::from("7"));

        let i = FilterInput::from_input_value(&InputValue::scalar(3)).unwrap();
        assert_eq!(i.into_value(), Value::Int64(3));

        let n = FilterInput::from_input_value(&InputValue::null()).unwrap();
        assert!(n.into_value().is_null());
    }

    /// Passes if a reference is reported null only when the record lacks its key
    #[test]
    fn reference_is_null() {
        let with_key = Entity::new(Record::new(
            "Widget",
            hashmap! {"constructed_with".to_string() => Value::Int64(1)},
        ));
        let without_key = Entity::new(Record::new(
            "Widget",
            hashmap! {"constructed_with".to_string() => Value::Null},
        ));

        let orphan = Entity::new(Record::new("Widget", hashmap! {}));

        let mapper = CatalogMapper::new(Arc::new(mock_widget_catalog()));
        let nt = generate(mapper.catalog().model("Widget").unwrap(), &mapper).unwrap();
        let p = nt.property("constructed_with").unwrap();

        assert!(!with_key.reference_is_null(p));
        assert!(without_key.reference_is_null(p));
        assert!(orphan.reference_is_null(p));
        assert!(!Entity::root().reference_is_null(p));
    }
}
