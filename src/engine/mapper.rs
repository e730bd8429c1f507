//! Field and type mapping from models to generated node types. The [`Mapper`] trait is the
//! contract the node generator consumes; [`CatalogMapper`] implements it for models described by
//! a [`Catalog`].
//!
//! [`Mapper`]: trait.Mapper.html
//! [`CatalogMapper`]: struct.CatalogMapper.html
//! [`Catalog`]: ../config/struct.Catalog.html

use super::config::{Catalog, FieldDescriptor, FieldKind, Model, ModelField};
use super::database::Predicate;
use super::resolvers::{resolver_name, FetchMany, FetchOne, Filters};
use super::schema::{generate_with, Argument, GraphqlType, Lineage, NodeRef, Property, PropertyKind};
use crate::error::Error;
use log::{trace, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Describes one family of models to the node generator. The generator calls the methods in
/// declaration order: name, fields, resolvers, fetch-one resolver, fetch-many resolver.
pub trait Mapper {
    type Model;

    /// Returns the name of the node generated for `model`. Names must be unique within a schema.
    fn get_name(&self, model: &Self::Model) -> String;

    /// Returns the node's fields in the model's declared order. References are generated
    /// recursively through [`generate_with`], passing `lineage` along.
    ///
    /// [`generate_with`]: ../schema/fn.generate_with.html
    fn get_fields(
        &self,
        model: &Self::Model,
        lineage: &mut Lineage,
    ) -> Result<Vec<Property>, Error>;

    /// Returns the resolvers of the model's reference fields, keyed by `resolve_<field>`
    fn get_resolvers(&self, model: &Self::Model) -> Result<HashMap<String, FetchOne>, Error>;

    /// Returns the resolver that fetches the one record of `model` matching its filters. It
    /// fails with `NotFound` when nothing matches.
    fn get_self_resolver(&self, model: &Self::Model) -> FetchOne;

    /// Returns the resolver that fetches every record of `model` matching its filters, which
    /// may be none.
    fn get_self_many_resolver(&self, model: &Self::Model) -> FetchMany;
}

/// Returns the GraphQL scalar a primitive kind is exposed as, or `None` if the kind has no
/// GraphQL representation
pub fn graphql_type(kind: FieldKind) -> Option<GraphqlType> {
    match kind {
        FieldKind::BigInteger | FieldKind::Integer => Some(GraphqlType::Int),
        FieldKind::Boolean => Some(GraphqlType::Boolean),
        FieldKind::Char | FieldKind::FixedChar | FieldKind::Text => Some(GraphqlType::String),
        FieldKind::Decimal | FieldKind::Double | FieldKind::Float => Some(GraphqlType::Float),
        FieldKind::PrimaryKey => Some(GraphqlType::ID),
        FieldKind::Uuid => Some(GraphqlType::Uuid),
        FieldKind::Bare
        | FieldKind::Binary
        | FieldKind::Blob
        | FieldKind::Date
        | FieldKind::DateTime
        | FieldKind::Time => None,
    }
}

/// Builds the conjunction of equality predicates for a set of filters, in field name order.
///
/// # Errors
///
/// Returns [`UnknownFilterField`] if a filter names a field the model does not have.
///
/// [`UnknownFilterField`]: ../../error/enum.Error.html#variant.UnknownFilterField
pub fn predicates(model: &Model, filters: &Filters) -> Result<Vec<Predicate>, Error> {
    let mut keys = filters.keys().collect::<Vec<_>>();
    keys.sort();

    keys.into_iter()
        .map(|k| Predicate::equals(model, k, filters[k].clone()))
        .collect()
}

/// [`Mapper`] for the models of a [`Catalog`]. References are resolved within the catalog.
///
/// [`Mapper`]: trait.Mapper.html
/// [`Catalog`]: ../config/struct.Catalog.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::Catalog;
/// use graphqlize::engine::mapper::CatalogMapper;
/// use std::sync::Arc;
///
/// let mapper = CatalogMapper::new(Arc::new(Catalog::default()));
/// ```
#[derive(Clone, Debug)]
pub struct CatalogMapper {
    catalog: Arc<Catalog>,
}

impl CatalogMapper {
    pub fn new(catalog: Arc<Catalog>) -> CatalogMapper {
        CatalogMapper { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn map_primitive(field: &ModelField) -> Option<Property> {
        match field.descriptor() {
            FieldDescriptor::Primitive {
                kind,
                description,
                default,
            } => match graphql_type(*kind) {
                Some(type_name) => Some(Property::new(
                    field.name(),
                    description.clone(),
                    PropertyKind::Scalar {
                        type_name,
                        default: default.clone(),
                    },
                )),
                None => {
                    warn!("Unable to map field {} to a GraphQL field", field.name());
                    None
                }
            },
            FieldDescriptor::Reference { .. } => None,
        }
    }

    /// Filter arguments for embedding `target`, built from its primitive fields only
    fn filter_arguments(target: &Model) -> Vec<Argument> {
        target
            .fields()
            .filter(|f| f.references().is_none())
            .filter_map(CatalogMapper::map_primitive)
            .filter_map(|p| Argument::from_property(&p))
            .collect()
    }
}

impl Mapper for CatalogMapper {
    type Model = Model;

    fn get_name(&self, model: &Model) -> String {
        model.name().to_string()
    }

    fn get_fields(&self, model: &Model, lineage: &mut Lineage) -> Result<Vec<Property>, Error> {
        trace!("CatalogMapper::get_fields called -- model: {}", model.name());

        let mut props = Vec::new();
        for f in model.fields() {
            match f.references() {
                Some(target_name) => {
                    let target = self.catalog.model(target_name)?;
                    let node = if lineage.contains(&self.get_name(target)) {
                        NodeRef::Pending(self.get_name(target))
                    } else {
                        NodeRef::Node(generate_with(target, self, lineage)?)
                    };

                    props.push(Property::new(
                        f.name(),
                        None,
                        PropertyKind::Object {
                            node,
                            arguments: CatalogMapper::filter_arguments(target),
                            resolver: None,
                        },
                    ));
                }
                None => {
                    if let Some(p) = CatalogMapper::map_primitive(f) {
                        props.push(p);
                    }
                }
            }
        }

        Ok(props)
    }

    fn get_resolvers(&self, model: &Model) -> Result<HashMap<String, FetchOne>, Error> {
        trace!(
            "CatalogMapper::get_resolvers called -- model: {}",
            model.name()
        );

        let mut resolvers = HashMap::new();
        for f in model.fields() {
            if let Some(target_name) = f.references() {
                let target = self.catalog.model(target_name)?.clone();
                let fetch = self.get_self_resolver(&target);
                let field_name = f.name().to_string();

                resolvers.insert(
                    resolver_name(f.name()),
                    FetchOne::new(move |parent, ctx, filters| {
                        trace!(
                            "reference resolver called -- field: {}, target: {}",
                            field_name,
                            target.name()
                        );

                        let mut filters = filters.clone();
                        if let Some(parent) = parent {
                            let key = match parent.get(&field_name) {
                                Some(v) if !v.is_null() => v.clone(),
                                _ => {
                                    return Err(Error::NotFound {
                                        model: target.name().to_string(),
                                    })
                                }
                            };

                            let pk = target.primary_key();
                            if let Some(requested) = filters.get(pk) {
                                let p = Predicate::equals(&target, pk, requested.clone())?;
                                if !p.accepts(&key) {
                                    return Err(Error::NotFound {
                                        model: target.name().to_string(),
                                    });
                                }
                            }
                            filters.insert(pk.to_string(), key);
                        }

                        fetch.call(parent, ctx, &filters)
                    }),
                );
            }
        }

        Ok(resolvers)
    }

    fn get_self_resolver(&self, model: &Model) -> FetchOne {
        let model = model.clone();
        FetchOne::new(move |_parent, ctx, filters| {
            trace!(
                "fetch one resolver called -- model: {}, filters: {:#?}",
                model.name(),
                filters
            );

            let predicates = predicates(&model, filters)?;
            ctx.store().fetch_one(&model, &predicates)
        })
    }

    fn get_self_many_resolver(&self, model: &Model) -> FetchMany {
        let model = model.clone();
        FetchMany::new(move |_parent, ctx, filters| {
            trace!(
                "fetch many resolver called -- model: {}, filters: {:#?}",
                model.name(),
                filters
            );

            let predicates = predicates(&model, filters)?;
            ctx.store().fetch_many(&model, &predicates)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{graphql_type, CatalogMapper, Mapper};
    use crate::engine::config::{mock_widget_catalog, FieldKind, Model};
    use crate::engine::context::GraphQLContext;
    use crate::engine::database::memory::MemoryStore;
    use crate::engine::database::{Predicate, Record, Records, Store};
    use crate::engine::schema::{GraphqlType, Lineage, PropertyKind};
    use crate::engine::value::Value;
    use crate::error::Error;
    use maplit::hashmap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    impl Store for CountingStore {
        fn fetch_one(&self, model: &Model, predicates: &[Predicate]) -> Result<Record, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_one(model, predicates)
        }

        fn fetch_many(&self, model: &Model, predicates: &[Predicate]) -> Result<Records, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_many(model, predicates)
        }
    }

    fn seeded_store() -> Arc<CountingStore> {
        let store = CountingStore::default();
        store
            .inner
            .insert(Record::new(
                "FactoryMachine",
                hashmap! {
                    "id".to_string() => Value::Int64(1),
                    "name".to_string() => Value::from("Green Machine"),
                },
            ))
            .unwrap();
        for (id, color) in &[(7, "green"), (8, "blue"), (9, "green")] {
            store
                .inner
                .insert(Record::new(
                    "Widget",
                    hashmap! {
                        "id".to_string() => Value::Int64(*id),
                        "size".to_string() => Value::Int64(3),
                        "color".to_string() => Value::from(*color),
                        "constructed_with".to_string() => Value::Int64(1),
                    },
                ))
                .unwrap();
        }
        Arc::new(store)
    }

    fn mock_mapper() -> CatalogMapper {
        CatalogMapper::new(Arc::new(mock_widget_catalog()))
    }

    /// Passes if every primitive kind maps according to the translation table
    #[test]
    fn translation_table() {
        assert_eq!(graphql_type(FieldKind::BigInteger), Some(GraphqlType::Int));
        assert_eq!(graphql_type(FieldKind::Integer), Some(GraphqlType::Int));
        assert_eq!(graphql_type(FieldKind::Boolean), Some(GraphqlType::Boolean));
        assert_eq!(graphql_type(FieldKind::Char), Some(GraphqlType::String));
        assert_eq!(graphql_type(FieldKind::FixedChar), Some(GraphqlType::String));
        assert_eq!(graphql_type(FieldKind::Text), Some(GraphqlType::String));
        assert_eq!(graphql_type(FieldKind::Decimal), Some(GraphqlType::Float));
        assert_eq!(graphql_type(FieldKind::Double), Some(GraphqlType::Float));
        assert_eq!(graphql_type(FieldKind::Float), Some(GraphqlType::Float));
        assert_eq!(graphql_type(FieldKind::PrimaryKey), Some(GraphqlType::ID));
        assert_eq!(graphql_type(FieldKind::Uuid), Some(GraphqlType::Uuid));

        for k in &[
            FieldKind::Bare,
            FieldKind::Binary,
            FieldKind::Blob,
            FieldKind::Date,
            FieldKind::DateTime,
            FieldKind::Time,
        ] {
            assert!(graphql_type(*k).is_none());
        }
    }

    /// Passes if scalar fields carry their kind, description, and default
    #[test]
    fn get_fields_scalar() {
        let mapper = mock_mapper();
        let m = mapper.catalog().model("Widget").unwrap();
        let props = mapper.get_fields(m, &mut Lineage::new()).unwrap();

        let color = props.iter().find(|p| p.name() == "color").unwrap();
        assert_eq!(color.description(), Some("The widget color"));
        match color.kind() {
            PropertyKind::Scalar { type_name, default } => {
                assert_eq!(*type_name, GraphqlType::String);
                assert!(default.is_none());
            }
            _ => panic!("Expected a scalar property"),
        }
    }

    /// Passes if the reference field's filter arguments exclude unmapped fields of the target
    #[test]
    fn get_fields_reference() {
        let mapper = mock_mapper();
        let m = mapper.catalog().model("Widget").unwrap();
        let props = mapper.get_fields(m, &mut Lineage::new()).unwrap();

        let cw = props.iter().find(|p| p.name() == "constructed_with").unwrap();
        assert_eq!(cw.graphql_name(), "constructedWith");
        assert_eq!(cw.type_name(), "FactoryMachine");
        match cw.kind() {
            PropertyKind::Object { arguments, .. } => {
                assert_eq!(
                    arguments
                        .iter()
                        .map(|a| (a.graphql_name(), a.type_name()))
                        .collect::<Vec<_>>(),
                    vec![("id", GraphqlType::ID), ("name", GraphqlType::String)]
                );
            }
            _ => panic!("Expected an object property"),
        }
    }

    /// Passes if the fetch one resolver returns the matching record
    #[test]
    fn self_resolver() {
        let store = seeded_store();
        let ctx = GraphQLContext::new(store.clone());
        let mapper = mock_mapper();
        let r = mapper.get_self_resolver(mapper.catalog().model("Widget").unwrap());

        let w = r
            .call(None, &ctx, &hashmap! {"id".to_string() => Value::from("8")})
            .unwrap();
        assert_eq!(w.get("color"), Some(&Value::from("blue")));
    }

    /// Passes if the fetch one resolver passes NotFound through
    #[test]
    fn self_resolver_not_found() {
        let store = seeded_store();
        let ctx = GraphQLContext::new(store.clone());
        let mapper = mock_mapper();
        let r = mapper.get_self_resolver(mapper.catalog().model("Widget").unwrap());

        match r.call(None, &ctx, &hashmap! {"id".to_string() => Value::Int64(99)}) {
            Err(Error::NotFound { model }) => assert_eq!(model, "Widget"),
            _ => panic!("Expected NotFound"),
        }
    }

    /// Passes if the fetch many resolver returns every match, and nothing for no match
    #[test]
    fn self_many_resolver() {
        let store = seeded_store();
        let ctx = GraphQLContext::new(store.clone());
        let mapper = mock_mapper();
        let r = mapper.get_self_many_resolver(mapper.catalog().model("Widget").unwrap());

        let ids = r
            .call(
                None,
                &ctx,
                &hashmap! {"color".to_string() => Value::from("green")},
            )
            .unwrap()
            .map(|w| w.get("id").cloned().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![Value::Int64(7), Value::Int64(9)]);

        let none = r
            .call(None, &ctx, &hashmap! {"color".to_string() => Value::from("red")})
            .unwrap();
        assert_eq!(none.count(), 0);
    }

    /// Passes if an unknown filter fails before the store is called
    #[test]
    fn unknown_filter_field() {
        let store = seeded_store();
        let ctx = GraphQLContext::new(store.clone());
        let mapper = mock_mapper();
        let m = mapper.catalog().model("Widget").unwrap();

        match mapper.get_self_resolver(m).call(
            None,
            &ctx,
            &hashmap! {"weight".to_string() => Value::Int64(5)},
        ) {
            Err(Error::UnknownFilterField { model, field }) => {
                assert_eq!(model, "Widget");
                assert_eq!(field, "weight");
            }
            _ => panic!("Expected UnknownFilterField"),
        }

        assert!(mapper
            .get_self_many_resolver(m)
            .call(None, &ctx, &hashmap! {"weight".to_string() => Value::Int64(5)})
            .is_err());

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    /// Passes if the reference resolver follows the parent's stored key, however it is stored
    #[test]
    fn reference_resolver() {
        let store = seeded_store();
        let ctx = GraphQLContext::new(store.clone());
        let mapper = mock_mapper();
        let resolvers = mapper
            .get_resolvers(mapper.catalog().model("Widget").unwrap())
            .unwrap();
        assert_eq!(resolvers.len(), 1);

        let parent = Record::new(
            "Widget",
            hashmap! {"constructed_with".to_string() => Value::Int64(1)},
        );
        let r = resolvers.get("resolve_constructed_with").unwrap();

        let machine = r.call(Some(&parent), &ctx, &hashmap! {}).unwrap();
        assert_eq!(machine.get("name"), Some(&Value::from("Green Machine")));

        let other = r.call(
            Some(&parent),
            &ctx,
            &hashmap! {"id".to_string() => Value::from("2")},
        );
        assert!(matches!(other, Err(Error::NotFound { .. })));

        let string_key = Record::new(
            "Widget",
            hashmap! {"constructed_with".to_string() => Value::from("1")},
        );
        let machine = r
            .call(
                Some(&string_key),
                &ctx,
                &hashmap! {"id".to_string() => Value::from("1")},
            )
            .unwrap();
        assert_eq!(machine.get("name"), Some(&Value::from("Green Machine")));

        let orphan = Record::new("Widget", hashmap! {});
        assert!(matches!(
            r.call(Some(&orphan), &ctx, &hashmap! {}),
            Err(Error::NotFound { .. })
        ));
    }
}
