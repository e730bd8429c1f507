//! This module provides the node generator and the schema data structures it produces. A
//! [`Mapper`] describes a model; [`generate`] turns that description into a [`NodeType`], and a
//! [`SchemaBuilder`] embeds node types in a query root and builds the Juniper `RootNode`.
//!
//! [`Mapper`]: ../mapper/trait.Mapper.html
//! [`generate`]: fn.generate.html
//! [`NodeType`]: struct.NodeType.html
//! [`SchemaBuilder`]: struct.SchemaBuilder.html

use super::context::GraphQLContext;
use super::mapper::Mapper;
use super::objects::Entity;
use super::resolvers::{resolver_name, FetchMany, FetchOne};
use super::value::Value;
use crate::error::Error;
use inflector::Inflector;
use juniper::{EmptyMutation, EmptySubscription, RootNode};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice::Iter;
use std::sync::Arc;

/// Name of the generated query root type
pub(crate) const QUERY_TYPE: &str = "Query";

pub type RootRef = Arc<
    RootNode<'static, Entity, EmptyMutation<GraphQLContext>, EmptySubscription<GraphQLContext>>,
>;

/// GraphQL scalar types that model fields are translated into
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GraphqlType {
    Boolean,
    Float,
    ID,
    Int,
    String,
    Uuid,
}

impl GraphqlType {
    pub fn name(self) -> &'static str {
        match self {
            GraphqlType::Boolean => "Boolean",
            GraphqlType::Float => "Float",
            GraphqlType::ID => "ID",
            GraphqlType::Int => "Int",
            GraphqlType::String => "String",
            GraphqlType::Uuid => "Uuid",
        }
    }
}

/// An equality filter argument accepted by an embedded node field
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    name: String,
    graphql_name: String,
    type_name: GraphqlType,
    description: Option<String>,
}

impl Argument {
    pub fn new(name: &str, type_name: GraphqlType, description: Option<String>) -> Argument {
        Argument {
            name: name.to_string(),
            graphql_name: name.to_camel_case(),
            type_name,
            description,
        }
    }

    /// Derives a filter argument from a scalar property. Returns `None` for object and list
    /// properties, which cannot be filtered on.
    pub fn from_property(p: &Property) -> Option<Argument> {
        match p.kind() {
            PropertyKind::Scalar { type_name, .. } => Some(Argument::new(
                p.name(),
                *type_name,
                p.description().map(|d| d.to_string()),
            )),
            PropertyKind::Object { .. } | PropertyKind::List { .. } => None,
        }
    }

    /// Name of the model field the argument filters on
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graphql_name(&self) -> &str {
        &self.graphql_name
    }

    pub fn type_name(&self) -> GraphqlType {
        self.type_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Points a nested-object or list property at the node type it returns. A `Pending` reference
/// names a node that was still being generated when the reference was encountered, which is how
/// cyclic model graphs terminate.
#[derive(Clone, Debug)]
pub enum NodeRef {
    Node(Arc<NodeType>),
    Pending(String),
}

impl NodeRef {
    pub fn name(&self) -> &str {
        match self {
            NodeRef::Node(n) => n.name(),
            NodeRef::Pending(name) => name,
        }
    }
}

#[derive(Clone, Debug)]
pub enum PropertyKind {
    Scalar {
        type_name: GraphqlType,
        default: Option<Value>,
    },
    Object {
        node: NodeRef,
        arguments: Vec<Argument>,
        resolver: Option<FetchOne>,
    },
    List {
        node: NodeRef,
        arguments: Vec<Argument>,
        resolver: Option<FetchMany>,
    },
}

/// A field of a generated node type, or of the query root
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    graphql_name: String,
    description: Option<String>,
    kind: PropertyKind,
}

impl Property {
    pub fn new(name: &str, description: Option<String>, kind: PropertyKind) -> Property {
        Property {
            name: name.to_string(),
            graphql_name: name.to_camel_case(),
            description,
            kind,
        }
    }

    /// Name of the model field, used to read records and to build predicates
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the field is exposed under in the GraphQL schema
    pub fn graphql_name(&self) -> &str {
        &self.graphql_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Name of the GraphQL type the property returns, without list or null wrapping
    pub fn type_name(&self) -> &str {
        match &self.kind {
            PropertyKind::Scalar { type_name, .. } => type_name.name(),
            PropertyKind::Object { node, .. } | PropertyKind::List { node, .. } => node.name(),
        }
    }

    pub(crate) fn node(&self) -> Option<&NodeRef> {
        match &self.kind {
            PropertyKind::Scalar { .. } => None,
            PropertyKind::Object { node, .. } | PropertyKind::List { node, .. } => Some(node),
        }
    }
}

/// A queryable object type generated from a model.
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::{FieldKind, Catalog, Model, ModelField};
/// use graphqlize::engine::mapper::CatalogMapper;
/// use graphqlize::engine::schema::generate;
/// use std::sync::Arc;
///
/// let c = Arc::new(Catalog::new(1, vec![Model::new(
///     "FactoryMachine",
///     vec![
///         ModelField::primitive("id", FieldKind::PrimaryKey),
///         ModelField::primitive("name", FieldKind::Char),
///     ],
/// )]));
/// let mapper = CatalogMapper::new(c.clone());
///
/// let node = generate(c.model("FactoryMachine").unwrap(), &mapper).unwrap();
/// assert_eq!(node.name(), "FactoryMachine");
/// assert_eq!(node.props().count(), 2);
/// ```
#[derive(Debug)]
pub struct NodeType {
    name: String,
    props: Vec<Property>,
    resolvers: HashMap<String, FetchOne>,
    fetch_one: FetchOne,
    fetch_many: FetchMany,
    arguments: Vec<Argument>,
}

impl NodeType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields of the node, in the order the model declares them
    pub fn props(&self) -> Iter<Property> {
        self.props.iter()
    }

    pub fn property(&self, name: &str) -> Result<&Property, Error> {
        self.props
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| Error::SchemaItemNotFound {
                name: self.name.to_string() + "::" + name,
            })
    }

    pub fn resolvers(&self) -> &HashMap<String, FetchOne> {
        &self.resolvers
    }

    pub fn resolver(&self, name: &str) -> Result<&FetchOne, Error> {
        self.resolvers
            .get(name)
            .ok_or_else(|| Error::SchemaItemNotFound {
                name: self.name.to_string() + "::" + name,
            })
    }

    pub fn fetch_one(&self) -> &FetchOne {
        &self.fetch_one
    }

    pub fn fetch_many(&self) -> &FetchMany {
        &self.fetch_many
    }

    /// The filter-argument set: one argument per scalar field
    pub fn arguments(&self) -> Iter<Argument> {
        self.arguments.iter()
    }

    /// Embeds the node as a single-object field resolved by its fetch-one resolver
    pub fn as_field(self: &Arc<Self>, name: &str) -> Property {
        Property::new(
            name,
            None,
            PropertyKind::Object {
                node: NodeRef::Node(self.clone()),
                arguments: self.arguments.clone(),
                resolver: Some(self.fetch_one.clone()),
            },
        )
    }

    /// Embeds the node as a list field resolved by its fetch-many resolver
    pub fn as_list_field(self: &Arc<Self>, name: &str) -> Property {
        Property::new(
            name,
            None,
            PropertyKind::List {
                node: NodeRef::Node(self.clone()),
                arguments: self.arguments.clone(),
                resolver: Some(self.fetch_many.clone()),
            },
        )
    }
}

/// Names of the models whose nodes are being generated, outermost first. A reference to a model
/// on the lineage is emitted as a [`NodeRef::Pending`] instead of being generated again.
///
/// [`NodeRef::Pending`]: enum.NodeRef.html#variant.Pending
#[derive(Clone, Debug, Default)]
pub struct Lineage {
    names: Vec<String>,
}

impl Lineage {
    pub fn new() -> Lineage {
        Lineage::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    fn pop(&mut self) {
        self.names.pop();
    }
}

/// Generates a fresh [`NodeType`] for `model`. Nothing is cached; calling this twice for the same
/// model yields two structurally equal, distinct nodes.
///
/// [`NodeType`]: struct.NodeType.html
///
/// # Errors
///
/// Returns any error raised by the mapper, such as [`ModelNotFound`] for a reference to a model
/// the mapper does not know.
///
/// [`ModelNotFound`]: ../../error/enum.Error.html#variant.ModelNotFound
pub fn generate<M: Mapper>(model: &M::Model, mapper: &M) -> Result<Arc<NodeType>, Error> {
    generate_with(model, mapper, &mut Lineage::new())
}

/// Generates a [`NodeType`] as part of an enclosing generation pass, tracked by `lineage`.
/// Mappers call this to build the nodes of referenced models.
///
/// [`NodeType`]: struct.NodeType.html
pub fn generate_with<M: Mapper>(
    model: &M::Model,
    mapper: &M,
    lineage: &mut Lineage,
) -> Result<Arc<NodeType>, Error> {
    let name = mapper.get_name(model);
    trace!(
        "generate_with called -- name: {}, depth: {}",
        name,
        lineage.depth()
    );

    lineage.push(&name);
    let fields = mapper.get_fields(model, lineage);
    lineage.pop();
    let mut props = fields?;

    let resolvers = mapper.get_resolvers(model)?;
    let fetch_one = mapper.get_self_resolver(model);
    let fetch_many = mapper.get_self_many_resolver(model);

    for p in props.iter_mut() {
        if let PropertyKind::Object { resolver, .. } = &mut p.kind {
            if resolver.is_none() {
                *resolver = resolvers.get(&resolver_name(&p.name)).cloned();
            }
        }
    }

    let arguments = props.iter().filter_map(Argument::from_property).collect();

    Ok(Arc::new(NodeType {
        name,
        props,
        resolvers,
        fetch_one,
        fetch_many,
        arguments,
    }))
}

#[derive(Debug)]
pub(crate) struct TypeDefs {
    query: Vec<Property>,
    nodes: HashMap<String, Arc<NodeType>>,
}

/// Carries the type information of the generated schema. Used by Juniper as the `TypeInfo` of
/// [`Entity`] to find the fields of the type being built or resolved.
///
/// [`Entity`]: ../objects/struct.Entity.html
#[derive(Clone, Debug)]
pub struct Info {
    name: String,
    type_defs: Arc<TypeDefs>,
}

impl Info {
    pub(crate) fn new(name: String, type_defs: Arc<TypeDefs>) -> Info {
        Info { name, type_defs }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn type_defs(&self) -> Arc<TypeDefs> {
        self.type_defs.clone()
    }

    pub(crate) fn props(&self) -> Result<&[Property], Error> {
        if self.name == QUERY_TYPE {
            Ok(&self.type_defs.query)
        } else {
            self.type_defs
                .nodes
                .get(&self.name)
                .map(|nt| nt.props.as_slice())
                .ok_or_else(|| Error::SchemaItemNotFound {
                    name: self.name.to_string(),
                })
        }
    }

    /// Finds a property of the current type by its GraphQL field name
    pub(crate) fn property(&self, graphql_name: &str) -> Result<&Property, Error> {
        self.props()?
            .iter()
            .find(|p| p.graphql_name() == graphql_name)
            .ok_or_else(|| Error::SchemaItemNotFound {
                name: self.name.to_string() + "::" + graphql_name,
            })
    }
}

/// Collects query root fields and builds the Juniper root node serving them.
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::{FieldKind, Catalog, Model, ModelField};
/// use graphqlize::engine::mapper::CatalogMapper;
/// use graphqlize::engine::schema::{generate, SchemaBuilder};
/// use std::sync::Arc;
///
/// let c = Arc::new(Catalog::new(1, vec![Model::new(
///     "FactoryMachine",
///     vec![ModelField::primitive("id", FieldKind::PrimaryKey)],
/// )]));
/// let node = generate(c.model("FactoryMachine").unwrap(), &CatalogMapper::new(c.clone())).unwrap();
///
/// let root = SchemaBuilder::new()
///     .field(node.as_field("factoryMachine"))
///     .field(node.as_list_field("factoryMachines"))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    query: Vec<Property>,
}

impl SchemaBuilder {
    pub fn new() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Adds a field to the query root, typically made by [`NodeType::as_field`] or
    /// [`NodeType::as_list_field`]
    ///
    /// [`NodeType::as_field`]: struct.NodeType.html#method.as_field
    /// [`NodeType::as_list_field`]: struct.NodeType.html#method.as_list_field
    pub fn field(mut self, p: Property) -> SchemaBuilder {
        self.query.push(p);
        self
    }

    /// Builds the Juniper root node for the collected query fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigItemDuplicated`] if two root fields share a GraphQL name,
    /// [`ConfigItemReserved`] if a node is named `Query`, [`TypeNotExpected`] if a root field is
    /// a scalar, and [`SchemaItemNotFound`] if a pending node reference names a node that is not
    /// part of the schema.
    ///
    /// [`ConfigItemDuplicated`]: ../../error/enum.Error.html#variant.ConfigItemDuplicated
    /// [`ConfigItemReserved`]: ../../error/enum.Error.html#variant.ConfigItemReserved
    /// [`TypeNotExpected`]: ../../error/enum.Error.html#variant.TypeNotExpected
    /// [`SchemaItemNotFound`]: ../../error/enum.Error.html#variant.SchemaItemNotFound
    pub fn build(self) -> Result<RootRef, Error> {
        let mut field_names = HashSet::new();
        for p in &self.query {
            if p.node().is_none() {
                return Err(Error::TypeNotExpected);
            }

            if !field_names.insert(p.graphql_name()) {
                return Err(Error::ConfigItemDuplicated {
                    type_name: QUERY_TYPE.to_string() + "::" + p.graphql_name(),
                });
            }
        }

        let mut nodes = HashMap::new();
        let mut pending = HashSet::new();
        collect_nodes(&self.query, &mut nodes, &mut pending);

        if nodes.contains_key(QUERY_TYPE) {
            return Err(Error::ConfigItemReserved {
                type_name: QUERY_TYPE.to_string(),
            });
        }

        if let Some(missing) = pending.iter().find(|name| !nodes.contains_key(*name)) {
            return Err(Error::SchemaItemNotFound {
                name: missing.to_string(),
            });
        }

        debug!(
            "SchemaBuilder::build -- root fields: {}, node types: {}",
            self.query.len(),
            nodes.len()
        );

        let type_defs = Arc::new(TypeDefs {
            query: self.query,
            nodes,
        });
        let root_query_info = Info::new(QUERY_TYPE.to_string(), type_defs);

        catch_unwind(AssertUnwindSafe(|| {
            Arc::new(RootNode::new_with_info(
                Entity::root(),
                EmptyMutation::new(),
                EmptySubscription::new(),
                root_query_info,
                (),
                (),
            ))
        }))
        .map_err(|e| {
            e.downcast::<Error>()
                .map(|e| *e)
                .unwrap_or_else(|e| Error::SchemaItemNotFound {
                    name: format!("{:#?}", e),
                })
        })
    }
}

/// Gathers every node type reachable from `props` into `nodes`, keyed by name. The first node
/// seen under a name is kept.
fn collect_nodes(
    props: &[Property],
    nodes: &mut HashMap<String, Arc<NodeType>>,
    pending: &mut HashSet<String>,
) {
    for p in props {
        match p.node() {
            Some(NodeRef::Node(nt)) => {
                if !nodes.contains_key(nt.name()) {
                    nodes.insert(nt.name().to_string(), nt.clone());
                    collect_nodes(&nt.props, nodes, pending);
                }
            }
            Some(NodeRef::Pending(name)) => {
                pending.insert(name.to_string());
            }
            None => (),
        }
    }
}
