//! This module provides the GraphQLize engine, including supporting modules for model
//! configuration, field mapping, node generation, resolvers, and the interface to the record
//! store.

use crate::error::Error;
use config::Catalog;
use context::GraphQLContext;
use database::Store;
use inflector::Inflector;
use juniper::http::GraphQLRequest;
use log::debug;
use mapper::CatalogMapper;
use schema::{generate, RootRef, SchemaBuilder};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub mod config;
pub mod context;
pub mod database;
pub mod mapper;
pub mod objects;
pub mod resolvers;
pub mod schema;
pub mod value;

/// Serves GraphQL queries against a generated schema, fetching records from a [`Store`].
///
/// [`Store`]: database/trait.Store.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::Catalog;
/// use graphqlize::engine::database::memory::MemoryStore;
/// use graphqlize::engine::Engine;
/// use std::sync::Arc;
///
/// let catalog = Catalog::from_yaml("
/// version: 1
/// models:
///   - name: FactoryMachine
///     fields:
///       - name: id
///         type: PrimaryKey
///       - name: name
///         type: Char
/// ").unwrap();
///
/// let engine = Engine::from_catalog(catalog, Arc::new(MemoryStore::new())).unwrap();
/// let result = engine.execute_query("query { factoryMachines { name } }").unwrap();
/// assert_eq!(result["data"]["factoryMachines"].as_array().unwrap().len(), 0);
/// ```
#[derive(Clone)]
pub struct Engine {
    root_node: RootRef,
    store: Arc<dyn Store>,
}

impl Engine {
    /// Creates an engine serving a root node built with a [`SchemaBuilder`]
    ///
    /// [`SchemaBuilder`]: schema/struct.SchemaBuilder.html
    pub fn new(root_node: RootRef, store: Arc<dyn Store>) -> Engine {
        Engine { root_node, store }
    }

    /// Creates an engine with one node per catalog model, each exposed on the query root as a
    /// fetch-one field named after the model in camel case, and a fetch-many field named with
    /// its plural. Models whose plural is the singular, such as `Equipment`, get a fetch-many
    /// field with a `List` suffix instead.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Catalog::validate`], from node generation, or from
    /// [`SchemaBuilder::build`].
    ///
    /// [`Catalog::validate`]: config/struct.Catalog.html#method.validate
    /// [`SchemaBuilder::build`]: schema/struct.SchemaBuilder.html#method.build
    pub fn from_catalog(catalog: Catalog, store: Arc<dyn Store>) -> Result<Engine, Error> {
        catalog.validate()?;

        let mapper = CatalogMapper::new(Arc::new(catalog));
        let mut builder = SchemaBuilder::new();
        for m in mapper.catalog().models() {
            let node = generate(m, &mapper)?;
            let field_name = m.name().to_camel_case();
            let list_name = list_field_name(&field_name);
            debug!(
                "Engine::from_catalog -- model: {}, root fields: {}, {}",
                m.name(),
                field_name,
                list_name
            );

            builder = builder
                .field(node.as_field(&field_name))
                .field(node.as_list_field(&list_name));
        }

        Ok(Engine::new(builder.build()?, store))
    }

    /// Executes a GraphQL request and returns the response document, which carries `data` and,
    /// if any field failed, `errors`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationFailed`] if the response cannot be converted to JSON.
    ///
    /// [`SerializationFailed`]: ../error/enum.Error.html#variant.SerializationFailed
    pub fn execute(&self, req: &GraphQLRequest) -> Result<serde_json::Value, Error> {
        let ctx = GraphQLContext::new(self.store.clone());
        let res = req.execute_sync(&*self.root_node, &ctx);
        debug!("Engine::execute -- res.is_ok: {}", res.is_ok());

        Ok(serde_json::to_value(&res)?)
    }

    /// Executes a query given as a string, with no operation name and no variables
    pub fn execute_query(&self, query: &str) -> Result<serde_json::Value, Error> {
        self.execute(&GraphQLRequest::new(query.to_string(), None, None))
    }
}

/// Name of the fetch-many root field for a fetch-one field named `field_name`
fn list_field_name(field_name: &str) -> String {
    let plural = field_name.to_plural();
    if plural == field_name {
        format!("{}List", field_name)
    } else {
        plural
    }
}

impl Debug for Engine {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store)
            .finish()
    }
}
