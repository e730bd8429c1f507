//! This module provides a Juniper Context for GraphQLize queries. The context carries the store
//! that generated resolvers fetch records from.

use crate::engine::database::Store;
use juniper::Context;
use std::sync::Arc;

/// Juniper Context for GraphQLize's GraphQL queries. The [`GraphQLContext`] is used to pass the
/// record [`Store`] in to the resolvers.
///
/// [`GraphQLContext`]: ./struct.GraphQLContext.html
/// [`Store`]: ../database/trait.Store.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::context::GraphQLContext;
/// use graphqlize::engine::database::memory::MemoryStore;
/// use std::sync::Arc;
///
/// let ctx = GraphQLContext::new(Arc::new(MemoryStore::new()));
/// ```
#[derive(Clone, Debug)]
pub struct GraphQLContext {
    store: Arc<dyn Store>,
}

impl GraphQLContext {
    pub fn new(store: Arc<dyn Store>) -> GraphQLContext {
        GraphQLContext { store }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

impl Context for GraphQLContext {}
