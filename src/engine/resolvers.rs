//! Resolver function handles produced by a [`Mapper`] and bound into generated node types.
//!
//! [`Mapper`]: ../mapper/trait.Mapper.html

use crate::engine::context::GraphQLContext;
use crate::engine::database::{Record, Records};
use crate::engine::value::Value;
use crate::error::Error;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Filter arguments of a resolver call, keyed by model field name. Each entry is an equality
/// condition; all entries must hold.
pub type Filters = HashMap<String, Value>;

type FetchOneFunc =
    dyn Fn(Option<&Record>, &GraphQLContext, &Filters) -> Result<Record, Error> + Send + Sync;

type FetchManyFunc =
    dyn Fn(Option<&Record>, &GraphQLContext, &Filters) -> Result<Records, Error> + Send + Sync;

/// Resolver that fetches exactly one record. Called with the parent record, if any, the request
/// context, and the filter arguments.
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::database::Record;
/// use graphqlize::engine::resolvers::FetchOne;
/// use std::collections::HashMap;
///
/// let r = FetchOne::new(|_parent, _ctx, _filters| Ok(Record::new("Widget", HashMap::new())));
/// ```
#[derive(Clone)]
pub struct FetchOne(Arc<FetchOneFunc>);

impl FetchOne {
    pub fn new<F>(f: F) -> FetchOne
    where
        F: Fn(Option<&Record>, &GraphQLContext, &Filters) -> Result<Record, Error>
            + Send
            + Sync
            + 'static,
    {
        FetchOne(Arc::new(f))
    }

    pub fn call(
        &self,
        parent: Option<&Record>,
        ctx: &GraphQLContext,
        filters: &Filters,
    ) -> Result<Record, Error> {
        (self.0)(parent, ctx, filters)
    }
}

impl Debug for FetchOne {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("FetchOne")
    }
}

/// Resolver that fetches every matching record, as a lazy sequence.
#[derive(Clone)]
pub struct FetchMany(Arc<FetchManyFunc>);

impl FetchMany {
    pub fn new<F>(f: F) -> FetchMany
    where
        F: Fn(Option<&Record>, &GraphQLContext, &Filters) -> Result<Records, Error>
            + Send
            + Sync
            + 'static,
    {
        FetchMany(Arc::new(f))
    }

    pub fn call(
        &self,
        parent: Option<&Record>,
        ctx: &GraphQLContext,
        filters: &Filters,
    ) -> Result<Records, Error> {
        (self.0)(parent, ctx, filters)
    }
}

impl Debug for FetchMany {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("FetchMany")
    }
}

/// Name under which the resolver of reference field `field` is registered on a node type
pub fn resolver_name(field: &str) -> String {
    format!("resolve_{}", field)
}
