//! GraphQLize derives a queryable GraphQL schema from data model descriptions. Describe the
//! models once, with their typed fields and references to other models, and GraphQLize generates
//! a node type per model, resolvers that fetch one or many records by field filters, and
//! resolvers that follow references into nested nodes.

pub use error::Error;

pub use engine::config::{Catalog, FieldKind, Model, ModelField};
pub use engine::database::Store;
pub use engine::Engine;

pub mod engine;
pub mod error;
