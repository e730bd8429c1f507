//! Provides the [`Error`] type for GraphQLize

use std::fmt::{Display, Formatter};

/// Error type for GraphQLize
///
/// # Examples
///
/// ```rust
/// use graphqlize::Error;
///
/// let e = Error::ModelNotFound { name: "Widget".to_string() };
/// ```
#[derive(Debug)]
pub enum Error {
    /// Returned if two models are defined with the same name, or a model defines two fields with
    /// the same name. The `type_name` field contains the duplicated name.
    ConfigItemDuplicated { type_name: String },

    /// Returned if a model is defined with a name that is a reserved word, such as "Query" or a
    /// GraphQL scalar. The field `type_name` is the name that triggered the error.
    ConfigItemReserved { type_name: String },

    /// Returned if a model catalog file cannot be opened, typically because the file cannot be
    /// found on disk
    ConfigOpenFailed { source: std::io::Error },

    /// Returned if attempting to compose catalogs with different versions. The field `expected`
    /// contains the version of the first [`Catalog`], and `found` contains the version of the
    /// [`Catalog`] being merged in.
    ///
    /// [`Catalog`]: ../engine/config/struct.Catalog.html
    ConfigVersionMismatched { expected: i32, found: i32 },

    /// Returned if a model catalog fails to deserialize because the provided data does not match
    /// the expected data structure
    DeserializationFailed { source: serde_yaml::Error },

    /// Returned if a model field declares neither a primitive type nor a referenced model, or
    /// declares both. The `name` field contains the name of the offending field.
    FieldDefinitionInvalid { name: String },

    /// Returned if a reference field names a model that is not part of the catalog. Raised while
    /// generating a node, so schema assembly fails before any query runs.
    ModelNotFound { name: String },

    /// Returned by a store when a fetch for exactly one record finds no match. The `model` field
    /// contains the name of the model that was queried.
    NotFound { model: String },

    /// Returned if a GraphQL response cannot be converted to a serde_json::Value
    SerializationFailed { source: serde_json::Error },

    /// Returned if GraphQLize fails to find an element within a generated schema, such as a node
    /// type, a property, or a resolver. The field is the name of the schema element that could
    /// not be found.
    SchemaItemNotFound { name: String },

    /// Returned if a store's internal lock was poisoned by a panicking writer
    StorePoisoned,

    /// Record contents and filter values are converted between GraphQL, JSON, and the store's
    /// [`Value`] representation. If data fails to convert, this error is returned. The `src`
    /// field contains the source type name or value that could not be converted.
    ///
    /// [`Value`]: ./engine/value/enum.Value.html
    TypeConversionFailed { src: String, dst: String },

    /// Returned if a schema element is used in a way its kind does not allow, such as resolving
    /// a list field that carries no fetch-many resolver.
    TypeNotExpected,

    /// Returned by a generated resolver when a filter argument names a field that the model does
    /// not have. Raised before the store is consulted.
    UnknownFilterField { model: String, field: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Error::ConfigItemDuplicated { type_name } => {
                write!(f, "Model catalog contains duplicate item: {}", type_name)
            }
            Error::ConfigItemReserved { type_name } => {
                write!(f, "Model catalog item cannot use a reserved word as a name: {}", type_name)
            }
            Error::ConfigOpenFailed { source } => {
                write!(f, "Model catalog file could not be opened. Source error: {}", source)
            }
            Error::ConfigVersionMismatched { expected, found } => {
                write!(f, "Model catalogs must be the same version: expected {} but found {}", expected, found)
            }
            Error::DeserializationFailed { source } => {
                write!(f, "Failed to deserialize model catalog. Source error: {}", source)
            }
            Error::FieldDefinitionInvalid { name } => {
                write!(f, "Field {} must declare exactly one of a type or a referenced model", name)
            }
            Error::ModelNotFound { name } => {
                write!(f, "Could not find a model named {} in the catalog", name)
            }
            Error::NotFound { model } => {
                write!(f, "No {} record matches the given filters", model)
            }
            Error::SerializationFailed { source } => {
                write!(f, "Serialization of the GraphQL response failed. Source error: {}", source)
            }
            Error::SchemaItemNotFound { name } => {
                write!(f, "The following item could not be found in the schema: {}", name)
            }
            Error::StorePoisoned => {
                write!(f, "The record store is unusable because a writer panicked")
            }
            Error::TypeConversionFailed { src, dst } => {
                write!(f, "The type or value {} could not be converted to type {}", src, dst)
            }
            Error::TypeNotExpected => {
                write!(f, "GraphQLize encountered a type that was not expected, such as a list field without a fetch-many resolver")
            }
            Error::UnknownFilterField { model, field } => {
                write!(f, "Model {} has no field {}", model, field)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigItemDuplicated { type_name: _ } => None,
            Error::ConfigItemReserved { type_name: _ } => None,
            Error::ConfigOpenFailed { source } => Some(source),
            Error::ConfigVersionMismatched {
                expected: _,
                found: _,
            } => None,
            Error::DeserializationFailed { source } => Some(source),
            Error::FieldDefinitionInvalid { name: _ } => None,
            Error::ModelNotFound { name: _ } => None,
            Error::NotFound { model: _ } => None,
            Error::SerializationFailed { source } => Some(source),
            Error::SchemaItemNotFound { name: _ } => None,
            Error::StorePoisoned => None,
            Error::TypeConversionFailed { src: _, dst: _ } => None,
            Error::TypeNotExpected => None,
            Error::UnknownFilterField { model: _, field: _ } => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::DeserializationFailed { source: e }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::ConfigOpenFailed { source: e }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationFailed { source: e }
    }
}
