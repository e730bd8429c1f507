//! Model catalog: the data models, their fields, and the references between them, from which
//! GraphQL node types are generated.

use crate::engine::value::Value;
use crate::error::Error;
use inflector::Inflector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::{TryFrom, TryInto};
use std::fs::File;
use std::io::BufReader;

/// Names that cannot be used for a model, because the generated schema already uses them.
const RESERVED_NAMES: [&str; 7] = ["Boolean", "Float", "ID", "Int", "Query", "String", "Uuid"];

/// Primitive kinds a model field may be declared with.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum FieldKind {
    Bare,
    BigInteger,
    Binary,
    Blob,
    Boolean,
    Char,
    Date,
    DateTime,
    Decimal,
    Double,
    FixedChar,
    Float,
    Integer,
    PrimaryKey,
    Text,
    Time,
    Uuid,
}

impl FieldKind {
    /// Converts a filter value into the representation records of this kind are stored with, so
    /// that an equality predicate compares like with like. For example, an `ID` argument arrives
    /// as the string `"7"` but an integer primary key is stored as `7`.
    pub fn coerce(self, value: Value) -> Result<Value, Error> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (FieldKind::PrimaryKey, Value::String(s)) => {
                Ok(s.parse::<i64>().map_or(Value::String(s), Value::Int64))
            }
            (FieldKind::BigInteger, Value::String(s)) | (FieldKind::Integer, Value::String(s)) => s
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| Error::TypeConversionFailed {
                    src: s,
                    dst: format!("{:?}", self),
                }),
            (FieldKind::BigInteger, v @ Value::UInt64(_))
            | (FieldKind::Integer, v @ Value::UInt64(_))
            | (FieldKind::PrimaryKey, v @ Value::UInt64(_)) => Ok(Value::Int64(v.try_into()?)),
            (FieldKind::Decimal, Value::Int64(i))
            | (FieldKind::Double, Value::Int64(i))
            | (FieldKind::Float, Value::Int64(i)) => Ok(Value::Float64(i as f64)),
            (FieldKind::Uuid, Value::String(s)) => Ok(Value::String(s.to_lowercase())),
            (_, v) => Ok(v),
        }
    }

    /// True if a stored value of this kind equals a filter value. Keys compare by their `ID`
    /// rendering, so `"1"` and `1` are the same key. Floating point kinds compare numerically
    /// and uuids ignore letter case. Other kinds use plain value equality.
    pub fn same_value(self, stored: &Value, wanted: &Value) -> bool {
        match self {
            FieldKind::PrimaryKey => match (stored.to_id_string(), wanted.to_id_string()) {
                (Ok(s), Ok(w)) => s == w,
                _ => stored == wanted,
            },
            FieldKind::Decimal | FieldKind::Double | FieldKind::Float => {
                match (f64::try_from(stored.clone()), f64::try_from(wanted.clone())) {
                    (Ok(s), Ok(w)) => s == w,
                    _ => stored == wanted,
                }
            }
            FieldKind::Uuid => match (stored, wanted) {
                (Value::String(s), Value::String(w)) => s.eq_ignore_ascii_case(w),
                _ => stored == wanted,
            },
            _ => stored == wanted,
        }
    }
}

/// Describes what a model field holds: a primitive value, or a reference to a record of
/// another model.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldDescriptor {
    Primitive {
        kind: FieldKind,
        description: Option<String>,
        default: Option<Value>,
    },
    Reference {
        model: String,
    },
}

/// Serialized shape of a [`ModelField`]. A field carries either a `type` or a `references`
/// entry, never both.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct FieldDef {
    name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<FieldKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    references: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl TryFrom<FieldDef> for ModelField {
    type Error = Error;

    fn try_from(fd: FieldDef) -> Result<ModelField, Error> {
        let descriptor = match (fd.kind, fd.references) {
            (Some(kind), None) => FieldDescriptor::Primitive {
                kind,
                description: fd.description,
                default: fd.default,
            },
            (None, Some(model)) => FieldDescriptor::Reference { model },
            _ => return Err(Error::FieldDefinitionInvalid { name: fd.name }),
        };

        Ok(ModelField {
            name: fd.name,
            descriptor,
        })
    }
}

impl From<ModelField> for FieldDef {
    fn from(mf: ModelField) -> FieldDef {
        match mf.descriptor {
            FieldDescriptor::Primitive {
                kind,
                description,
                default,
            } => FieldDef {
                name: mf.name,
                kind: Some(kind),
                references: None,
                description,
                default,
            },
            FieldDescriptor::Reference { model } => FieldDef {
                name: mf.name,
                kind: None,
                references: Some(model),
                description: None,
                default: None,
            },
        }
    }
}

/// A named field of a [`Model`].
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::{FieldKind, ModelField};
///
/// let color = ModelField::primitive("color", FieldKind::Char)
///     .with_description("The widget color");
/// let machine = ModelField::reference("constructed_with", "FactoryMachine");
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "FieldDef", into = "FieldDef")]
pub struct ModelField {
    name: String,
    descriptor: FieldDescriptor,
}

impl ModelField {
    pub fn new(name: &str, descriptor: FieldDescriptor) -> ModelField {
        ModelField {
            name: name.to_string(),
            descriptor,
        }
    }

    /// Creates a primitive field with no description and no default value
    pub fn primitive(name: &str, kind: FieldKind) -> ModelField {
        ModelField::new(
            name,
            FieldDescriptor::Primitive {
                kind,
                description: None,
                default: None,
            },
        )
    }

    /// Creates a field referencing a record of the model named `model`
    pub fn reference(name: &str, model: &str) -> ModelField {
        ModelField::new(
            name,
            FieldDescriptor::Reference {
                model: model.to_string(),
            },
        )
    }

    /// Sets the description of a primitive field. Has no effect on a reference field.
    pub fn with_description(mut self, text: &str) -> ModelField {
        if let FieldDescriptor::Primitive { description, .. } = &mut self.descriptor {
            *description = Some(text.to_string());
        }
        self
    }

    /// Sets the default value of a primitive field. Has no effect on a reference field.
    pub fn with_default(mut self, value: Value) -> ModelField {
        if let FieldDescriptor::Primitive { default, .. } = &mut self.descriptor {
            *default = Some(value);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Returns the primitive kind, or `None` for a reference field
    pub fn kind(&self) -> Option<FieldKind> {
        match &self.descriptor {
            FieldDescriptor::Primitive { kind, .. } => Some(*kind),
            FieldDescriptor::Reference { .. } => None,
        }
    }

    /// Returns the name of the referenced model, or `None` for a primitive field
    pub fn references(&self) -> Option<&str> {
        match &self.descriptor {
            FieldDescriptor::Primitive { .. } => None,
            FieldDescriptor::Reference { model } => Some(model),
        }
    }
}

/// A data model: a name and an ordered list of fields.
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::{FieldKind, Model, ModelField};
///
/// let m = Model::new(
///     "FactoryMachine",
///     vec![
///         ModelField::primitive("id", FieldKind::PrimaryKey),
///         ModelField::primitive("name", FieldKind::Char),
///     ],
/// );
/// assert_eq!(m.primary_key(), "id");
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Model {
    /// Name of the model, also used as the name of the generated GraphQL type
    name: String,

    /// Fields of the model, in declaration order
    #[serde(default)]
    fields: Vec<ModelField>,
}

impl Model {
    pub fn new(name: &str, fields: Vec<ModelField>) -> Model {
        Model {
            name: name.to_string(),
            fields,
        }
    }

    /// Creates a new [`Model`] data structure from a yaml-formatted string
    ///
    /// [`Model`]: struct.Model.html
    pub fn from_yaml(yaml: &str) -> Result<Model, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> std::slice::Iter<ModelField> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Name of the field that identifies a record: the first `PrimaryKey` field, or `id` if the
    /// model declares none.
    pub fn primary_key(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.kind() == Some(FieldKind::PrimaryKey))
            .map_or("id", |f| f.name())
    }
}

/// A set of models that may reference one another.
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::Catalog;
///
/// let c = Catalog::from_yaml("
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
/// assert!(c.validate().is_ok());
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Catalog {
    /// Version of the catalog file format used
    pub version: i32,

    /// The models of the catalog
    #[serde(default)]
    pub models: Vec<Model>,
}

impl Catalog {
    pub fn new(version: i32, models: Vec<Model>) -> Catalog {
        Catalog { version, models }
    }

    /// Creates a new [`Catalog`] data structure from a yaml-formatted string
    ///
    /// [`Catalog`]: struct.Catalog.html
    pub fn from_yaml(yaml: &str) -> Result<Catalog, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Creates a new [`Catalog`] data structure from the contents of the specified file.
    ///
    /// [`Catalog`]: struct.Catalog.html
    ///
    /// # Errors
    ///
    /// Returns [`ConfigOpenFailed`] if the file could not be opened, or
    /// [`DeserializationFailed`] if its contents are not a valid catalog.
    ///
    /// [`ConfigOpenFailed`]: ../../error/enum.Error.html#variant.ConfigOpenFailed
    /// [`DeserializationFailed`]: ../../error/enum.Error.html#variant.DeserializationFailed
    pub fn from_file(path: &str) -> Result<Catalog, Error> {
        let f = File::open(path)?;
        let r = BufReader::new(f);
        Ok(serde_yaml::from_reader(r)?)
    }

    pub fn models(&self) -> std::slice::Iter<Model> {
        self.models.iter()
    }

    pub fn model(&self, name: &str) -> Result<&Model, Error> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| Error::ModelNotFound {
                name: name.to_string(),
            })
    }

    /// Checks that model names are unique and not reserved, that field names are unique within
    /// each model, and that every reference names a model of this catalog. Field names are
    /// compared as exposed in the schema, so `user_id` and `userId` collide.
    pub fn validate(&self) -> Result<(), Error> {
        let mut model_names = HashSet::new();

        for m in &self.models {
            if !model_names.insert(m.name()) {
                return Err(Error::ConfigItemDuplicated {
                    type_name: m.name().to_string(),
                });
            }

            if RESERVED_NAMES.iter().any(|r| *r == m.name()) || m.name().starts_with("__") {
                return Err(Error::ConfigItemReserved {
                    type_name: m.name().to_string(),
                });
            }

            let mut field_names = HashSet::new();
            for f in m.fields() {
                if !field_names.insert(f.name().to_camel_case()) {
                    return Err(Error::ConfigItemDuplicated {
                        type_name: format!("{}::{}", m.name(), f.name()),
                    });
                }

                if let Some(target) = f.references() {
                    self.model(target)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new(1, Vec::new())
    }
}

/// Creates a combined [`Catalog`] from several catalogs, which must all have the same version.
///
/// [`Catalog`]: struct.Catalog.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::config::{compose, Catalog};
///
/// let c = compose(vec![Catalog::default(), Catalog::default()]).unwrap();
/// assert_eq!(c.version, 1);
/// ```
pub fn compose(catalogs: Vec<Catalog>) -> Result<Catalog, Error> {
    let mut version: Option<i32> = None;
    let mut models = Vec::new();

    for c in catalogs {
        let v = *version.get_or_insert(c.version);
        if v != c.version {
            return Err(Error::ConfigVersionMismatched {
                expected: v,
                found: c.version,
            });
        }

        models.extend(c.models);
    }

    Ok(Catalog::new(version.unwrap_or(1), models))
}

#[cfg(test)]
pub(crate) fn mock_widget_catalog() -> Catalog {
    Catalog::new(
        1,
        vec![
            Model::new(
                "Widget",
                vec![
                    ModelField::primitive("id", FieldKind::PrimaryKey),
                    ModelField::primitive("size", FieldKind::Integer),
                    ModelField::primitive("color", FieldKind::Char)
                        .with_description("The widget color"),
                    ModelField::reference("constructed_with", "FactoryMachine"),
                ],
            ),
            Model::new(
                "FactoryMachine",
                vec![
                    ModelField::primitive("id", FieldKind::PrimaryKey),
                    ModelField::primitive("name", FieldKind::Char),
                    ModelField::primitive("installed", FieldKind::DateTime),
                ],
            ),
        ],
    )
}
