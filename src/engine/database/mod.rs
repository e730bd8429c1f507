//! Traits and helper structs for interacting with the record storage layer

pub mod memory;

use crate::engine::config::{FieldKind, Model};
use crate::engine::value::Value;
use crate::error::Error;
use std::collections::HashMap;
use std::fmt::Debug;

/// A stored record of a model, as returned by a [`Store`].
///
/// [`Store`]: trait.Store.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::database::Record;
/// use graphqlize::engine::value::Value;
/// use std::collections::HashMap;
///
/// let mut fields = HashMap::new();
/// fields.insert("name".to_string(), Value::from("Green Machine"));
///
/// let r = Record::new("FactoryMachine", fields);
/// assert_eq!(r.get("name"), Some(&Value::from("Green Machine")));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    model: String,
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(model: &str, fields: HashMap<String, Value>) -> Record {
        Record {
            model: model.to_string(),
            fields,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Lazy sequence of records returned by [`Store::fetch_many`]. Calling `fetch_many` again
/// produces a fresh sequence.
///
/// [`Store::fetch_many`]: trait.Store.html#tymethod.fetch_many
pub type Records = Box<dyn Iterator<Item = Record>>;

/// An equality test of one field of a model against a value.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    field: String,
    kind: Option<FieldKind>,
    value: Value,
}

impl Predicate {
    /// Builds the predicate `model.field == value`, converting the value to the field's stored
    /// representation.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownFilterField`] if `model` has no field named `field`, and
    /// [`TypeConversionFailed`] if the value cannot represent the field's kind.
    ///
    /// [`UnknownFilterField`]: ../../error/enum.Error.html#variant.UnknownFilterField
    /// [`TypeConversionFailed`]: ../../error/enum.Error.html#variant.TypeConversionFailed
    pub fn equals(model: &Model, field: &str, value: Value) -> Result<Predicate, Error> {
        let mf = model.field(field).ok_or_else(|| Error::UnknownFilterField {
            model: model.name().to_string(),
            field: field.to_string(),
        })?;

        let kind = mf.kind();
        let value = match kind {
            Some(kind) => kind.coerce(value)?,
            None => value,
        };

        Ok(Predicate {
            field: field.to_string(),
            kind,
            value,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// True if `stored` equals this predicate's value under the field kind's equality
    pub fn accepts(&self, stored: &Value) -> bool {
        match self.kind {
            Some(kind) => kind.same_value(stored, &self.value),
            None => stored == &self.value,
        }
    }

    /// True if the record holds this predicate's value in this predicate's field
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .map_or(self.value.is_null(), |v| self.accepts(v))
    }
}

/// Contract of the storage layer that executes fetches on behalf of generated resolvers. The
/// predicates passed in are a conjunction; an empty slice matches every record of the model.
pub trait Store: Debug + Send + Sync {
    /// Returns the first record of `model` that satisfies every predicate.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if no record matches.
    ///
    /// [`NotFound`]: ../../error/enum.Error.html#variant.NotFound
    fn fetch_one(&self, model: &Model, predicates: &[Predicate]) -> Result<Record, Error>;

    /// Returns every record of `model` that satisfies every predicate, in storage order.
    fn fetch_many(&self, model: &Model, predicates: &[Predicate]) -> Result<Records, Error>;
}

#[cfg(test)]
mod tests {
    use super::{Predicate, Record};
    use crate::engine::config::{mock_widget_catalog, FieldKind, Model, ModelField};
    use crate::engine::value::Value;
    use crate::error::Error;
    use maplit::hashmap;

    /// Passes if a predicate on an existing field is built with a coerced value
    #[test]
    fn predicate_eq() {
        let c = mock_widget_catalog();
        let p = Predicate::equals(c.model("Widget").unwrap(), "id", Value::from("7")).unwrap();

        assert_eq!(p.field(), "id");
        assert_eq!(p.value(), &Value::Int64(7));
    }

    /// Passes if a predicate on a missing field names the model and field in its error
    #[test]
    fn predicate_unknown_field() {
        let c = mock_widget_catalog();

        match Predicate::equals(c.model("Widget").unwrap(), "weight", Value::Int64(5)) {
            Err(Error::UnknownFilterField { model, field }) => {
                assert_eq!(model, "Widget");
                assert_eq!(field, "weight");
            }
            _ => panic!("Expected UnknownFilterField"),
        }
    }

    /// Passes if a predicate matches records holding its value, and only those
    #[test]
    fn predicate_matches() {
        let c = mock_widget_catalog();
        let p = Predicate::equals(c.model("Widget").unwrap(), "color", Value::from("green")).unwrap();

        let green = Record::new(
            "Widget",
            hashmap! {"color".to_string() => Value::from("green")},
        );
        let blue = Record::new("Widget", hashmap! {"color".to_string() => Value::from("blue")});
        let bare = Record::new("Widget", hashmap! {});

        assert!(p.matches(&green));
        assert!(!p.matches(&blue));
        assert!(!p.matches(&bare));
    }

    /// Passes if a numeric key filter matches a key stored as a string, and a float filter
    /// matches a float field stored as an integer
    #[test]
    fn predicate_matches_stored_representation() {
        let m = Model::new(
            "Tag",
            vec![
                ModelField::primitive("id", FieldKind::PrimaryKey),
                ModelField::primitive("weight", FieldKind::Double),
            ],
        );
        let tag = Record::new(
            "Tag",
            hashmap! {
                "id".to_string() => Value::from("1"),
                "weight".to_string() => Value::Int64(1),
            },
        );

        let by_id = Predicate::equals(&m, "id", Value::from("1")).unwrap();
        assert_eq!(by_id.value(), &Value::Int64(1));
        assert!(by_id.matches(&tag));

        let by_weight = Predicate::equals(&m, "weight", Value::Float64(1.0)).unwrap();
        assert!(by_weight.matches(&tag));

        let other = Predicate::equals(&m, "id", Value::from("2")).unwrap();
        assert!(!other.matches(&tag));
    }
}
