//! Dynamic value representation shared by model defaults, stored records, and filter arguments.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::{TryFrom, TryInto};

/// A field value as held by a [`Record`] or passed as a filter argument.
///
/// [`Record`]: ../database/struct.Record.html
///
/// # Examples
///
/// ```rust
/// use graphqlize::engine::value::Value;
///
/// let v = Value::from("green");
/// assert_eq!(v, Value::String("green".to_string()));
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    String(String),
    Array(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders the value the way a GraphQL `ID` is rendered, as a string. Integer keys are
    /// printed in decimal.
    pub fn to_id_string(&self) -> Result<String, Error> {
        match self {
            Value::String(s) => Ok(s.to_string()),
            Value::Int64(i) => Ok(i.to_string()),
            Value::UInt64(i) => Ok(i.to_string()),
            _ => Err(Error::TypeConversionFailed {
                src: format!("{:#?}", self),
                dst: "ID".to_string(),
            }),
        }
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int64(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(oa)) => a == oa,
            (Value::Bool(b), Value::Bool(ob)) => b == ob,
            (Value::Float64(f), Value::Float64(of)) => f == of,
            (Value::Int64(i), Value::Int64(oi)) => i == oi,
            (Value::Map(m), Value::Map(om)) => m == om,
            (Value::Null, Value::Null) => true,
            (Value::String(s), Value::String(os)) => s == os,
            (Value::UInt64(i), Value::UInt64(oi)) => i == oi,
            (Value::Int64(i), Value::UInt64(u)) | (Value::UInt64(u), Value::Int64(i)) => {
                u64::try_from(*i).map_or(false, |i| i == *u)
            }
            (_, _) => false,
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Value, Error> {
        match value {
            serde_json::Value::Array(a) => {
                let mut v = Vec::new();
                for val in a {
                    v.push(val.try_into()?);
                }
                Ok(Value::Array(v))
            }
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int64(i))
                } else if let Some(i) = n.as_u64() {
                    Ok(Value::UInt64(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float64(f))
                } else {
                    Err(Error::TypeConversionFailed {
                        src: "serde_json::Value::Number".to_string(),
                        dst: "Value".to_string(),
                    })
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Object(m) => {
                let mut hm = HashMap::new();
                for (k, v) in m.into_iter() {
                    hm.insert(k, v.try_into()?);
                }
                Ok(Value::Map(hm))
            }
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = Error;

    fn try_from(value: Value) -> Result<serde_json::Value, Error> {
        match value {
            Value::Array(a) => {
                let mut v = Vec::new();
                for val in a {
                    v.push(val.try_into()?)
                }
                Ok(serde_json::Value::Array(v))
            }
            Value::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Value::Float64(f) => Ok(serde_json::Value::Number(
                serde_json::Number::from_f64(f).ok_or_else(|| Error::TypeConversionFailed {
                    src: "Value::Float64".to_string(),
                    dst: "serde_json::Number".to_string(),
                })?,
            )),
            Value::Int64(i) => Ok(serde_json::Value::Number(i.into())),
            Value::Map(hm) => {
                let mut m = serde_json::Map::new();
                for (k, v) in hm.into_iter() {
                    m.insert(k, v.try_into()?);
                }
                Ok(serde_json::Value::Object(m))
            }
            Value::Null => Ok(serde_json::Value::Null),
            Value::String(s) => Ok(serde_json::Value::String(s)),
            Value::UInt64(i) => Ok(serde_json::Value::Number(i.into())),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<bool, Self::Error> {
        if let Value::Bool(b) = value {
            Ok(b)
        } else {
            Err(Error::TypeConversionFailed {
                src: format!("{:#?}", value),
                dst: "bool".to_string(),
            })
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<f64, Self::Error> {
        match value {
            Value::Int64(i) => Ok(i as f64),
            Value::UInt64(i) => Ok(i as f64),
            Value::Float64(f) => Ok(f),
            _ => Err(Error::TypeConversionFailed {
                src: format!("{:#?}", value),
                dst: "f64".to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = Error;

    fn try_from(value: Value) -> Result<i32, Self::Error> {
        let narrowed = match &value {
            Value::Int64(i) => i32::try_from(*i).ok(),
            Value::UInt64(i) => i32::try_from(*i).ok(),
            _ => None,
        };

        narrowed.ok_or_else(|| Error::TypeConversionFailed {
            src: format!("{:#?}", value),
            dst: "i32".to_string(),
        })
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<i64, Self::Error> {
        match value {
            Value::Int64(i) => Ok(i),
            Value::UInt64(i) => i64::try_from(i).map_err(|_| Error::TypeConversionFailed {
                src: format!("{:#?}", value),
                dst: "i64".to_string(),
            }),
            _ => Err(Error::TypeConversionFailed {
                src: format!("{:#?}", value),
                dst: "i64".to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<String, Self::Error> {
        if let Value::String(s) = value {
            Ok(s)
        } else {
            Err(Error::TypeConversionFailed {
                src: format!("{:#?}", value),
                dst: "String".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use serde_json::json;
    use std::convert::{TryFrom, TryInto};

    /// Passes if an integer key renders as a decimal ID string
    #[test]
    fn id_string_from_integer() {
        assert_eq!(Value::Int64(1).to_id_string().unwrap(), "1");
        assert_eq!(
            Value::String("abc".to_string()).to_id_string().unwrap(),
            "abc"
        );
        assert!(Value::Bool(true).to_id_string().is_err());
    }

    /// Passes if an i64 outside the i32 range fails to narrow
    #[test]
    fn i32_narrowing() {
        assert_eq!(i32::try_from(Value::Int64(3)).unwrap(), 3);
        assert!(i32::try_from(Value::Int64(i64::from(i32::max_value()) + 1)).is_err());
        assert!(i32::try_from(Value::String("3".to_string())).is_err());
    }

    /// Passes if signed and unsigned integers holding the same number compare equal
    #[test]
    fn mixed_sign_equality() {
        assert_eq!(Value::Int64(7), Value::UInt64(7));
        assert_ne!(Value::Int64(-7), Value::UInt64(7));
        assert_ne!(Value::Int64(7), Value::Float64(7.0));
    }

    /// Passes if JSON objects convert into value maps
    #[test]
    fn from_json() {
        let v: Value = json!({"size": 3, "color": "green", "active": null})
            .try_into()
            .unwrap();

        if let Value::Map(m) = v {
            assert_eq!(m.get("size").unwrap(), &Value::Int64(3));
            assert_eq!(m.get("color").unwrap(), &Value::from("green"));
            assert!(m.get("active").unwrap().is_null());
        } else {
            panic!("Expected a map");
        }
    }

    /// Passes if untagged deserialization picks the narrowest variant
    #[test]
    fn deserialize_yaml_scalars() {
        let v: Vec<Value> = serde_yaml::from_str("[3, 2.5, true, green, null]").unwrap();

        assert_eq!(
            v,
            vec![
                Value::Int64(3),
                Value::Float64(2.5),
                Value::Bool(true),
                Value::from("green"),
                Value::Null
            ]
        );
    }
}
