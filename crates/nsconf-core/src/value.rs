//! Configuration value types
//!
//! Values are scalars (string, int, float, bool, null), sequences or
//! mappings. Namespace files and reference documents are parsed into the
//! parser's own value tree first, then converted: scalar mapping keys become
//! strings and integers outside the `i64` range keep their literal text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configuration value, raw or transformed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value (may contain references)
    String(String),
    /// Sequence of values
    Sequence(Vec<Value>),
    /// Mapping of string keys to values
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a sequence or a mapping
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Get as boolean if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float or Integer
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a Mapping
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Text substituted for this value inside a larger string.
    ///
    /// Scalars use their natural form (`true`/`false` for booleans).
    /// Null and containers are serialized as compact JSON; if that fails
    /// the substitution is empty.
    pub fn to_inline_string(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if n.is_u64() {
                    Value::String(n.to_string())
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(seq) => Value::Sequence(
                seq.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut mapping = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    mapping.insert(yaml_key(k)?, Value::try_from(v)?);
                }
                Value::Mapping(mapping)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

/// Mapping keys must be scalars; they are used in their string form
fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(format!(
            "mapping key must be a scalar, got {}",
            serde_json::to_string(&other).unwrap_or_else(|_| "a nested mapping".to_string())
        )),
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if n.is_u64() {
                    Value::String(n.to_string())
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Sequence(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Mapping(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Mapping(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_i64(), Some(42));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Integer(42).as_f64(), Some(42.0));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert!(Value::Null.is_null());
        assert!(Value::Sequence(vec![]).is_container());
        assert!(!Value::String("x".into()).is_container());
    }

    #[test]
    fn test_inline_string_scalars() {
        assert_eq!(Value::Bool(true).to_inline_string(), "true");
        assert_eq!(Value::Bool(false).to_inline_string(), "false");
        assert_eq!(Value::Integer(5432).to_inline_string(), "5432");
        assert_eq!(Value::Float(1.5).to_inline_string(), "1.5");
        assert_eq!(Value::from("db1").to_inline_string(), "db1");
    }

    #[test]
    fn test_inline_string_containers_are_json() {
        let mut map = IndexMap::new();
        map.insert("path".to_string(), Value::from("/var/lib"));
        map.insert("ports".to_string(), Value::from(vec![80, 443]));

        assert_eq!(
            Value::Mapping(map).to_inline_string(),
            r#"{"path":"/var/lib","ports":[80,443]}"#
        );
        assert_eq!(Value::Null.to_inline_string(), "null");
    }

    #[test]
    fn test_yaml_scalar_keys_become_strings() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "80: http\ntrue: on\n1.5: half\nports:\n  443: https\n",
        )
        .unwrap();
        let value = Value::try_from(yaml).unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["80", "true", "1.5", "ports"]);
        assert_eq!(map["80"], Value::from("http"));
        assert_eq!(map["ports"].as_mapping().unwrap()["443"], Value::from("https"));
    }

    #[test]
    fn test_yaml_sequence_key_is_rejected() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: x\n").unwrap();
        let reason = Value::try_from(yaml).unwrap_err();
        assert_eq!(reason, r#"mapping key must be a scalar, got ["a","b"]"#);
    }

    #[test]
    fn test_integer_beyond_i64_keeps_literal() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("18446744073709551615").unwrap();
        assert_eq!(
            Value::try_from(yaml).unwrap(),
            Value::from("18446744073709551615")
        );

        let json: serde_json::Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(Value::from(json), Value::from("18446744073709551615"));
    }

    #[test]
    fn test_from_json_value() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": [1, 2.5, null], "a": {"on": true}}"#).unwrap();
        let value = Value::from(json);
        let map = value.as_mapping().unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(
            map["b"],
            Value::Sequence(vec![Value::Integer(1), Value::Float(2.5), Value::Null])
        );
        assert_eq!(map["a"].as_mapping().unwrap()["on"], Value::Bool(true));
    }

    #[test]
    fn test_deserialize_from_json_preserves_order() {
        let value: Value = serde_json::from_str(r#"{"b": 1, "a": [true, null, 2.5]}"#).unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(
            map["a"],
            Value::Sequence(vec![Value::Bool(true), Value::Null, Value::Float(2.5)])
        );
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let value: Value = serde_yaml::from_str("host: db1\nport: 5432\n").unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map["host"], Value::from("db1"));
        assert_eq!(map["port"], Value::Integer(5432));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Mapping(IndexMap::new()).type_name(), "mapping");
    }
}
