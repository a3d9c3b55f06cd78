use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::errors::{Result, SerializationError};

/// A JSON object: string keys to arbitrary JSON values.
pub type Record = Map<String, Value>;

pub const NAME_KEY: &str = "name";
pub const DEFAULT_NAME: &str = "World";

/// The `name` field of an input record, narrowed to what the greeter cares about.
///
/// Anything that is not a JSON string (missing, null, number, boolean, array,
/// object) collapses into `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NameField {
    Present(String),
    #[default]
    Absent,
}

impl NameField {
    pub fn from_record(record: &Record) -> Self {
        record.get(NAME_KEY).map(Self::from_value).unwrap_or_default()
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => NameField::Present(name.clone()),
            _ => NameField::Absent,
        }
    }

    /// The name to greet. An empty string is kept as is.
    pub fn resolve(&self) -> &str {
        match self {
            NameField::Present(name) => name,
            NameField::Absent => DEFAULT_NAME,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, NameField::Absent)
    }
}

impl<'de> Deserialize<'de> for NameField {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(NameField::from_value(&value))
    }
}

/// Decodes raw bytes into a record. Valid JSON that is not an object is rejected.
pub fn decode_record(bytes: &[u8]) -> Result<Record> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(record) => Ok(record),
        other => Err(SerializationError::NotAnObject {
            found: json_type_name(&other).to_string(),
        }
        .into()),
    }
}

pub fn encode_record(record: &Record, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    Ok(text)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GreeterError;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_name_field_present() {
        let input = record(json!({"name": "Ada"}));
        assert_eq!(
            NameField::from_record(&input),
            NameField::Present("Ada".to_string())
        );
    }

    #[test]
    fn test_name_field_non_string_is_absent() {
        for value in [
            json!(42),
            json!(true),
            json!(null),
            json!(["Ada"]),
            json!({"first": "Ada"}),
        ] {
            let input = record(json!({ "name": value }));
            assert!(NameField::from_record(&input).is_absent());
        }
    }

    #[test]
    fn test_resolve_keeps_empty_string() {
        let field = NameField::Present(String::new());
        assert_eq!(field.resolve(), "");
        assert_eq!(NameField::Absent.resolve(), "World");
    }

    #[test]
    fn test_decode_record_rejects_non_object() {
        let err = decode_record(b"[1, 2]").unwrap_err();
        match err {
            GreeterError::Serialization(SerializationError::NotAnObject { found }) => {
                assert_eq!(found, "array");
            }
            _ => panic!("Expected NotAnObject error"),
        }
    }

    #[test]
    fn test_decode_record_rejects_invalid_json() {
        let err = decode_record(b"{name: Ada}").unwrap_err();
        assert!(matches!(
            err,
            GreeterError::Serialization(SerializationError::Json { .. })
        ));
    }

    #[test]
    fn test_encode_record_compact() {
        let output = record(json!({"greeting": "Hello Ada!"}));
        assert_eq!(
            encode_record(&output, false).unwrap(),
            r#"{"greeting":"Hello Ada!"}"#
        );
    }
}
