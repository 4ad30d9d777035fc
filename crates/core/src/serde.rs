//! Serde helper functions for form deserialization.
//!
//! These functions handle the quirks of HTML form submissions where
//! empty strings should be treated as None for optional fields.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize an optional Uuid, treating empty strings as None.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Deserialize an optional bool, treating empty strings as None.
/// Accepts `true`/`false` as well as the `on`/`off` values sent by checkboxes.
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true" | "on" | "1") => Ok(Some(true)),
        Some("false" | "off" | "0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean value: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test struct that uses the deserializer functions
    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        string_field: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        uuid_field: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        bool_field: Option<bool>,
    }

    #[test]
    fn test_deserialize_optional_string_empty() {
        let json = r#"{"string_field": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_whitespace() {
        let json = r#"{"string_field": "   "}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, None);
    }

    #[test]
    fn test_deserialize_optional_string_value() {
        let json = r#"{"string_field": "hello"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.string_field, Some("hello".to_string()));
    }

    #[test]
    fn test_deserialize_optional_uuid() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"uuid_field": "{id}"}}"#);
        let result: TestStruct = serde_json::from_str(&json).unwrap();
        assert_eq!(result.uuid_field, Some(id));

        let result: TestStruct = serde_json::from_str(r#"{"uuid_field": ""}"#).unwrap();
        assert_eq!(result.uuid_field, None);
    }

    #[test]
    fn test_deserialize_optional_uuid_invalid() {
        let result: Result<TestStruct, _> = serde_json::from_str(r#"{"uuid_field": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_optional_bool() {
        let result: TestStruct = serde_json::from_str(r#"{"bool_field": "on"}"#).unwrap();
        assert_eq!(result.bool_field, Some(true));

        let result: TestStruct = serde_json::from_str(r#"{"bool_field": "false"}"#).unwrap();
        assert_eq!(result.bool_field, Some(false));

        let result: TestStruct = serde_json::from_str(r#"{"bool_field": ""}"#).unwrap();
        assert_eq!(result.bool_field, None);

        let result: Result<TestStruct, _> =
            serde_json::from_str(r#"{"bool_field": "maybe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_fields() {
        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.string_field, None);
        assert_eq!(result.uuid_field, None);
        assert_eq!(result.bool_field, None);
    }
}
