//! Lenient deserializers for fields the Appserver emits inconsistently

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, number, or null and produce a string ("" for null)
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
}

/// Accept a string, number, or null and produce an optional string
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Accept an integer or a numeric string
pub fn opt_u64_lenient<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Treat an explicit null like a missing field
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_u64_lenient")]
        expires_in: Option<u64>,
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let probe: Probe = serde_json::from_str(r#"{"id": 42, "expires_in": "3600"}"#).unwrap();
        assert_eq!(probe.id, "42");
        assert_eq!(probe.expires_in, Some(3600));
    }

    #[test]
    fn test_nulls_and_missing_fields() {
        let probe: Probe = serde_json::from_str(r#"{"id": null, "name": null}"#).unwrap();
        assert_eq!(probe.id, "");
        assert_eq!(probe.name, "");
        assert_eq!(probe.expires_in, None);
    }
}
