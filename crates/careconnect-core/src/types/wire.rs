//! Lenient deserializers for loosely typed backend fields.
//!
//! The backend stores identifiers and fees as whatever the submitting form
//! produced, so the same field can arrive as a number or a string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

/// Accepts string or numeric identifiers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Like [`deserialize_id`], with `null` read as absent.
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// Reads a fee from a number or a numeric string.
///
/// Empty strings, `null`, negative and otherwise unparsable values are
/// read as unset so the platform default applies.
pub(crate) fn deserialize_fee<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|fee| u32::try_from(fee).ok())
            .or_else(|| number.as_f64().and_then(whole_fee)),
        Some(Value::String(text)) => {
            let text = text.trim();
            text.parse::<u32>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_fee))
        }
        _ => None,
    })
}

fn whole_fee(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value)).then(|| value as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Record {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        other: Option<String>,
        #[serde(default, deserialize_with = "deserialize_fee")]
        fee: Option<u32>,
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        assert_eq!(record(json!({ "id": 7 })).id, "7");
        assert_eq!(record(json!({ "id": "doc-1" })).id, "doc-1");
        assert_eq!(record(json!({ "id": 1, "other": 42 })).other.as_deref(), Some("42"));
        assert_eq!(record(json!({ "id": 1, "other": null })).other, None);
        assert_eq!(record(json!({ "id": 1 })).other, None);
    }

    #[test]
    fn test_id_rejects_other_shapes() {
        assert!(serde_json::from_value::<Record>(json!({ "id": [1] })).is_err());
        assert!(serde_json::from_value::<Record>(json!({ "id": null })).is_err());
    }

    #[test]
    fn test_fee_from_form_strings() {
        assert_eq!(record(json!({ "id": 1, "fee": "800" })).fee, Some(800));
        assert_eq!(record(json!({ "id": 1, "fee": " 650 " })).fee, Some(650));
        assert_eq!(record(json!({ "id": 1, "fee": "" })).fee, None);
        assert_eq!(record(json!({ "id": 1, "fee": "free" })).fee, None);
    }

    #[test]
    fn test_fee_from_numbers() {
        assert_eq!(record(json!({ "id": 1, "fee": 800 })).fee, Some(800));
        assert_eq!(record(json!({ "id": 1, "fee": 800.0 })).fee, Some(800));
        assert_eq!(record(json!({ "id": 1, "fee": 12.5 })).fee, None);
        assert_eq!(record(json!({ "id": 1, "fee": -5 })).fee, None);
        assert_eq!(record(json!({ "id": 1, "fee": null })).fee, None);
        assert_eq!(record(json!({ "id": 1, "fee": true })).fee, None);
    }
}
