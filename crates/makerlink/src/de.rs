//! Lenient deserializers for values the hub and the voice host send loosely typed.

use serde::de;
use serde::Deserializer;

struct ScalarVisitor;

impl<'de> de::Visitor<'de> for ScalarVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("string, number, boolean, or null")
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ScalarVisitor)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }
}

/// Deserialize an optional field that may arrive as a string or any scalar.
///
/// The maker API app id is typed as a number in some settings backends and as
/// a string in others; both end up as text.
pub fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarVisitor)
}

/// Deserialize a required field that may arrive as a string or any scalar.
///
/// Hub device ids are strings in current firmware and integers in older ones,
/// and spoken levels reach us as either `"68"` or `68`.
pub fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_scalar(deserializer)?
        .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Unit, &"a string or number"))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::scalar")]
        id: String,
        #[serde(default, deserialize_with = "super::optional_scalar")]
        app: Option<String>,
    }

    #[test]
    fn test_scalar_accepts_strings_and_numbers() {
        let s: Sample = serde_json::from_str(r#"{"id": 12, "app": "42"}"#).unwrap();
        assert_eq!(s.id, "12");
        assert_eq!(s.app.as_deref(), Some("42"));

        let s: Sample = serde_json::from_str(r#"{"id": "12", "app": 42}"#).unwrap();
        assert_eq!(s.id, "12");
        assert_eq!(s.app.as_deref(), Some("42"));
    }

    #[test]
    fn test_optional_scalar_null_and_missing() {
        let s: Sample = serde_json::from_str(r#"{"id": "1", "app": null}"#).unwrap();
        assert_eq!(s.app, None);

        let s: Sample = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(s.app, None);
    }

    #[test]
    fn test_scalar_rejects_null() {
        let result = serde_json::from_str::<Sample>(r#"{"id": null}"#);
        assert!(result.is_err());
    }
}
