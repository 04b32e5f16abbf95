//! Loosely typed configuration as hosts provide it.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Configuration bag before normalization.
///
/// Numeric fields accept JSON numbers or strings; anything that does not parse
/// falls back to a default in [`super::Config::from_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub api_url: Option<String>,
    pub provider_mode: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<Value>,
    pub temperature: Option<Value>,
    pub timeout_seconds: Option<Value>,
    pub api_key_env: Option<String>,
    pub auth_mode: Option<String>,
    pub auth_header_name: Option<String>,
    pub auth_prefix: Option<String>,
    pub extra_headers: Option<Value>,
    pub prompt_mode: Option<String>,
    pub prompt_template: Option<String>,
    pub backend_profile: Option<String>,
    pub backend_context: Option<Value>,
}

/// Integer coercion: integral numbers, truncated floats, or trimmed decimal strings.
pub(crate) fn coerce_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                u32::try_from(i).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f.trunc() as u32)
            }
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Float coercion: numbers or trimmed strings, finite values only.
pub(crate) fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Header values are stringified; a non-object value yields no headers.
pub(crate) fn stringify_headers(value: Option<Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };

    map.into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_mixed_types() {
        let raw: RawConfig = serde_json::from_value(json!({
            "api_url": "https://llm.example.com/ask",
            "max_tokens": "300",
            "temperature": 0.5,
            "extra_headers": {"X-Trace": "abc"},
            "unknown_key": true
        }))
        .expect("raw config should deserialize");

        assert_eq!(raw.api_url.as_deref(), Some("https://llm.example.com/ask"));
        assert_eq!(raw.max_tokens, Some(json!("300")));
        assert_eq!(raw.temperature, Some(json!(0.5)));
        assert!(raw.model.is_none());
    }

    #[test]
    fn test_coerce_u32() {
        assert_eq!(coerce_u32(Some(&json!(300))), Some(300));
        assert_eq!(coerce_u32(Some(&json!(" 42 "))), Some(42));
        assert_eq!(coerce_u32(Some(&json!(12.9))), Some(12));
        assert_eq!(coerce_u32(Some(&json!("invalid"))), None);
        assert_eq!(coerce_u32(Some(&json!("3.5"))), None);
        assert_eq!(coerce_u32(Some(&json!(-1))), None);
        assert_eq!(coerce_u32(Some(&json!(true))), None);
        assert_eq!(coerce_u32(None), None);
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(Some(&json!(0.5))), Some(0.5));
        assert_eq!(coerce_f64(Some(&json!(2))), Some(2.0));
        assert_eq!(coerce_f64(Some(&json!("1.25"))), Some(1.25));
        assert_eq!(coerce_f64(Some(&json!("not_a_number"))), None);
        assert_eq!(coerce_f64(Some(&json!("inf"))), None);
        assert_eq!(coerce_f64(Some(&Value::Null)), None);
    }

    #[test]
    fn test_stringify_headers() {
        let headers = stringify_headers(Some(json!({
            "X-Retry": 3,
            "X-Name": "value",
            "X-Flag": true
        })));

        assert_eq!(headers.get("X-Retry").map(String::as_str), Some("3"));
        assert_eq!(headers.get("X-Name").map(String::as_str), Some("value"));
        assert_eq!(headers.get("X-Flag").map(String::as_str), Some("true"));
        assert!(stringify_headers(Some(json!("nope"))).is_empty());
    }
}
