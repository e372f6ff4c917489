use anyhow::{Context, Result};
use serde_json::Value;

use super::DocumentFormat;

/// Serialize a form value in the requested format.
pub fn render_value(value: &Value, format: DocumentFormat, pretty: bool) -> Result<String> {
    match format {
        DocumentFormat::Json => {
            if pretty {
                serde_json::to_string_pretty(value).context("failed to serialize JSON")
            } else {
                serde_json::to_string(value).context("failed to serialize JSON")
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let value = strip_nulls(value);
            if pretty {
                toml::to_string_pretty(&value).context("failed to serialize TOML")
            } else {
                toml::to_string(&value).context("failed to serialize TOML")
            }
        }
    }
}

// TOML has no null; absent keys are the closest equivalent.
#[cfg(feature = "toml")]
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, item)| !item.is_null())
                .map(|(key, item)| (key.clone(), strip_nulls(item)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_json_keeps_field_order() {
        let rendered = render_value(
            &json!({"firstName": "", "rating": null, "sendCatalog": true}),
            DocumentFormat::Json,
            false,
        )
        .unwrap();
        assert_eq!(rendered, r#"{"firstName":"","rating":null,"sendCatalog":true}"#);
    }

    #[test]
    fn pretty_json_spans_lines() {
        let rendered = render_value(&json!({"ok": true}), DocumentFormat::Json, true).unwrap();
        assert!(rendered.contains('\n'));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_drops_null_fields() {
        let rendered =
            render_value(&json!({"rating": null, "phone": "1"}), DocumentFormat::Toml, false)
                .unwrap();
        assert!(!rendered.contains("rating"));
        assert!(rendered.contains("phone"));
    }
}
