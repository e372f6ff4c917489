use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::DocumentFormat;

/// Reads a fixture document. The top level must be an object, since it describes a
/// whole form.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    let value = match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).map_err(anyhow::Error::from)
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).map_err(anyhow::Error::from)
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::from_str::<toml::Table>(contents)
            .map_err(anyhow::Error::from)
            .and_then(|table| serde_json::to_value(table).map_err(anyhow::Error::from)),
    }
    .with_context(|| format!("malformed {format} fixture"))?;

    if !value.is_object() {
        bail!("{format} fixture must hold an object at the top level");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_fixture() {
        let value =
            parse_document_str(r#"{"firstName": "Robert", "rating": null}"#, DocumentFormat::Json)
                .unwrap();
        assert_eq!(value, json!({"firstName": "Robert", "rating": null}));
    }

    #[test]
    fn reports_malformed_json() {
        let err = parse_document_str("{firstName", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("malformed json fixture"));

        let err = parse_document_str("[1, 2]", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("top level"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parses_yaml_fixture() {
        let fixture = "firstName: Robert\nsendCatalog: true\n";
        let value = parse_document_str(fixture, DocumentFormat::Yaml).unwrap();
        assert_eq!(value, json!({"firstName": "Robert", "sendCatalog": true}));
    }
}
