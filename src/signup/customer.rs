use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub send_catalog: bool,
}

impl Customer {
    /// Projects the customer record out of a signup form value.
    pub fn from_form_value(value: &Value) -> Self {
        let text = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            first_name: text("/firstName"),
            last_name: text("/lastName"),
            email: text("/emailGroup/email"),
            send_catalog: value
                .pointer("/sendCatalog")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}
