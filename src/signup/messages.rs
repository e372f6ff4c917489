use indexmap::IndexMap;

use crate::form::ValidationErrors;

/// Human-readable text per validation failure key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessages {
    entries: IndexMap<String, String>,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self::new()
            .with("required", "Please enter your email address.")
            .with("email", "Please enter a valid email address.")
    }
}

impl ValidationMessages {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Space-joined text for every failure key, in the order the failures were raised.
    /// Keys without text use `fallback` or are skipped.
    pub fn render(&self, errors: &ValidationErrors, fallback: Option<&str>) -> String {
        errors
            .keys()
            .filter_map(|key| self.get(key).or(fallback))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_known_keys_in_failure_order() {
        let messages = ValidationMessages::default();
        let mut errors = ValidationErrors::flag("email");
        errors.insert("required", json!(true));
        assert_eq!(
            messages.render(&errors, None),
            "Please enter a valid email address. Please enter your email address."
        );
    }

    #[test]
    fn unmapped_keys_are_skipped_without_fallback() {
        let messages = ValidationMessages::default();
        let mut errors = ValidationErrors::flag("pattern");
        errors.insert("required", json!(true));
        assert_eq!(
            messages.render(&errors, None),
            "Please enter your email address."
        );
        assert_eq!(
            messages.render(&errors, Some("Invalid value.")),
            "Invalid value. Please enter your email address."
        );
        assert_eq!(messages.render(&ValidationErrors::flag("x"), None), "");
    }
}
