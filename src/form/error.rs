use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Active validation failures of a single control, keyed by failure kind.
///
/// Keys keep insertion order so messages derived from them are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Value>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single failure flagged with `true`.
    pub fn flag(key: impl Into<String>) -> Self {
        Self::with_detail(key, Value::Bool(true))
    }

    pub fn with_detail(key: impl Into<String>, detail: Value) -> Self {
        let mut errors = Self::new();
        errors.insert(key, detail);
        errors
    }

    pub fn insert(&mut self, key: impl Into<String>, detail: Value) {
        self.0.insert(key.into(), detail);
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Structural failures raised by operations on the control tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A strict set did not supply a value for this control.
    MissingValue { path: String },
    /// The payload names a control that does not exist.
    UnknownControl { path: String },
    /// The payload kind does not fit the control at `path`.
    ShapeMismatch { path: String, expected: &'static str },
    NoControl { path: String },
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

impl FormError {
    pub fn path(&self) -> &str {
        match self {
            FormError::MissingValue { path }
            | FormError::UnknownControl { path }
            | FormError::ShapeMismatch { path, .. }
            | FormError::NoControl { path }
            | FormError::IndexOutOfRange { path, .. } => path,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingValue { path } => {
                write!(f, "{}: must supply a value for this control", display_path(path))
            }
            FormError::UnknownControl { path } => {
                write!(f, "{}: no control registered with this name", display_path(path))
            }
            FormError::ShapeMismatch { path, expected } => {
                write!(f, "{}: expected {expected}", display_path(path))
            }
            FormError::NoControl { path } => {
                write!(f, "{}: control not found", display_path(path))
            }
            FormError::IndexOutOfRange { path, index, len } => write!(
                f,
                "{}: index {index} is out of range for {len} entries",
                display_path(path)
            ),
        }
    }
}

impl std::error::Error for FormError {}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn errors_keep_insertion_order() {
        let mut errors = ValidationErrors::flag("required");
        errors.insert("email", json!(true));
        errors.insert("minlength", json!({"requiredLength": 3}));
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            vec!["required", "email", "minlength"]
        );
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"required": true, "email": true, "minlength": {"requiredLength": 3}})
        );
    }

    #[test]
    fn root_path_is_named_in_messages() {
        let err = FormError::ShapeMismatch {
            path: String::new(),
            expected: "an object",
        };
        assert_eq!(err.to_string(), "<root>: expected an object");
        let err = FormError::MissingValue {
            path: "emailGroup.confirmEmail".into(),
        };
        assert_eq!(err.path(), "emailGroup.confirmEmail");
        assert!(err.to_string().contains("must supply a value"));
    }
}
