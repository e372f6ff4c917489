//! Validators are pure functions from a control to an optional set of failures.
//!
//! The built-ins follow the usual reactive-forms semantics: only `required` reports
//! empty values, the length and email checks skip them.

use std::{fmt, sync::Arc, sync::LazyLock};

use regex::Regex;
use serde_json::{Value, json};

use super::{control::Control, error::ValidationErrors};

type CheckFn = dyn Fn(&Control) -> Option<ValidationErrors> + Send + Sync;

/// A named, shareable validation function.
#[derive(Clone)]
pub struct Validator {
    name: &'static str,
    check: Arc<CheckFn>,
}

impl Validator {
    pub fn new(
        name: &'static str,
        check: impl Fn(&Control) -> Option<ValidationErrors> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn validate(&self, control: &Control) -> Option<ValidationErrors> {
        (self.check)(control)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.name).finish()
    }
}

/// Fails with `required` on null, an empty string or an empty list.
pub fn required() -> Validator {
    Validator::new("required", |control| {
        is_empty_value(&control.value()).then(|| ValidationErrors::flag("required"))
    })
}

pub fn min_length(min: usize) -> Validator {
    Validator::new("minlength", move |control| {
        let value = control.value();
        if is_empty_value(&value) {
            return None;
        }
        let actual = value_length(&value)?;
        (actual < min).then(|| {
            ValidationErrors::with_detail(
                "minlength",
                json!({ "requiredLength": min, "actualLength": actual }),
            )
        })
    })
}

pub fn max_length(max: usize) -> Validator {
    Validator::new("maxlength", move |control| {
        let actual = value_length(&control.value())?;
        (actual > max).then(|| {
            ValidationErrors::with_detail(
                "maxlength",
                json!({ "requiredLength": max, "actualLength": actual }),
            )
        })
    })
}

/// Fails with `email` when a non-empty value is not a plausible address.
pub fn email() -> Validator {
    Validator::new("email", |control| {
        let value = control.value();
        if is_empty_value(&value) {
            return None;
        }
        match value.as_str() {
            Some(text) if is_valid_email(text) => None,
            _ => Some(ValidationErrors::flag("email")),
        }
    })
}

/// Accepts null, otherwise fails with `range` unless the value coerces to a number in
/// `[min, max]`.
pub fn rating_range(min: f64, max: f64) -> Validator {
    Validator::new("ratingRange", move |control| {
        let value = control.value();
        if value.is_null() {
            return None;
        }
        let number = coerce_number(&value);
        if number.is_nan() || number < min || number > max {
            Some(ValidationErrors::flag("range"))
        } else {
            None
        }
    })
}

/// Group validator comparing the `email` and `confirmEmail` children.
///
/// A mismatch is only reported once both children have been edited by the user.
pub fn email_matcher() -> Validator {
    Validator::new("emailMatcher", |group| {
        let email = group.get("email")?;
        let confirm = group.get("confirmEmail")?;
        if email.pristine() || confirm.pristine() {
            return None;
        }
        if email.value() == confirm.value() {
            return None;
        }
        Some(ValidationErrors::flag("match"))
    })
}

// Mirrors the common browser pattern: 254 chars overall, 64 for the local part,
// dot-atom local part and hyphenated domain labels of at most 63 chars.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

pub fn is_valid_email(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 || total > 254 {
        return false;
    }
    match text.find('@') {
        Some(at) if at > 0 && text[..at].chars().count() <= 64 => EMAIL_PATTERN.is_match(text),
        _ => false,
    }
}

/// Numeric coercion used by the range check: strings are trimmed and parsed (empty is 0),
/// booleans count as 1/0, anything structured is NaN.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return 0.0;
            }
            match trimmed.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => parsed,
                _ => f64::NAN,
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::form::builder::{field, group};

    fn leaf(value: Value) -> Control {
        let mut control = field(value, Vec::new());
        control.mark_as_dirty();
        control
    }

    fn email_group(email: &str, confirm: &str, email_dirty: bool, confirm_dirty: bool) -> Control {
        let mut email_control = field(json!(email), Vec::new());
        let mut confirm_control = field(json!(confirm), Vec::new());
        if email_dirty {
            email_control.mark_as_dirty();
        }
        if confirm_dirty {
            confirm_control.mark_as_dirty();
        }
        group(
            [("email", email_control), ("confirmEmail", confirm_control)],
            vec![email_matcher()],
        )
    }

    #[test]
    fn required_rejects_empty_values_only() {
        let check = required();
        assert!(check.validate(&leaf(json!(""))).unwrap().contains("required"));
        assert!(check.validate(&leaf(Value::Null)).is_some());
        assert!(check.validate(&leaf(json!([]))).is_some());
        assert!(check.validate(&leaf(json!("x"))).is_none());
        assert!(check.validate(&leaf(json!(false))).is_none());
        assert!(check.validate(&leaf(json!(0))).is_none());
    }

    #[test]
    fn min_length_skips_empty_and_counts_chars() {
        let check = min_length(3);
        assert!(check.validate(&leaf(json!(""))).is_none());
        let errors = check.validate(&leaf(json!("ab"))).unwrap();
        assert_eq!(
            errors.get("minlength"),
            Some(&json!({"requiredLength": 3, "actualLength": 2}))
        );
        assert!(check.validate(&leaf(json!("abc"))).is_none());
        assert!(check.validate(&leaf(json!("äöü"))).is_none());
    }

    #[test]
    fn max_length_reports_overflow() {
        let check = max_length(50);
        assert!(check.validate(&leaf(json!("a".repeat(50)))).is_none());
        assert!(
            check
                .validate(&leaf(json!("a".repeat(51))))
                .unwrap()
                .contains("maxlength")
        );
        assert!(check.validate(&leaf(json!(""))).is_none());
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("roberto@gmail.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("plain"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@-b.com"));
        assert!(!is_valid_email("a..b@c.com"));
        assert!(!is_valid_email(&format!("{}@b.com", "a".repeat(65))));

        let check = email();
        assert!(check.validate(&leaf(json!(""))).is_none());
        assert!(check.validate(&leaf(json!("nope"))).unwrap().contains("email"));
        assert!(check.validate(&leaf(json!(42))).is_some());
    }

    #[test]
    fn rating_range_bounds() {
        let check = rating_range(1.0, 5.0);
        let fails = |value: Value| check.validate(&leaf(value)).is_some();
        assert!(fails(json!(0)));
        assert!(!fails(json!(1)));
        assert!(!fails(json!(5)));
        assert!(fails(json!(6)));
        assert!(!fails(Value::Null));
        assert!(fails(json!("abc")));
        assert!(!fails(json!("3")));
        assert!(!fails(json!(4.5)));
        assert!(fails(json!(5.01)));
        assert!(fails(json!({"stars": 3})));
        assert!(check.validate(&leaf(json!(9))).unwrap().contains("range"));
    }

    #[test]
    fn coercion_matches_numeric_string_rules() {
        assert_eq!(coerce_number(&json!(" 2 ")), 2.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert!(coerce_number(&json!("1e400")).is_nan());
        assert!(coerce_number(&json!([1])).is_nan());
    }

    #[test]
    fn matcher_ignores_pristine_children() {
        let check = email_matcher();
        for (email_dirty, confirm_dirty) in [(false, false), (true, false), (false, true)] {
            let group = email_group("a@b.com", "c@d.com", email_dirty, confirm_dirty);
            assert!(check.validate(&group).is_none());
        }
    }

    #[test]
    fn matcher_compares_interacted_children() {
        let check = email_matcher();
        let pairs = [
            ("a@b.com", "a@b.com", false),
            ("a@b.com", "c@d.com", true),
            ("", "", false),
            ("A@b.com", "a@b.com", true),
        ];
        for (email, confirm, fails) in pairs {
            let group = email_group(email, confirm, true, true);
            let outcome = check.validate(&group);
            assert_eq!(outcome.is_some(), fails, "{email} vs {confirm}");
            if let Some(errors) = outcome {
                assert!(errors.contains("match"));
            }
        }
    }

    #[test]
    fn validator_debug_shows_name() {
        assert_eq!(format!("{:?}", min_length(3)), "Validator(\"minlength\")");
    }
}
