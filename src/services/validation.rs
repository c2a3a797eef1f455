use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A declarative rule for one form field. Checks run in a fixed priority
/// order (required, min, max, pattern, custom) and stop at the first
/// failure. Each check carries an optional rule-supplied message.
#[derive(Clone, Default)]
pub struct Rule {
    required: bool,
    required_message: Option<String>,
    min: Option<f64>,
    min_message: Option<String>,
    max: Option<f64>,
    max_message: Option<String>,
    pattern: Option<Regex>,
    pattern_message: Option<String>,
    custom: Option<Predicate>,
    custom_message: Option<String>,
}

impl Rule {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn min(limit: f64) -> Self {
        Self {
            min: Some(limit),
            ..Self::default()
        }
    }

    pub fn max(limit: f64) -> Self {
        Self {
            max: Some(limit),
            ..Self::default()
        }
    }

    /// Patterns are developer-declared literals; an unparseable one is a
    /// programming error.
    pub fn pattern(pattern: &str) -> Self {
        Self {
            pattern: Some(Regex::new(pattern).expect("invalid validation pattern")),
            ..Self::default()
        }
    }

    pub fn custom<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            custom: Some(Arc::new(predicate)),
            custom_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn required_text(label: &str) -> Self {
        Self::required().with_message(format!("{label} is required"))
    }

    pub fn positive_number(label: &str) -> Self {
        Self::required_text(label).and(Self::custom(
            |value| numeric_value(value).map(|n| n > 0.0).unwrap_or(false),
            format!("{label} must be greater than 0"),
        ))
    }

    pub fn email() -> Self {
        Self::pattern(EMAIL_PATTERN).with_message("Please enter a valid email address")
    }

    /// Merges another rule into this one; checks configured on `other` win.
    pub fn and(mut self, other: Rule) -> Rule {
        if other.required {
            self.required = true;
            self.required_message = other.required_message;
        }
        if other.min.is_some() {
            self.min = other.min;
            self.min_message = other.min_message;
        }
        if other.max.is_some() {
            self.max = other.max;
            self.max_message = other.max_message;
        }
        if other.pattern.is_some() {
            self.pattern = other.pattern;
            self.pattern_message = other.pattern_message;
        }
        if other.custom.is_some() {
            self.custom = other.custom;
            self.custom_message = other.custom_message;
        }
        self
    }

    /// Overrides the message of every check this rule has configured.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if self.required {
            self.required_message = Some(message.clone());
        }
        if self.min.is_some() {
            self.min_message = Some(message.clone());
        }
        if self.max.is_some() {
            self.max_message = Some(message.clone());
        }
        if self.pattern.is_some() {
            self.pattern_message = Some(message.clone());
        }
        if self.custom.is_some() {
            self.custom_message = Some(message);
        }
        self
    }

    fn evaluate(&self, name: &str, value: &Value) -> Option<String> {
        // Only `required` rejects absence; every other check passes
        // vacuously for null or blank values.
        if is_blank(value) {
            if self.required {
                return Some(self.message_or(&self.required_message, || {
                    format!("{name} is required")
                }));
            }
            return None;
        }

        if let Some(min) = self.min {
            if let Some(n) = numeric_value(value) {
                if n < min {
                    return Some(self.message_or(&self.min_message, || {
                        format!("{name} must be at least {min}")
                    }));
                }
            }
        }

        if let Some(max) = self.max {
            if let Some(n) = numeric_value(value) {
                if n > max {
                    return Some(self.message_or(&self.max_message, || {
                        format!("{name} must be at most {max}")
                    }));
                }
            }
        }

        if let Some(pattern) = &self.pattern {
            if let Some(text) = text_value(value) {
                if !pattern.is_match(&text) {
                    return Some(self.message_or(&self.pattern_message, || {
                        format!("{name} has an invalid format")
                    }));
                }
            }
        }

        if let Some(custom) = self.custom.as_deref() {
            if !custom(value) {
                return Some(
                    self.message_or(&self.custom_message, || format!("{name} is invalid")),
                );
            }
        }

        None
    }

    fn message_or(&self, supplied: &Option<String>, default: impl FnOnce() -> String) -> String {
        supplied.clone().unwrap_or_else(default)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Numbers and numeric strings both read as numbers; anything else has no
/// numeric value.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Evaluates named fields against a declared rule set and keeps the
/// resulting error map. Fields without a rule are always valid.
#[derive(Clone, Default)]
pub struct FormValidator {
    rules: BTreeMap<String, Rule>,
    errors: BTreeMap<String, String>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Validates one field, records the outcome in the error map and
    /// returns it.
    pub fn validate_field(&mut self, name: &str, value: &Value) -> Option<String> {
        let outcome = self
            .rules
            .get(name)
            .and_then(|rule| rule.evaluate(name, value));
        match &outcome {
            Some(message) => {
                self.errors.insert(name.to_string(), message.clone());
            }
            None => {
                self.errors.remove(name);
            }
        }
        outcome
    }

    /// Validates every field declared in the rule set (absent fields count
    /// as null), replaces the error map with the failures and returns
    /// whether the form is valid.
    pub fn validate_form(&mut self, data: &Value) -> bool {
        let mut errors = BTreeMap::new();
        for (name, rule) in &self.rules {
            let value = data.get(name).unwrap_or(&Value::Null);
            if let Some(message) = rule.evaluate(name, value) {
                errors.insert(name.clone(), message);
            }
        }
        let valid = errors.is_empty();
        self.errors = errors;
        valid
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn clear_field(&mut self, name: &str) {
        self.errors.remove(name);
    }

    pub fn clear_all(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_beats_min_for_empty_values() {
        let mut v = FormValidator::new().rule("amount", Rule::required().and(Rule::min(5.0)));
        let err = v.validate_field("amount", &json!(""));
        assert_eq!(err.as_deref(), Some("amount is required"));
    }

    #[test]
    fn test_field_without_rule_is_always_valid() {
        let mut v = FormValidator::new().rule("name", Rule::required());
        assert_eq!(v.validate_field("notes", &json!("anything")), None);
    }

    #[test]
    fn test_min_max_defaults_and_numeric_strings() {
        let mut v = FormValidator::new()
            .rule("age", Rule::min(18.0))
            .rule("score", Rule::max(100.0));

        assert_eq!(
            v.validate_field("age", &json!(16)).as_deref(),
            Some("age must be at least 18")
        );
        assert_eq!(v.validate_field("age", &json!("21")), None);
        assert_eq!(
            v.validate_field("score", &json!("150")).as_deref(),
            Some("score must be at most 100")
        );
    }

    #[test]
    fn test_non_numeric_value_skips_bounds() {
        let mut v = FormValidator::new().rule("age", Rule::min(18.0));
        assert_eq!(v.validate_field("age", &json!("soon")), None);
    }

    #[test]
    fn test_custom_message_overrides_default() {
        let mut v = FormValidator::new().rule("qty", Rule::min(1.0).with_message("Too small"));
        assert_eq!(
            v.validate_field("qty", &json!(0)).as_deref(),
            Some("Too small")
        );
    }

    #[test]
    fn test_validate_form_empty_data_against_required_field() {
        let mut v = FormValidator::new().rule("name", Rule::required());
        let valid = v.validate_form(&json!({}));
        assert!(!valid);
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()["name"], "name is required");
    }

    #[test]
    fn test_validate_form_omits_passing_fields() {
        let mut v = FormValidator::new()
            .rule("name", Rule::required())
            .rule("email", Rule::email());
        let valid = v.validate_form(&json!({"name": "Ana", "email": "bad"}));
        assert!(!valid);
        assert!(!v.errors().contains_key("name"));
        assert!(v.errors().contains_key("email"));
    }

    #[test]
    fn test_validate_form_replaces_previous_errors() {
        let mut v = FormValidator::new()
            .rule("name", Rule::required())
            .rule("qty", Rule::min(5.0));

        v.validate_form(&json!({"qty": 7}));
        assert!(v.errors().contains_key("name"));

        v.validate_form(&json!({"name": "Ana", "qty": 1}));
        assert!(!v.errors().contains_key("name"));
        assert!(v.errors().contains_key("qty"));
    }

    #[test]
    fn test_clear_field_and_clear_all() {
        let mut v = FormValidator::new()
            .rule("a", Rule::required())
            .rule("b", Rule::required());
        v.validate_form(&json!({}));
        assert_eq!(v.errors().len(), 2);

        v.clear_field("a");
        assert!(!v.errors().contains_key("a"));
        assert!(v.errors().contains_key("b"));

        v.clear_all();
        assert!(v.errors().is_empty());
    }

    #[test]
    fn test_positive_number_messages() {
        let mut v = FormValidator::new().rule("age", Rule::positive_number("Age"));

        let valid = v.validate_form(&json!({"age": -5}));
        assert!(!valid);
        assert_eq!(v.errors()["age"], "Age must be greater than 0");

        v.validate_form(&json!({}));
        assert_eq!(v.errors()["age"], "Age is required");

        v.validate_form(&json!({"age": "abc"}));
        assert_eq!(v.errors()["age"], "Age must be greater than 0");

        assert!(v.validate_form(&json!({"age": 3})));
    }

    #[test]
    fn test_email_rule() {
        let mut v = FormValidator::new().rule("email", Rule::email());

        let err = v.validate_field("email", &json!("not-an-email"));
        assert_eq!(err.as_deref(), Some("Please enter a valid email address"));

        assert_eq!(v.validate_field("email", &json!("ana@example.com")), None);
        // Not required: a blank value passes the pattern check vacuously.
        assert_eq!(v.validate_field("email", &json!("")), None);
    }

    #[test]
    fn test_validate_field_clears_entry_once_fixed() {
        let mut v = FormValidator::new().rule("name", Rule::required());
        v.validate_field("name", &json!(""));
        assert!(v.errors().contains_key("name"));

        v.validate_field("name", &json!("Ana"));
        assert!(!v.errors().contains_key("name"));
    }
}
