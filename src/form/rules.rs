//! Declarative field rules covering the checks AgriLink forms need.

use super::validation::FormValidator;
use super::value::{FieldErrors, FieldKey, FieldValue, FormValues};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Check {
    Required,
    Email,
    MinLength(usize),
    Checked,
    Equals(FieldKey),
}

#[derive(Clone, Debug)]
struct FieldRule {
    field: FieldKey,
    check: Check,
    message: String,
}

/// An ordered list of per-field rules. The first failing rule for a field
/// determines its message.
///
/// Rules only look at fields present in the map they are given, so a
/// single-field map (blur) checks just that field. [`Rules::equals`] needs
/// both fields and therefore only fires during whole-form validation.
#[derive(Clone, Debug, Default)]
pub struct Rules {
    rules: Vec<FieldRule>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, field: impl Into<FieldKey>, message: impl Into<String>) -> Self {
        self.push(field, Check::Required, message)
    }

    /// Blank (empty or whitespace-only) values pass; pair with
    /// [`Rules::required`] to reject them.
    pub fn email(self, field: impl Into<FieldKey>, message: impl Into<String>) -> Self {
        self.push(field, Check::Email, message)
    }

    /// Counts characters, not bytes. Blank (empty or whitespace-only) values
    /// pass.
    pub fn min_length(
        self,
        field: impl Into<FieldKey>,
        min: usize,
        message: impl Into<String>,
    ) -> Self {
        self.push(field, Check::MinLength(min), message)
    }

    pub fn checked(self, field: impl Into<FieldKey>, message: impl Into<String>) -> Self {
        self.push(field, Check::Checked, message)
    }

    pub fn equals(
        self,
        field: impl Into<FieldKey>,
        other: impl Into<FieldKey>,
        message: impl Into<String>,
    ) -> Self {
        self.push(field, Check::Equals(other.into()), message)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn check(&self, values: &FormValues) -> FieldErrors<String> {
        let mut errors = FieldErrors::new();
        for rule in &self.rules {
            if errors.contains_key(&rule.field) {
                continue;
            }
            let Some(value) = values.get(&rule.field) else {
                continue;
            };
            if !passes(&rule.check, value, values) {
                errors.insert(rule.field.clone(), rule.message.clone());
            }
        }
        errors
    }

    fn push(mut self, field: impl Into<FieldKey>, check: Check, message: impl Into<String>) -> Self {
        self.rules.push(FieldRule {
            field: field.into(),
            check,
            message: message.into(),
        });
        self
    }
}

impl FormValidator<String> for Rules {
    fn validate(&self, values: &FormValues) -> FieldErrors<String> {
        self.check(values)
    }
}

fn passes(check: &Check, value: &FieldValue, values: &FormValues) -> bool {
    match check {
        Check::Required => !value.is_blank(),
        Check::Email => match value.as_text() {
            Some(text) if !value.is_blank() => is_email(text),
            _ => true,
        },
        Check::MinLength(min) => match value.as_text() {
            Some(text) if !value.is_blank() => text.chars().count() >= *min,
            _ => true,
        },
        Check::Checked => value.as_bool().unwrap_or(true),
        Check::Equals(other) => values.get(other).is_none_or(|other| other == value),
    }
}

/// Shape check only: `local@domain.tld`, no whitespace, every domain label
/// non-empty.
pub fn is_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}
