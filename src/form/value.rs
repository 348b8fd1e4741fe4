use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of a single form input, e.g. `email`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(Arc<str>);

impl FieldKey {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(value: &FieldKey) -> Self {
        value.clone()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Text,
    Bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Bool(_) => FieldKind::Bool,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    /// Empty text and an unchecked box both count as "no input".
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Bool(value) => !value,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

pub type FormValues = BTreeMap<FieldKey, FieldValue>;
pub type FieldErrors<E> = BTreeMap<FieldKey, E>;

/// Builds a [`FormValues`] map from `(name, value)` pairs.
pub fn form_values<K, V, I>(pairs: I) -> FormValues
where
    K: Into<FieldKey>,
    V: Into<FieldValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_lookup_accepts_plain_str() {
        let values = form_values([("email", "a@b.com")]);
        assert_eq!(
            values.get("email"),
            Some(&FieldValue::Text("a@b.com".into()))
        );
    }

    #[test]
    fn blank_covers_whitespace_and_unchecked() {
        assert!(FieldValue::from("   ").is_blank());
        assert!(FieldValue::from(false).is_blank());
        assert!(!FieldValue::from(true).is_blank());
        assert!(!FieldValue::from("x").is_blank());
    }

    #[test]
    fn values_serialize_without_tags() {
        let values = form_values([
            ("email", FieldValue::from("a@b.com")),
            ("remember", FieldValue::from(true)),
        ]);
        let encoded = toml::to_string(&values).expect("serialize values");
        assert!(encoded.contains("email = \"a@b.com\""));
        assert!(encoded.contains("remember = true"));
    }
}
