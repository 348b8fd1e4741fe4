use serde::Deserialize;

use super::controller::{FormError, FormResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Validate the blurred field, and the whole form on submit.
    OnBlur,
    /// Only validate on submit.
    OnSubmit,
}

/// What happens when `submit` is called while another submit is in flight.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    RejectWhileSubmitting,
    AllowOverlap,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub submit_policy: SubmitPolicy,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnBlur,
            submit_policy: SubmitPolicy::RejectWhileSubmitting,
        }
    }
}

impl FormOptions {
    /// Parses options from a TOML table; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> FormResult<Self> {
        toml::from_str(source).map_err(|error| FormError::InvalidOptions(error.to_string()))
    }
}
