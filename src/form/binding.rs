use super::controller::{FormController, FormResult, read_lock};
use super::validation::ValidationError;
use super::value::{FieldKey, FieldValue};

/// A change event as a renderer reports it: the raw text, the checked state
/// and whether the input is a checkbox.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InputEvent {
    pub name: String,
    pub value: String,
    pub checked: bool,
    pub is_checkbox: bool,
}

impl InputEvent {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            checked,
            is_checkbox: true,
            ..Self::default()
        }
    }

    pub fn field_value(&self) -> FieldValue {
        if self.is_checkbox {
            FieldValue::Bool(self.checked)
        } else {
            FieldValue::Text(self.value.clone())
        }
    }
}

/// Everything a renderer needs to draw one field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldProps {
    pub value: FieldValue,
    /// Only set once the field was blurred or a submit was attempted.
    pub error: Option<String>,
    pub touched: bool,
    pub dirty: bool,
}

impl<E> FormController<E>
where
    E: ValidationError,
{
    pub fn handle_input(&self, event: &InputEvent) -> FormResult<()> {
        self.on_field_change(event.name.as_str(), event.field_value())
    }

    /// The field's error message, withheld until the user blurred the
    /// field or tried to submit.
    pub fn field_error_for_display(&self, field: impl Into<FieldKey>) -> FormResult<Option<String>> {
        let key = field.into();
        Ok(self.field_props(key)?.error)
    }

    pub fn field_props(&self, field: impl Into<FieldKey>) -> FormResult<FieldProps> {
        let key = field.into();
        let state = read_lock(&self.state, "reading field props")?;
        let value = state.current_value(&key)?.clone();
        let touched = state.touched.get(&key).copied().unwrap_or(false);
        let error = if touched || state.submit_count > 0 {
            state
                .errors
                .get(&key)
                .map(|error| error.message().into_owned())
        } else {
            None
        };
        Ok(FieldProps {
            value,
            error,
            touched,
            dirty: state.dirty.contains(&key),
        })
    }
}
