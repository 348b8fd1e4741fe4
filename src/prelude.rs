pub use crate::form::{
    FieldKey, FieldProps, FieldValue, FormController, FormError, FormOptions, FormResult,
    FormValues, InputEvent, Rules, SubmitOutcome, SubmitPolicy, ValidationMode, form_values,
};
